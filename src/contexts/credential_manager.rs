use thiserror::Error;
use tracing::debug;

use super::interaction::UserInteraction;
use crate::data::{Credential, SettingsError, SettingsStore};

/// Settings key the generation service credential is persisted under
pub const API_KEY_SETTING: &str = "openai_api_key";

const API_KEY_PROMPT: &str = "Enter your OpenAI API key";
const API_KEY_REPLACEMENT_PROMPT: &str = "Enter a new OpenAI API key";
const API_KEY_PLACEHOLDER: &str = "sk-...";

/// Errors that can occur while managing the credential
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read the stored API key: {0}")]
    Read(#[source] SettingsError),

    #[error("failed to store the API key: {0}")]
    Persist(#[source] SettingsError),
}

/// Credential Manager context
///
/// Owns the lifecycle of the generation service credential: read it from the
/// settings store, ask for it when missing, persist every newly supplied value.
pub struct CredentialManager<'a, S, U>
where
    S: SettingsStore,
    U: UserInteraction,
{
    store: &'a S,
    ui: &'a U,
}

impl<'a, S, U> CredentialManager<'a, S, U>
where
    S: SettingsStore,
    U: UserInteraction,
{
    pub fn new(store: &'a S, ui: &'a U) -> Self {
        Self { store, ui }
    }

    /// Reads the persisted credential without prompting.
    ///
    /// A blank stored value counts as absent.
    pub fn get(&self) -> Result<Option<Credential>, CredentialError> {
        let stored = self
            .store
            .get(API_KEY_SETTING)
            .map_err(CredentialError::Read)?;
        Ok(stored.and_then(Credential::new))
    }

    /// Returns the persisted credential, asking the user for one if there is
    /// none. A supplied value is persisted before it is returned; an empty or
    /// cancelled answer returns `None` and stores nothing.
    pub fn ensure(&self) -> Result<Option<Credential>, CredentialError> {
        if let Some(credential) = self.get()? {
            return Ok(Some(credential));
        }

        debug!("no stored API key, prompting");
        let Some(credential) = self.ask(API_KEY_PROMPT) else {
            return Ok(None);
        };

        self.replace(&credential)?;
        Ok(Some(credential))
    }

    /// Asks for a replacement after the service rejected the current
    /// credential. Nothing is persisted here; call [`Self::replace`] with the
    /// result.
    pub fn prompt_replacement(&self) -> Option<Credential> {
        self.ask(API_KEY_REPLACEMENT_PROMPT)
    }

    /// Persists a credential unconditionally
    pub fn replace(&self, credential: &Credential) -> Result<(), CredentialError> {
        self.store
            .set(API_KEY_SETTING, credential.expose())
            .map_err(CredentialError::Persist)
    }

    fn ask(&self, message: &str) -> Option<Credential> {
        self.ui
            .prompt_text(message, API_KEY_PLACEHOLDER)
            .and_then(Credential::new)
    }
}
