use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use super::credential_manager::CredentialManager;
use super::interaction::{DocumentViewer, UserInteraction};
use crate::data::{Credential, GeneratedTestFile, ImplementationFileIdentity, SettingsStore};

/// Shown for every failure that is not an authentication rejection
pub const GENERATION_FAILED_NOTICE: &str = "Failed to generate a test file. Please try again later.";
const INVALID_CREDENTIAL_NOTICE: &str = "Your OpenAI API key is invalid.";

/// Default number of replacement credentials tried after rejections
pub const DEFAULT_MAX_AUTH_RETRIES: u32 = 3;

/// Errors reported by a generation service
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service rejected the credential (HTTP 401 or equivalent)
    #[error("credential rejected by the generation service: {0}")]
    Unauthorized(String),

    /// Network, rate limit, malformed response, ...
    #[error("generation failed: {0}")]
    Failed(String),
}

/// A service that turns instructions plus user content into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        instructions: &str,
        content: &str,
        credential: &Credential,
    ) -> Result<String, GenerationError>;
}

/// One generation call's payload. The request is never retried as such;
/// after a rejection the same request goes out again with a new credential.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub extension: String,
    pub source_content: String,
}

impl GenerationRequest {
    pub fn instructions(&self) -> String {
        format!(
            "You write unit tests. The user sends the full source of a {} file. \
             Reply with the complete contents of a test file for it, appropriate to the \
             language and test conventions of {} files. Reply with the file contents only: \
             no explanations and no markdown code fences.",
            self.extension, self.extension
        )
    }
}

/// How a generation attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The user answered "no" to the offer
    Declined,
    /// No credential stored and none supplied
    CredentialAbsent,
    /// The user declined to replace a rejected credential
    Aborted,
    /// A failure notice was shown
    Failed,
    /// The test file was written and opened
    Written(PathBuf),
}

/// Generation Orchestrator context
///
/// Entered when the convention search found nothing. Offers to generate a
/// test file, obtains a credential, calls the generation service and writes
/// the result next to the implementation file. Every failure ends as a user
/// notice (or silently, when the user declined something); nothing escapes.
pub struct TestGenerator<'a, G, S, U, V>
where
    G: TextGenerator,
    S: SettingsStore,
    U: UserInteraction,
    V: DocumentViewer,
{
    generator: &'a G,
    credentials: CredentialManager<'a, S, U>,
    ui: &'a U,
    viewer: &'a V,
    max_auth_retries: u32,
}

impl<'a, G, S, U, V> TestGenerator<'a, G, S, U, V>
where
    G: TextGenerator,
    S: SettingsStore,
    U: UserInteraction,
    V: DocumentViewer,
{
    pub fn new(generator: &'a G, store: &'a S, ui: &'a U, viewer: &'a V) -> Self {
        Self {
            generator,
            credentials: CredentialManager::new(store, ui),
            ui,
            viewer,
            max_auth_retries: DEFAULT_MAX_AUTH_RETRIES,
        }
    }

    /// Caps how many replacement credentials are tried after rejections
    pub fn with_max_auth_retries(mut self, max_auth_retries: u32) -> Self {
        self.max_auth_retries = max_auth_retries;
        self
    }

    /// Offers generation for a file without a test file and runs it if the
    /// user accepts.
    pub async fn offer(&self, identity: &ImplementationFileIdentity) -> GenerationOutcome {
        let question = format!(
            "No test file found for {}. Do you want to generate one?",
            identity.file_name()
        );
        if !self.ui.confirm(&question) {
            debug!("generation declined");
            return GenerationOutcome::Declined;
        }

        self.run(identity).await
    }

    /// Runs the generation workflow without asking first
    pub async fn run(&self, identity: &ImplementationFileIdentity) -> GenerationOutcome {
        // Step 1: credential, prompting if needed
        let mut credential = match self.credentials.ensure() {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                debug!("no API key supplied, stopping");
                return GenerationOutcome::CredentialAbsent;
            }
            Err(e) => return self.fail(&e),
        };

        // Step 2: request from the full source text
        let source_content = match tokio::fs::read_to_string(&identity.absolute_path).await {
            Ok(content) => content,
            Err(e) => return self.fail(&e),
        };
        let request = GenerationRequest {
            extension: identity.extension.clone(),
            source_content,
        };
        let instructions = request.instructions();

        // Step 3: call, replacing the credential on every rejection
        let mut rejections = 0;
        let content = loop {
            debug!(attempt = rejections + 1, "calling generation service");
            match self
                .generator
                .generate(&instructions, &request.source_content, &credential)
                .await
            {
                Ok(content) => break content,
                Err(GenerationError::Unauthorized(_)) => {
                    debug!("credential rejected");
                    if rejections >= self.max_auth_retries {
                        debug!(rejections, "giving up after repeated credential rejections");
                        self.ui.error(GENERATION_FAILED_NOTICE);
                        return GenerationOutcome::Failed;
                    }
                    rejections += 1;

                    self.ui.error(INVALID_CREDENTIAL_NOTICE);
                    let Some(replacement) = self.credentials.prompt_replacement() else {
                        return GenerationOutcome::Aborted;
                    };
                    if let Err(e) = self.credentials.replace(&replacement) {
                        return self.fail(&e);
                    }
                    credential = replacement;
                }
                Err(e) => return self.fail(&e),
            }
        };

        // Step 4: materialize, the only write on any path
        let generated = GeneratedTestFile {
            target_path: identity.generated_test_path(),
            content: strip_code_fence(&content).to_string(),
        };
        let written = write_new_file(&generated.target_path, generated.content.clone()).await;
        if let Err(e) = written {
            return self.fail(&e);
        }
        if let Err(e) = self.viewer.open(&generated.target_path) {
            debug!(path = %generated.target_path.display(), error = %e, "failed to open generated test file");
        }

        GenerationOutcome::Written(generated.target_path)
    }

    fn fail(&self, error: &dyn std::error::Error) -> GenerationOutcome {
        debug!(%error, "test file generation failed");
        self.ui.error(GENERATION_FAILED_NOTICE);
        GenerationOutcome::Failed
    }
}

/// Writes `content` to a file that must not exist yet.
///
/// The content is staged in a temporary file next to the target and only
/// moved into place once complete, so a failed write leaves nothing behind.
async fn write_new_file(path: &Path, content: String) -> std::io::Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(content.as_bytes())?;
        staged.as_file().sync_all()?;
        // Staged files are private; a test file is an ordinary source file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))?;
        }

        staged.persist_noclobber(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(std::io::Error::other)?
}

/// Removes a single markdown code fence wrapping the whole response
fn strip_code_fence(content: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let re = FENCE.get_or_init(|| {
        Regex::new(r"(?s)\A\s*```[^\n]*\n(.*?)\n?```\s*\z").expect("valid fence regex")
    });

    match re.captures(content).and_then(|caps| caps.get(1)) {
        Some(body) => body.as_str(),
        None => content,
    }
}
