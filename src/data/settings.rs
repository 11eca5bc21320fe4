use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing persisted settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is not valid YAML: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Durable key/value configuration shared by every invocation.
///
/// Writes are global in scope: a value stored here survives the process and is
/// seen by the next run. Concurrent writers race with last-write-wins.
pub trait SettingsStore {
    /// Retrieves the stored value for the given key.
    ///
    /// # Returns
    /// * `Ok(Some(String))` - The stored value
    /// * `Ok(None)` - If the key has never been written
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Stores a value for the given key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}
