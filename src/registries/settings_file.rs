use crate::data::{SettingsError, SettingsStore};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SETTINGS_DIR: &str = "test-file-opener";
const SETTINGS_FILE: &str = "settings.yml";

/// FileSettingsStore keeps settings as a flat YAML map in a single file.
///
/// The default location is `{config_dir}/test-file-opener/settings.yml`, so a
/// value written once is seen by every later run, whatever the workspace.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Creates a new FileSettingsStore
    ///
    /// # Arguments
    /// * `path` - Optional settings file path. If None, the per-user config
    ///   directory is used, falling back to `.test-file-opener/settings.yml`
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path: path.unwrap_or_else(default_settings_path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            // Never written yet
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_yaml::from_str(&content).map_err(|source| SettingsError::Format {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.load()?.remove(key))
    }

    /// Read-modify-write of the whole file; other keys are preserved.
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut settings = self.load()?;
        settings.insert(key.to_string(), value.to_string());

        let content = serde_yaml::to_string(&settings).map_err(|source| SettingsError::Format {
            path: self.path.clone(),
            source,
        })?;

        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        // The file holds a secret: staged files are owner-only (0600 on
        // Unix) and the rename replaces the old file in one step
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        staged
            .write_all(content.as_bytes())
            .map_err(|e| self.io_error(e))?;
        staged
            .persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}

fn default_settings_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join(SETTINGS_DIR).join(SETTINGS_FILE),
        None => PathBuf::from(format!(".{}", SETTINGS_DIR)).join(SETTINGS_FILE),
    }
}
