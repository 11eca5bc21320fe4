mod conventions;
mod files;
mod settings;

pub use conventions::{resolve, ConventionRule, SearchPattern, CONVENTIONS};
pub use files::{Credential, GeneratedTestFile, ImplementationFileIdentity, TestFileCandidate};
pub use settings::{SettingsError, SettingsStore};
