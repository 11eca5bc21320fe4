use std::fmt;
use std::path::{Path, PathBuf};

/// The implementation file a test file is looked up for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementationFileIdentity {
    /// File name without extension
    pub base_name: String,
    /// Extension with its leading dot, empty if the file has none
    pub extension: String,
    pub absolute_path: PathBuf,
}

impl ImplementationFileIdentity {
    /// Builds the identity of a file from its path.
    ///
    /// Only the last extension counts: `Foo.test.ts` has base name `Foo.test`
    /// and extension `.ts`.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let base_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            base_name,
            extension,
            absolute_path: path.to_path_buf(),
        }
    }

    /// File name as shown to the user
    pub fn file_name(&self) -> String {
        format!("{}{}", self.base_name, self.extension)
    }

    /// Where a generated test file for this implementation is written:
    /// `<dir>/<base_name>.test<extension>`
    pub fn generated_test_path(&self) -> PathBuf {
        let file_name = format!("{}.test{}", self.base_name, self.extension);
        match self.absolute_path.parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

/// A search hit that may be the wanted test file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFileCandidate {
    pub path: PathBuf,
    pub display_name: String,
}

impl TestFileCandidate {
    pub fn new(path: PathBuf) -> Self {
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, display_name }
    }
}

/// A test file produced by the generation service, not yet on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTestFile {
    pub target_path: PathBuf,
    pub content: String,
}

/// Secret used to authenticate against the generation service.
///
/// Formatting never reveals the value; use [`Credential::expose`] at the
/// point where it goes on the wire or into the settings store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a non-blank secret; surrounding whitespace is dropped
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
