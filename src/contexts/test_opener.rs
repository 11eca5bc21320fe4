use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use super::candidate_chooser::choose;
use super::interaction::{DocumentViewer, UserInteraction};
use super::test_generator::{GenerationOutcome, TestGenerator, TextGenerator};
use crate::data::{resolve, ImplementationFileIdentity, SettingsStore, TestFileCandidate};

/// Upper bound on search hits, keeps the pick list short
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Dependency trees never hold the project's own tests
pub const DEPENDENCY_EXCLUDE_GLOB: &str = "**/node_modules/**";

const SEARCH_FAILED_NOTICE: &str = "Failed to search the workspace for test files.";

/// Errors reported by a file search
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid glob '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("failed to walk the workspace: {0}")]
    Walk(String),
}

/// Finds files in the workspace by glob
pub trait TestFileSearch {
    /// # Arguments
    /// * `pattern` - Glob relative to the workspace root
    /// * `exclude` - Glob of paths to skip
    /// * `max_results` - Stop after this many hits
    fn search(
        &self,
        pattern: &str,
        exclude: &str,
        max_results: usize,
    ) -> Result<Vec<PathBuf>, SearchError>;
}

/// How one "open test file" invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// No naming convention for the extension
    Unsupported { extension: String },
    /// Nothing found and generation not offered
    NotFound,
    /// Several candidates and the user picked none
    Cancelled,
    Opened(PathBuf),
    /// Nothing found; generation was offered
    Generation(GenerationOutcome),
    /// A failure notice was shown
    Failed,
}

impl OpenOutcome {
    /// True when the invocation ended with a failure notice
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            OpenOutcome::Failed | OpenOutcome::Generation(GenerationOutcome::Failed)
        )
    }
}

/// Test File Opener context
///
/// Resolves the convention for the given file, searches the workspace, then
/// either opens the matching test file or hands over to [`TestGenerator`].
pub struct TestFileOpener<'a, F, G, S, U, V>
where
    F: TestFileSearch,
    G: TextGenerator,
    S: SettingsStore,
    U: UserInteraction,
    V: DocumentViewer,
{
    search: &'a F,
    ui: &'a U,
    viewer: &'a V,
    /// `None` turns the "not found" case into a plain notice
    generator: Option<TestGenerator<'a, G, S, U, V>>,
}

impl<'a, F, G, S, U, V> TestFileOpener<'a, F, G, S, U, V>
where
    F: TestFileSearch,
    G: TextGenerator,
    S: SettingsStore,
    U: UserInteraction,
    V: DocumentViewer,
{
    pub fn new(
        search: &'a F,
        ui: &'a U,
        viewer: &'a V,
        generator: Option<TestGenerator<'a, G, S, U, V>>,
    ) -> Self {
        Self {
            search,
            ui,
            viewer,
            generator,
        }
    }

    /// Opens the test file for `identity`, or offers to generate one
    pub async fn open_test_file(&self, identity: &ImplementationFileIdentity) -> OpenOutcome {
        let Some(file_pattern) = resolve(&identity.base_name, &identity.extension) else {
            self.ui.info(&format!(
                "File extension is unsupported: {}",
                identity.extension
            ));
            return OpenOutcome::Unsupported {
                extension: identity.extension.clone(),
            };
        };

        let glob = format!("**/{}", file_pattern);
        debug!(%glob, "searching for test files");
        let candidates: Vec<TestFileCandidate> =
            match self
                .search
                .search(&glob, DEPENDENCY_EXCLUDE_GLOB, MAX_SEARCH_RESULTS)
            {
                Ok(paths) => paths.into_iter().map(TestFileCandidate::new).collect(),
                Err(e) => {
                    debug!(error = %e, "test file search failed");
                    self.ui.error(SEARCH_FAILED_NOTICE);
                    return OpenOutcome::Failed;
                }
            };

        if candidates.is_empty() {
            return match &self.generator {
                Some(generator) => OpenOutcome::Generation(generator.offer(identity).await),
                None => {
                    self.ui.info(&format!(
                        "No test files found for {}",
                        identity.file_name()
                    ));
                    OpenOutcome::NotFound
                }
            };
        }

        let Some(path) = choose(&candidates, self.ui) else {
            return OpenOutcome::Cancelled;
        };

        match self.viewer.open(&path) {
            Ok(()) => OpenOutcome::Opened(path),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "failed to open test file");
                self.ui.error(&format!("Failed to open {}", path.display()));
                OpenOutcome::Failed
            }
        }
    }
}
