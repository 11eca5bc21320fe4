mod candidate_chooser;
mod credential_manager;
mod interaction;
mod test_generator;
mod test_opener;
#[cfg(test)]
mod test_support;

pub use candidate_chooser::choose;
pub use credential_manager::{CredentialError, CredentialManager, API_KEY_SETTING};
pub use interaction::{DocumentViewer, PickItem, UserInteraction};
pub use test_generator::{
    GenerationError, GenerationOutcome, GenerationRequest, TestGenerator, TextGenerator,
    DEFAULT_MAX_AUTH_RETRIES, GENERATION_FAILED_NOTICE,
};
pub use test_opener::{
    OpenOutcome, SearchError, TestFileOpener, TestFileSearch, DEPENDENCY_EXCLUDE_GLOB,
    MAX_SEARCH_RESULTS,
};
