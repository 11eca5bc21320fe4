use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::{EditorViewer, TerminalInteraction};
use test_file_opener::contexts::{OpenOutcome, TestFileOpener, TestGenerator};
use test_file_opener::data::ImplementationFileIdentity;
use test_file_opener::registries::{
    FileSettingsStore, OpenAiConfig, OpenAiGenerator, WorkspaceSearch,
};

#[derive(Clone, Copy)]
pub struct Config {
    pub verbose: bool,
}

/// Everything the `open` command needs besides the global flags
pub struct OpenRequest {
    pub file: PathBuf,
    /// Workspace root searched for test files
    pub root: PathBuf,
    /// Offer generation when nothing is found
    pub generate: bool,
    pub settings_path: Option<PathBuf>,
    pub openai: OpenAiConfig,
    pub max_auth_retries: u32,
    pub editor: Option<String>,
}

/// Installs the tracing subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(config: &Config) {
    let default_level = if config.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Ignore the error: a subscriber may already be installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Opens the test file for `request.file`, offering to generate one when the
/// workspace has none.
pub async fn open_test_file(request: OpenRequest) -> Result<OpenOutcome> {
    let file = std::fs::canonicalize(&request.file)
        .with_context(|| format!("Failed to resolve file: {}", request.file.display()))?;
    let root = std::fs::canonicalize(&request.root)
        .with_context(|| format!("Failed to resolve workspace root: {}", request.root.display()))?;

    let identity = ImplementationFileIdentity::from_path(&file);

    let search = WorkspaceSearch::new(root.clone());
    let ui = TerminalInteraction::new();
    let viewer = EditorViewer::new(request.editor);
    let store = FileSettingsStore::new(request.settings_path);

    debug!(
        file = %file.display(),
        root = %root.display(),
        settings = %store.path().display(),
        "opening test file"
    );
    let generator = OpenAiGenerator::new(request.openai)?;

    let test_generator = request.generate.then(|| {
        TestGenerator::new(&generator, &store, &ui, &viewer)
            .with_max_auth_retries(request.max_auth_retries)
    });

    let opener = TestFileOpener::new(&search, &ui, &viewer, test_generator);
    let outcome = opener.open_test_file(&identity).await;

    debug!(?outcome, "open finished");
    Ok(outcome)
}
