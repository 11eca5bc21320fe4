mod openai_generator;
mod settings_file;
mod workspace_search;

pub use openai_generator::{OpenAiConfig, OpenAiGenerator, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use settings_file::FileSettingsStore;
pub use workspace_search::WorkspaceSearch;
