use std::path::Path;

/// One row of a single-choice pick list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    /// Extra text shown under the label, searchable by the picker
    pub detail: String,
}

/// Everything the workflows need from the person at the keyboard.
///
/// Prompts return `None`/`false` when the user cancels; a cancelled prompt is
/// a valid answer, not an error.
pub trait UserInteraction {
    /// Informational notice
    fn info(&self, message: &str);

    /// Failure notice
    fn error(&self, message: &str);

    /// Yes/no question
    fn confirm(&self, message: &str) -> bool;

    /// Free-text question. Used for secrets, so implementations must not echo
    /// or log the answer.
    fn prompt_text(&self, message: &str, placeholder: &str) -> Option<String>;

    /// Single choice; returns the index of the selected item
    fn pick(&self, items: &[PickItem]) -> Option<usize>;
}

/// Opens a file for display once it has been chosen or written
pub trait DocumentViewer {
    fn open(&self, path: &Path) -> std::io::Result<()>;
}
