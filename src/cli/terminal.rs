use std::path::Path;
use std::process::Command;

use dialoguer::{theme::ColorfulTheme, Confirm, FuzzySelect, Password};
use test_file_opener::contexts::{DocumentViewer, PickItem, UserInteraction};
use tracing::debug;

/// Prompts on the controlling terminal
#[derive(Default)]
pub struct TerminalInteraction {
    theme: ColorfulTheme,
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserInteraction for TerminalInteraction {
    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    fn confirm(&self, message: &str) -> bool {
        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(false)
            .interact_opt()
            .unwrap_or_else(|e| {
                debug!(error = %e, "confirmation prompt failed");
                None
            })
            .unwrap_or(false)
    }

    fn prompt_text(&self, message: &str, placeholder: &str) -> Option<String> {
        // Hidden input: the only free-text answer asked for is a secret
        Password::with_theme(&self.theme)
            .with_prompt(format!("{} ({})", message, placeholder))
            .allow_empty_password(true)
            .interact()
            .map_err(|e| debug!(error = %e, "text prompt failed"))
            .ok()
            .filter(|answer| !answer.trim().is_empty())
    }

    fn pick(&self, items: &[PickItem]) -> Option<usize> {
        let rows: Vec<String> = items
            .iter()
            .map(|item| format!("{}  {}", item.label, item.detail))
            .collect();

        FuzzySelect::with_theme(&self.theme)
            .with_prompt("Select a test file")
            .items(&rows)
            .default(0)
            .interact_opt()
            .unwrap_or_else(|e| {
                debug!(error = %e, "pick list failed");
                None
            })
    }
}

/// Opens documents in the user's editor, or prints their path when none is
/// configured
pub struct EditorViewer {
    editor: Option<String>,
}

impl EditorViewer {
    pub fn new(editor: Option<String>) -> Self {
        Self {
            editor: editor.filter(|e| !e.trim().is_empty()),
        }
    }
}

impl DocumentViewer for EditorViewer {
    fn open(&self, path: &Path) -> std::io::Result<()> {
        let Some(editor) = &self.editor else {
            println!("{}", path.display());
            return Ok(());
        };

        // Editors are often configured with arguments, e.g. "code --wait"
        let mut parts = editor.split_whitespace();
        let program = parts.next().unwrap_or(editor.as_str());
        let status = Command::new(program).args(parts).arg(path).status()?;

        if status.success() {
            Ok(())
        } else {
            Err(std::io::Error::other(format!(
                "{} exited with {}",
                program, status
            )))
        }
    }
}
