//! Scripted collaborators shared by the context tests

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::interaction::{DocumentViewer, PickItem, UserInteraction};
use super::test_generator::{GenerationError, TextGenerator};
use super::test_opener::{SearchError, TestFileSearch};
use crate::data::{Credential, SettingsError, SettingsStore};

/// Answers prompts from a script and records every question asked
#[derive(Default)]
pub struct ScriptedInteraction {
    pub confirm_answer: bool,
    pub text_answers: RefCell<VecDeque<String>>,
    pub pick_answer: Option<usize>,
    pub infos: RefCell<Vec<String>>,
    pub errors: RefCell<Vec<String>>,
    pub confirms: RefCell<Vec<String>>,
    pub prompts: RefCell<Vec<String>>,
    pub picks: RefCell<Vec<Vec<PickItem>>>,
}

impl ScriptedInteraction {
    pub fn confirming() -> Self {
        Self {
            confirm_answer: true,
            ..Default::default()
        }
    }

    pub fn answering(answers: &[&str]) -> Self {
        Self::default().with_answers(answers)
    }

    pub fn with_answers(self, answers: &[&str]) -> Self {
        self.text_answers
            .borrow_mut()
            .extend(answers.iter().map(|a| a.to_string()));
        self
    }
}

impl UserInteraction for ScriptedInteraction {
    fn info(&self, message: &str) {
        self.infos.borrow_mut().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirms.borrow_mut().push(message.to_string());
        self.confirm_answer
    }

    fn prompt_text(&self, message: &str, _placeholder: &str) -> Option<String> {
        self.prompts.borrow_mut().push(message.to_string());
        self.text_answers.borrow_mut().pop_front()
    }

    fn pick(&self, items: &[PickItem]) -> Option<usize> {
        self.picks.borrow_mut().push(items.to_vec());
        self.pick_answer
    }
}

/// In-memory settings store
#[derive(Default)]
pub struct MemorySettings {
    pub values: RefCell<HashMap<String, String>>,
    pub writes: RefCell<Vec<(String, String)>>,
    pub fail_writes: bool,
}

impl MemorySettings {
    pub fn with(key: &str, value: &str) -> Self {
        let settings = Self::default();
        settings
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        settings
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        if self.fail_writes {
            return Err(SettingsError::Io {
                path: PathBuf::from("memory"),
                source: std::io::Error::other("read-only"),
            });
        }
        self.writes
            .borrow_mut()
            .push((key.to_string(), value.to_string()));
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub instructions: String,
    pub content: String,
    pub credential: String,
}

/// Generation service replaying canned responses in order
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        instructions: &str,
        content: &str,
        credential: &Credential,
    ) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push(RecordedCall {
            instructions: instructions.to_string(),
            content: content.to_string(),
            credential: credential.expose().to_string(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Failed("no scripted response".to_string())))
    }
}

#[derive(Default)]
pub struct RecordingViewer {
    pub opened: RefCell<Vec<PathBuf>>,
}

impl DocumentViewer for RecordingViewer {
    fn open(&self, path: &Path) -> std::io::Result<()> {
        self.opened.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

/// Search returning a fixed result and recording its queries
pub struct StaticSearch {
    result: Option<Vec<PathBuf>>,
    pub queries: RefCell<Vec<(String, String, usize)>>,
}

impl StaticSearch {
    pub fn returning(paths: Vec<PathBuf>) -> Self {
        Self {
            result: Some(paths),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: None,
            queries: RefCell::new(Vec::new()),
        }
    }
}

impl TestFileSearch for StaticSearch {
    fn search(
        &self,
        pattern: &str,
        exclude: &str,
        max_results: usize,
    ) -> Result<Vec<PathBuf>, SearchError> {
        self.queries
            .borrow_mut()
            .push((pattern.to_string(), exclude.to_string(), max_results));
        self.result
            .clone()
            .ok_or_else(|| SearchError::Walk("permission denied".to_string()))
    }
}
