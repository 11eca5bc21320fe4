/// End-to-end tests for the "open test file" command
///
/// These run the real workspace search, settings file and OpenAI client
/// against a temporary workspace and a mock HTTP server. Only the terminal
/// (prompts) and the editor are scripted.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use mockito::{Matcher, Server};
use tempfile::TempDir;
use test_file_opener::contexts::{
    DocumentViewer, GenerationOutcome, OpenOutcome, PickItem, TestFileOpener, TestGenerator,
    UserInteraction, API_KEY_SETTING,
};
use test_file_opener::data::{ImplementationFileIdentity, SettingsStore};
use test_file_opener::registries::{
    FileSettingsStore, OpenAiConfig, OpenAiGenerator, WorkspaceSearch,
};

#[derive(Default)]
struct ScriptedUi {
    confirm_answer: bool,
    text_answers: RefCell<VecDeque<String>>,
    pick_answer: Option<usize>,
    confirms: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
    picks: RefCell<Vec<Vec<PickItem>>>,
}

impl UserInteraction for ScriptedUi {
    fn info(&self, _message: &str) {}

    fn error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirms.borrow_mut().push(message.to_string());
        self.confirm_answer
    }

    fn prompt_text(&self, _message: &str, _placeholder: &str) -> Option<String> {
        self.text_answers.borrow_mut().pop_front()
    }

    fn pick(&self, items: &[PickItem]) -> Option<usize> {
        self.picks.borrow_mut().push(items.to_vec());
        self.pick_answer
    }
}

#[derive(Default)]
struct RecordingViewer {
    opened: RefCell<Vec<PathBuf>>,
}

impl DocumentViewer for RecordingViewer {
    fn open(&self, path: &Path) -> std::io::Result<()> {
        self.opened.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

struct Workspace {
    _dir: TempDir,
    root: PathBuf,
    settings: FileSettingsStore,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().join("project");
        fs::create_dir_all(&root).unwrap();
        let settings = FileSettingsStore::new(Some(dir.path().join("config").join("settings.yml")));
        Self {
            _dir: dir,
            root,
            settings,
        }
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }
}

fn generator_for(server: &Server) -> OpenAiGenerator {
    OpenAiGenerator::new(OpenAiConfig {
        api_base: server.url(),
        model: "test-model".to_string(),
        timeout_secs: 5,
    })
    .expect("Failed to create client")
}

fn completion(content: &str) -> String {
    serde_json::json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

#[tokio::test]
async fn test_generates_missing_test_file() {
    let workspace = Workspace::new();
    let source = "export const foo = () => 42;\n";
    let file = workspace.write("src/Foo.ts", source);
    workspace.settings.set(API_KEY_SETTING, "sk-stored").unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-stored")
        .match_body(Matcher::Regex("export const foo".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("test content"))
        .expect(1)
        .create_async()
        .await;

    let generator = generator_for(&server);
    let search = WorkspaceSearch::new(workspace.root.clone());
    let ui = ScriptedUi {
        confirm_answer: true,
        ..Default::default()
    };
    let viewer = RecordingViewer::default();
    let opener = TestFileOpener::new(
        &search,
        &ui,
        &viewer,
        Some(TestGenerator::new(&generator, &workspace.settings, &ui, &viewer)),
    );

    let outcome = opener
        .open_test_file(&ImplementationFileIdentity::from_path(&file))
        .await;

    let target = workspace.root.join("src").join("Foo.test.ts");
    assert_eq!(
        outcome,
        OpenOutcome::Generation(GenerationOutcome::Written(target.clone()))
    );
    assert_eq!(fs::read_to_string(&target).unwrap(), "test content");
    assert_eq!(viewer.opened.borrow().as_slice(), &[target]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_key_is_replaced_and_persisted() {
    let workspace = Workspace::new();
    let file = workspace.write("src/Foo.ts", "export const foo = 1;\n");
    workspace.settings.set(API_KEY_SETTING, "sk-old").unwrap();

    let mut server = Server::new_async().await;
    let rejected = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-old")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-new")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("second content"))
        .expect(1)
        .create_async()
        .await;

    let generator = generator_for(&server);
    let search = WorkspaceSearch::new(workspace.root.clone());
    let ui = ScriptedUi {
        confirm_answer: true,
        text_answers: RefCell::new(VecDeque::from(vec!["sk-new".to_string()])),
        ..Default::default()
    };
    let viewer = RecordingViewer::default();
    let opener = TestFileOpener::new(
        &search,
        &ui,
        &viewer,
        Some(TestGenerator::new(&generator, &workspace.settings, &ui, &viewer)),
    );

    let outcome = opener
        .open_test_file(&ImplementationFileIdentity::from_path(&file))
        .await;

    let target = workspace.root.join("src").join("Foo.test.ts");
    assert_eq!(
        outcome,
        OpenOutcome::Generation(GenerationOutcome::Written(target.clone()))
    );
    assert_eq!(fs::read_to_string(&target).unwrap(), "second content");
    assert_eq!(
        workspace.settings.get(API_KEY_SETTING).unwrap().as_deref(),
        Some("sk-new")
    );
    rejected.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_declined_generation_calls_nothing() {
    let workspace = Workspace::new();
    let file = workspace.write("src/Foo.ts", "export const foo = 1;\n");
    workspace.settings.set(API_KEY_SETTING, "sk-stored").unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let generator = generator_for(&server);
    let search = WorkspaceSearch::new(workspace.root.clone());
    let ui = ScriptedUi::default();
    let viewer = RecordingViewer::default();
    let opener = TestFileOpener::new(
        &search,
        &ui,
        &viewer,
        Some(TestGenerator::new(&generator, &workspace.settings, &ui, &viewer)),
    );

    let outcome = opener
        .open_test_file(&ImplementationFileIdentity::from_path(&file))
        .await;

    assert_eq!(outcome, OpenOutcome::Generation(GenerationOutcome::Declined));
    assert_eq!(ui.confirms.borrow().len(), 1);
    assert!(!workspace.root.join("src").join("Foo.test.ts").exists());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_existing_test_files_are_picked_not_generated() {
    let workspace = Workspace::new();
    let file = workspace.write("src/Foo.ts", "export const foo = 1;\n");
    let unit = workspace.write("src/Foo.test.ts", "");
    workspace.write("e2e/Foo.spec.ts", "");
    workspace.write("node_modules/foo/Foo.test.ts", "");

    let server = Server::new_async().await;
    let generator = generator_for(&server);
    let search = WorkspaceSearch::new(workspace.root.clone());
    let ui = ScriptedUi {
        pick_answer: Some(1),
        ..Default::default()
    };
    let viewer = RecordingViewer::default();
    let opener = TestFileOpener::new(
        &search,
        &ui,
        &viewer,
        Some(TestGenerator::new(&generator, &workspace.settings, &ui, &viewer)),
    );

    let outcome = opener
        .open_test_file(&ImplementationFileIdentity::from_path(&file))
        .await;

    assert_eq!(outcome, OpenOutcome::Opened(unit.clone()));
    assert!(ui.confirms.borrow().is_empty());

    let picks = ui.picks.borrow();
    assert_eq!(picks.len(), 1);
    let labels: Vec<&str> = picks[0].iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["Foo.spec.ts", "Foo.test.ts"]);
    assert_eq!(viewer.opened.borrow().as_slice(), &[unit]);
}
