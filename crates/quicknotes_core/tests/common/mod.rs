#![allow(dead_code)]

use quicknotes_core::{
    AiClient, AiError, KeywordDictionary, LibraryStore, MemoryLibraryStore, Note, NoteId,
    TagFacade, TaggingSettings,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const AI_WAIT: Duration = Duration::from_secs(5);

/// Scripted AI provider recording every call it receives.
pub struct FakeAiClient {
    reply: Mutex<Result<String, AiError>>,
    models: Mutex<Result<Vec<String>, AiError>>,
    completions: Mutex<Vec<(String, String)>>,
    listings: Mutex<usize>,
    panics: bool,
}

impl FakeAiClient {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Ok(reply.to_string())),
            models: Mutex::new(Ok(Vec::new())),
            completions: Mutex::new(Vec::new()),
            listings: Mutex::new(0),
            panics: false,
        })
    }

    /// Records the call, then panics on the worker thread.
    pub fn panicking() -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Ok(String::new())),
            models: Mutex::new(Ok(Vec::new())),
            completions: Mutex::new(Vec::new()),
            listings: Mutex::new(0),
            panics: true,
        })
    }

    pub fn failing(err: AiError) -> Arc<Self> {
        let client = Self::replying("");
        *client.reply.lock().unwrap() = Err(err);
        client
    }

    pub fn set_models(&self, ids: &[&str]) {
        *self.models.lock().unwrap() = Ok(ids.iter().map(|id| id.to_string()).collect());
    }

    pub fn completion_calls(&self) -> usize {
        self.completions.lock().unwrap().len()
    }

    pub fn listing_calls(&self) -> usize {
        *self.listings.lock().unwrap()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.completions.lock().unwrap().last().map(|(prompt, _)| prompt.clone())
    }

    pub fn last_model(&self) -> Option<String> {
        self.completions.lock().unwrap().last().map(|(_, model)| model.clone())
    }
}

impl AiClient for FakeAiClient {
    fn complete(&self, prompt: &str, model: &str, _credential: &str) -> Result<String, AiError> {
        self.completions
            .lock()
            .unwrap()
            .push((prompt.to_string(), model.to_string()));
        if self.panics {
            panic!("provider crashed");
        }
        self.reply.lock().unwrap().clone()
    }

    fn list_model_ids(&self, _credential: &str) -> Result<Vec<String>, AiError> {
        *self.listings.lock().unwrap() += 1;
        self.models.lock().unwrap().clone()
    }
}

pub fn dictionary() -> KeywordDictionary {
    [
        ("meeting", "Work"),
        ("deadline", "Work"),
        ("milk", "Groceries"),
        ("eggs", "Groceries"),
        ("flight", "Travel"),
        ("gym", "Health"),
    ]
    .into_iter()
    .collect()
}

pub fn keyword_settings() -> TaggingSettings {
    TaggingSettings::default()
}

pub fn ai_settings(confirmation: bool) -> TaggingSettings {
    TaggingSettings {
        ai_mode: true,
        ai_confirmation: confirmation,
        credential: Some("sk-test".to_string()),
        ..TaggingSettings::default()
    }
}

/// Facade wired to in-memory collaborators the test can observe.
pub struct Harness {
    pub facade: TagFacade,
    pub store: Rc<MemoryLibraryStore>,
    pub ai: Arc<FakeAiClient>,
    pub online: Rc<Cell<bool>>,
    pub notices: Rc<RefCell<Vec<String>>>,
}

impl Harness {
    pub fn new(settings: TaggingSettings) -> Self {
        Self::with_store(settings, MemoryLibraryStore::new(), FakeAiClient::replying("Work"))
    }

    pub fn with_ai(settings: TaggingSettings, ai: Arc<FakeAiClient>) -> Self {
        Self::with_store(settings, MemoryLibraryStore::new(), ai)
    }

    pub fn with_store(
        settings: TaggingSettings,
        store: MemoryLibraryStore,
        ai: Arc<FakeAiClient>,
    ) -> Self {
        let store = Rc::new(store);
        let online = Rc::new(Cell::new(true));
        let notices = Rc::new(RefCell::new(Vec::new()));

        let library: Rc<dyn LibraryStore> = store.clone();
        let connected = Rc::clone(&online);
        let sink = Rc::clone(&notices);
        let facade = TagFacade::builder(library)
            .dictionary(dictionary())
            .ai_client(ai.clone())
            .settings(settings)
            .connectivity(move || connected.get())
            .notifier(move |message: &str| sink.borrow_mut().push(message.to_string()))
            .build();

        Self {
            facade,
            store,
            ai,
            online,
            notices,
        }
    }

    pub fn add(&mut self, title: &str, content: &str) -> NoteId {
        self.facade.add_note(Note::new(title, content)).unwrap()
    }

    pub fn note(&self, id: NoteId) -> &Note {
        self.facade.get(id).unwrap()
    }

    pub fn tags_of(&self, id: NoteId) -> Vec<String> {
        self.note(id).tag_names()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }

    /// Total successful writes of both documents.
    pub fn writes(&self) -> usize {
        self.store.note_writes() + self.store.color_writes()
    }

    pub fn drain_ai(&mut self) -> usize {
        let mut dispatched = 0;
        while self.facade.pending_ai_requests() > 0 {
            let ran = self.facade.wait_and_dispatch(AI_WAIT);
            assert!(ran > 0, "AI request did not complete in time");
            dispatched += ran;
        }
        dispatched
    }
}

pub fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
