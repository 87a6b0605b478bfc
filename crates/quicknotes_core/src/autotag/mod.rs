//! Auto-tagging strategies.
//!
//! # Responsibility
//! - Stage keyword-dictionary tags for a note.
//! - Run AI tag requests on short-lived worker threads and hand their results
//!   back to the owning context through a completion queue.
//!
//! # Invariants
//! - Workers only compute `Result<String, AiError>`; callbacks never leave the
//!   owning context.
//! - Every submitted request produces exactly one completion, including when
//!   the worker cannot be spawned or the client panics.

pub mod ai;
pub mod keyword;
pub mod openai;

use crate::model::note::{Note, NoteId};
use ai::{build_tag_prompt, resolve_model_id, AiClient, AiError};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use keyword::KeywordDictionary;
use log::{debug, error};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Identifier of one in-flight AI request.
pub type RequestId = u64;

/// Invoked once per tag applied by an AI auto-tag request.
pub type TagAssignedCallback = Box<dyn FnMut(&str)>;
/// Receives the outcome of an AI suggestion request.
pub type SuggestionCallback = Box<dyn FnOnce(Result<Vec<String>, AiError>)>;

/// Owner-side continuation of an AI request.
pub enum PendingRequest {
    /// Apply parsed tags to the note, then notify per tag.
    AutoTag {
        note_id: NoteId,
        limit: usize,
        on_tag_assigned: TagAssignedCallback,
    },
    /// Hand parsed tags to the caller without mutating anything.
    Suggest { on_result: SuggestionCallback },
}

/// Inputs a worker needs for one round trip.
#[derive(Debug, Clone)]
pub struct AiJob {
    pub prompt: String,
    pub model_key: String,
    pub credential: String,
}

impl AiJob {
    pub fn for_note(
        note: &Note,
        limit: usize,
        existing_tags: &[String],
        model_key: String,
        credential: String,
    ) -> Self {
        Self {
            prompt: build_tag_prompt(&note.title, &note.content, limit, existing_tags),
            model_key,
            credential,
        }
    }
}

type Completion = (RequestId, Result<String, AiError>);

/// Keyword dictionary plus the AI worker pool and its completion queue.
pub struct AutoTagger {
    dictionary: KeywordDictionary,
    client: Arc<dyn AiClient>,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    pending: HashMap<RequestId, PendingRequest>,
    next_id: RequestId,
}

impl AutoTagger {
    pub fn new(dictionary: KeywordDictionary, client: Arc<dyn AiClient>) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            dictionary,
            client,
            sender,
            receiver,
            pending: HashMap::new(),
            next_id: 1,
        }
    }

    /// Stages at most `limit` keyword tags for `note`.
    pub fn keyword_tags(&self, note: &Note, limit: usize) -> Vec<String> {
        self.dictionary.stage_tags(note, limit)
    }

    /// Starts one AI round trip on a worker thread.
    pub fn submit(&mut self, job: AiJob, continuation: PendingRequest) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert(id, continuation);

        let client = Arc::clone(&self.client);
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("quicknotes-ai-{id}"))
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    run_job(client.as_ref(), &job)
                }));
                let result = outcome
                    .unwrap_or_else(|payload| Err(AiError::Panicked(panic_message(payload))));
                // Fails only when the tagger was dropped.
                let _ = sender.send((id, result));
            });

        match spawned {
            Ok(_) => debug!("event=ai_submit module=autotag status=ok request_id={id}"),
            Err(err) => {
                error!("event=ai_submit module=autotag status=error request_id={id} error={err}");
                let _ = self.sender.send((id, Err(AiError::Spawn(err.to_string()))));
            }
        }
        id
    }

    /// Takes one finished request without blocking.
    pub fn try_completion(&mut self) -> Option<(PendingRequest, Result<String, AiError>)> {
        loop {
            let (id, result) = self.receiver.try_recv().ok()?;
            if let Some(found) = self.claim(id, result) {
                return Some(found);
            }
        }
    }

    /// Blocks up to `timeout` for one finished request.
    pub fn wait_completion(
        &mut self,
        timeout: Duration,
    ) -> Option<(PendingRequest, Result<String, AiError>)> {
        if self.pending.is_empty() {
            return None;
        }
        loop {
            match self.receiver.recv_timeout(timeout) {
                Ok((id, result)) => {
                    if let Some(found) = self.claim(id, result) {
                        return Some(found);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    fn claim(
        &mut self,
        id: RequestId,
        result: Result<String, AiError>,
    ) -> Option<(PendingRequest, Result<String, AiError>)> {
        match self.pending.remove(&id) {
            Some(continuation) => Some((continuation, result)),
            None => {
                debug!(
                    "event=ai_complete module=autotag status=skip reason=unknown_request request_id={id}"
                );
                None
            }
        }
    }
}

fn run_job(client: &dyn AiClient, job: &AiJob) -> Result<String, AiError> {
    let model = resolve_model_id(client, &job.model_key, &job.credential);
    client.complete(&job.prompt, &model, &job.credential)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .unwrap_or_else(|| "non-string panic payload".to_string()),
    }
}
