//! Composition root exposed to the host application.
//!
//! # Responsibility
//! - Wire notes, colors, tag operations and auto-tagging together.
//! - Gate AI work on configuration and connectivity.
//! - Run AI continuations on the owning context when the host drains the
//!   completion queue.
//!
//! # Invariants
//! - The facade is `!Send`; every mutation happens on the context that owns it.
//! - The add policy runs before a note is inserted, so an added note is
//!   persisted once with its keyword tags.
//! - AI results are applied by note id; a result for a deleted note is dropped.

use crate::autotag::ai::{parse_tag_csv, AiClient, AiError, DisabledAiClient};
use crate::autotag::keyword::KeywordDictionary;
use crate::autotag::{AiJob, AutoTagger, PendingRequest, RequestId};
use crate::host::{Connectivity, LogNotifier, UserNotifier};
use crate::model::note::{Note, NoteId};
use crate::model::tag::{ColorId, Tag};
use crate::repo::library_store::LibraryStore;
use crate::service::color_assigner::{ColorAssigner, ColorOption, ColorPalette};
use crate::service::note_store::{NoteStore, SearchScope};
use crate::service::tag_registry::TagRegistry;
use crate::settings::{TagSettings, TaggingSettings};
use log::{debug, info, warn};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

const OFFLINE_NOTICE: &str = "Offline: using keyword tagging";

enum AiGate {
    NotConfigured,
    Offline,
    Ready(String),
}

/// Optional collaborators for [`TagFacade`].
pub struct TagFacadeBuilder {
    store: Rc<dyn LibraryStore>,
    palette: ColorPalette,
    dictionary: KeywordDictionary,
    ai_client: Arc<dyn AiClient>,
    settings: Box<dyn TagSettings>,
    connectivity: Box<dyn Connectivity>,
    notifier: Box<dyn UserNotifier>,
}

impl TagFacadeBuilder {
    pub fn palette(mut self, palette: ColorPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn dictionary(mut self, dictionary: KeywordDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn ai_client(mut self, client: Arc<dyn AiClient>) -> Self {
        self.ai_client = client;
        self
    }

    pub fn settings(mut self, settings: impl TagSettings + 'static) -> Self {
        self.settings = Box::new(settings);
        self
    }

    pub fn connectivity(mut self, connectivity: impl Connectivity + 'static) -> Self {
        self.connectivity = Box::new(connectivity);
        self
    }

    pub fn notifier(mut self, notifier: impl UserNotifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Loads the library and resolves a color for every tag in use.
    pub fn build(self) -> TagFacade {
        let notes = NoteStore::load(Rc::clone(&self.store));
        let mut colors = ColorAssigner::load(self.palette, self.store);
        for name in notes.tag_names() {
            colors.color_for(&name);
        }
        info!(
            "event=facade_init module=facade status=ok notes={} dictionary={}",
            notes.len(),
            self.dictionary.len()
        );

        TagFacade {
            notes,
            colors,
            tagger: AutoTagger::new(self.dictionary, self.ai_client),
            settings: self.settings,
            connectivity: self.connectivity,
            notifier: self.notifier,
        }
    }
}

/// Note/tag consistency engine.
pub struct TagFacade {
    notes: NoteStore,
    colors: ColorAssigner,
    tagger: AutoTagger,
    settings: Box<dyn TagSettings>,
    connectivity: Box<dyn Connectivity>,
    notifier: Box<dyn UserNotifier>,
}

impl TagFacade {
    /// Starts a builder with the default palette, an empty dictionary, AI
    /// disabled, always-online connectivity and log-only notices.
    pub fn builder(store: Rc<dyn LibraryStore>) -> TagFacadeBuilder {
        TagFacadeBuilder {
            store,
            palette: ColorPalette::default(),
            dictionary: KeywordDictionary::new(),
            ai_client: Arc::new(DisabledAiClient),
            settings: Box::new(TaggingSettings::default()),
            connectivity: Box::new(|| true),
            notifier: Box::new(LogNotifier),
        }
    }

    fn registry(&mut self) -> TagRegistry<'_> {
        TagRegistry::new(&mut self.notes, &mut self.colors)
    }

    fn ai_gate(&self) -> AiGate {
        if !self.settings.is_ai_configured() {
            return AiGate::NotConfigured;
        }
        if !self.connectivity.is_online() {
            return AiGate::Offline;
        }
        match self.settings.credential() {
            Some(credential) => AiGate::Ready(credential.trim().to_string()),
            None => AiGate::NotConfigured,
        }
    }

    fn notify(&self, message: &str) {
        self.notifier.show_notice(message);
    }

    /// Adds a note after running the configured auto-tag policy.
    ///
    /// Returns `None` when the title is empty or already used.
    pub fn add_note(&mut self, note: Note) -> Option<NoteId> {
        let mut note = self.notes.admit(note)?;
        let limit = self.settings.auto_tag_limit();

        let mut deferred = None;
        if !self.settings.is_ai_mode_enabled() {
            self.keyword_tag_detached(&mut note, limit);
        } else if self.settings.is_ai_confirmation_enabled() {
            // Suggestions are requested by the host; only the offline path tags.
            if !self.connectivity.is_online() {
                self.keyword_tag_detached(&mut note, limit);
            }
        } else {
            match self.ai_gate() {
                AiGate::NotConfigured => self.keyword_tag_detached(&mut note, limit),
                AiGate::Offline => {
                    self.keyword_tag_detached(&mut note, limit);
                    self.notify(OFFLINE_NOTICE);
                }
                AiGate::Ready(credential) => {
                    deferred = Some(self.ai_job(&note, limit, credential));
                }
            }
        }

        let id = self.notes.insert(note);
        if let Some(job) = deferred {
            self.tagger.submit(
                job,
                PendingRequest::AutoTag {
                    note_id: id,
                    limit,
                    on_tag_assigned: Box::new(|_: &str| {}),
                },
            );
        }
        Some(id)
    }

    fn keyword_tag_detached(&mut self, note: &mut Note, limit: usize) {
        let staged = self.tagger.keyword_tags(note, limit);
        if staged.is_empty() {
            return;
        }
        if TagRegistry::tag_note(&mut self.colors, note, &staged) {
            self.notify(&format!("Auto-tagged {}: {}", note.title, staged.join(", ")));
        }
    }

    pub fn delete_note(&mut self, id: NoteId) -> bool {
        self.notes.delete(id)
    }

    pub fn undo_delete(&mut self) -> bool {
        self.notes.undo_delete()
    }

    pub fn has_undo(&self) -> bool {
        self.notes.has_undo()
    }

    pub fn update_note(&mut self, id: NoteId, title: &str, content: &str) -> bool {
        self.notes.update_note(id, title, content)
    }

    pub fn toggle_pin(&mut self, id: NoteId) -> Option<bool> {
        self.notes.toggle_pin(id)
    }

    pub fn update_notification_settings(
        &mut self,
        id: NoteId,
        enabled: bool,
        at: Option<i64>,
    ) -> bool {
        self.notes.update_notification_settings(id, enabled, at)
    }

    /// Removes every note, clears the undo buffer and drops every color entry.
    pub fn delete_all(&mut self) {
        self.notes.clear();
        self.registry().cleanup_unused_tags();
    }

    pub fn search(&self, query: &str, scope: SearchScope) -> Vec<Note> {
        self.notes.search(query, scope)
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.notes()
    }

    pub fn notes_sorted(&self) -> Vec<Note> {
        self.notes.sorted()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn all_tags(&mut self) -> Vec<Tag> {
        self.registry().all_tags()
    }

    pub fn all_tag_names(&self) -> Vec<String> {
        self.notes.tag_names()
    }

    pub fn set_tag(&mut self, id: NoteId, name: &str) -> bool {
        self.registry().set_tag(id, name)
    }

    pub fn set_tags<S: AsRef<str>>(&mut self, id: NoteId, names: &[S]) -> bool {
        self.registry().set_tags(id, names)
    }

    pub fn rename_tag(&mut self, old_name: &str, new_name: &str) -> bool {
        self.registry().rename_tag(old_name, new_name)
    }

    pub fn delete_tag(&mut self, name: &str) -> bool {
        self.registry().delete_tag(name)
    }

    pub fn merge_tags<S: AsRef<str>>(&mut self, source_names: &[S], target_name: &str) -> bool {
        self.registry().merge_tags(source_names, target_name)
    }

    pub fn cleanup_unused_tags(&mut self) -> usize {
        self.registry().cleanup_unused_tags()
    }

    pub fn set_tag_color(&mut self, name: &str, color: ColorId) {
        self.registry().set_tag_color(name, color)
    }

    pub fn tag_color(&self, name: &str) -> Option<ColorId> {
        self.colors.peek_color(name)
    }

    pub fn available_colors(&self) -> &[ColorOption] {
        self.colors.available_colors()
    }

    /// Applies keyword tags to a live note. Returns the applied names.
    pub fn simple_auto_tag(&mut self, id: NoteId, limit: usize) -> Vec<String> {
        let Some(note) = self.notes.get(id) else {
            debug!("event=auto_tag_keyword module=facade status=skip reason=note_not_found");
            return Vec::new();
        };
        let staged = self.tagger.keyword_tags(note, limit);
        if staged.is_empty() {
            return staged;
        }
        let title = note.title.clone();
        if self.registry().set_tags(id, &staged) {
            self.notify(&format!("Auto-tagged {title}: {}", staged.join(", ")));
        }
        staged
    }

    /// Tags a live note through the AI provider, falling back to keywords when
    /// AI is not configured or the host is offline.
    ///
    /// Returns the request id when a request was started.
    pub fn ai_auto_tag(
        &mut self,
        id: NoteId,
        limit: usize,
        on_tag_assigned: impl FnMut(&str) + 'static,
    ) -> Option<RequestId> {
        match self.ai_gate() {
            AiGate::NotConfigured => {
                self.simple_auto_tag(id, limit);
                None
            }
            AiGate::Offline => {
                self.simple_auto_tag(id, limit);
                self.notify(OFFLINE_NOTICE);
                None
            }
            AiGate::Ready(credential) => {
                let Some(note) = self.notes.get(id) else {
                    debug!("event=auto_tag_ai module=facade status=skip reason=note_not_found");
                    return None;
                };
                let job = self.ai_job(note, limit, credential);
                Some(self.tagger.submit(
                    job,
                    PendingRequest::AutoTag {
                        note_id: id,
                        limit,
                        on_tag_assigned: Box::new(on_tag_assigned),
                    },
                ))
            }
        }
    }

    /// Requests tag suggestions without mutating anything.
    ///
    /// Not configured yields `Ok(vec![])` and offline yields
    /// `Err(AiError::Offline)`, both delivered immediately.
    pub fn ai_suggest_tags(
        &mut self,
        id: NoteId,
        limit: usize,
        on_result: impl FnOnce(Result<Vec<String>, AiError>) + 'static,
    ) -> Option<RequestId> {
        let credential = match self.ai_gate() {
            AiGate::NotConfigured => {
                on_result(Ok(Vec::new()));
                return None;
            }
            AiGate::Offline => {
                on_result(Err(AiError::Offline));
                return None;
            }
            AiGate::Ready(credential) => credential,
        };
        let Some(note) = self.notes.get(id) else {
            debug!("event=ai_suggest module=facade status=skip reason=note_not_found");
            on_result(Ok(Vec::new()));
            return None;
        };
        let job = self.ai_job(note, limit, credential);
        Some(self.tagger.submit(
            job,
            PendingRequest::Suggest {
                on_result: Box::new(on_result),
            },
        ))
    }

    fn ai_job(&self, note: &Note, limit: usize, credential: String) -> AiJob {
        AiJob::for_note(
            note,
            limit,
            &self.notes.tag_names(),
            self.settings.selected_model_key(),
            credential,
        )
    }

    /// Runs every finished AI continuation without blocking.
    ///
    /// Returns how many continuations ran.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut dispatched = 0;
        while let Some((continuation, result)) = self.tagger.try_completion() {
            self.complete(continuation, result);
            dispatched += 1;
        }
        dispatched
    }

    /// Blocks up to `timeout` for one AI completion, then drains the rest.
    pub fn wait_and_dispatch(&mut self, timeout: Duration) -> usize {
        match self.tagger.wait_completion(timeout) {
            Some((continuation, result)) => {
                self.complete(continuation, result);
                1 + self.dispatch_pending()
            }
            None => 0,
        }
    }

    pub fn pending_ai_requests(&self) -> usize {
        self.tagger.pending_requests()
    }

    fn complete(&mut self, continuation: PendingRequest, result: Result<String, AiError>) {
        match continuation {
            PendingRequest::Suggest { on_result } => {
                on_result(result.map(|reply| parse_tag_csv(&reply)));
            }
            PendingRequest::AutoTag {
                note_id,
                limit,
                mut on_tag_assigned,
            } => match result {
                Ok(reply) => {
                    let mut names = parse_tag_csv(&reply);
                    names.truncate(limit);
                    if names.is_empty() {
                        debug!("event=auto_tag_ai module=facade status=skip reason=no_tags");
                        return;
                    }
                    if !self.notes.contains(note_id) {
                        info!("event=auto_tag_ai module=facade status=skip reason=note_deleted");
                        return;
                    }
                    self.registry().set_tags(note_id, &names);
                    for name in &names {
                        on_tag_assigned(name);
                    }
                    info!(
                        "event=auto_tag_ai module=facade status=ok tags={}",
                        names.len()
                    );
                    self.notify(&format!("AI tagged: {}", names.join(", ")));
                }
                Err(err) => {
                    warn!("event=auto_tag_ai module=facade status=error error={err}");
                    self.notify(&format!("Auto-tag error: {err}"));
                }
            },
        }
    }

    pub fn is_ai_configured(&self) -> bool {
        self.settings.is_ai_configured()
    }

    pub fn is_ai_confirmation_enabled(&self) -> bool {
        self.settings.is_ai_confirmation_enabled()
    }

    pub fn credential(&self) -> Option<String> {
        self.settings.credential()
    }

    pub fn set_credential(&mut self, credential: &str) {
        self.settings.set_credential(credential);
    }

    pub fn settings(&self) -> &dyn TagSettings {
        self.settings.as_ref()
    }
}
