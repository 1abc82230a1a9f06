use spdlog::{error, info, warn};

use crate::api::types::BlogSummary;
use crate::api::BlogWriter;
use crate::api::error::ValidationError;
use crate::document::{ContentDocument, DocumentStats, DraftStatus, DraftStore};
use crate::editor::actions::{route_key, FormatAction, KeyCombo, KeyCommand, KeydownResult, INDENT_UNIT};
use crate::editor::apply_action;
use crate::editor::text_ops::{indent, Edit, Selection};
use crate::notify::Notifications;

/// The document being written plus the state of the text surface editing it.
///
/// `selection` is `None` while no text surface is attached; every text
/// operation is then a no-op.
pub struct EditorSession {
    pub document: ContentDocument,
    selection: Option<Selection>,
    store: Option<DraftStore>,
    pub notifications: Notifications,
}

impl EditorSession {
    pub fn new(document: ContentDocument) -> Self {
        Self {
            document,
            selection: None,
            store: None,
            notifications: Notifications::new(),
        }
    }

    /// Starts from the cached draft when there is one.
    pub fn with_store(store: DraftStore) -> Self {
        let document = match store.load() {
            Ok(doc) => doc.unwrap_or_default(),
            Err(e) => {
                warn!("Could not read draft {}: {}", store.path().display(), e);
                ContentDocument::default()
            }
        };
        let mut session = Self::new(document);
        session.store = Some(store);
        session
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Called by the text surface on every interaction.
    pub fn select(&mut self, selection: Selection) {
        let count = self.document.body.chars().count();
        self.selection = Some(selection.clamp(count));
    }

    pub fn detach(&mut self) {
        self.selection = None;
    }

    pub fn set_body(&mut self, body: &str) {
        self.document.body = body.to_string();
        if let Some(sel) = self.selection {
            self.selection = Some(sel.clamp(self.document.body.chars().count()));
        }
    }

    fn apply(&mut self, edit: impl FnOnce(&str, Selection) -> Edit) -> bool {
        let Some(selection) = self.selection else {
            return false;
        };
        let Edit { body, selection } = edit(&self.document.body, selection);
        self.document.body = body;
        self.selection = Some(selection);
        true
    }

    pub fn apply_format(&mut self, action: FormatAction) -> bool {
        self.apply(|body, sel| apply_action(body, sel, action))
    }

    pub fn indent(&mut self) -> bool {
        self.apply(|body, sel| indent(body, sel, INDENT_UNIT))
    }

    pub fn handle_key(&mut self, combo: &KeyCombo) -> KeydownResult {
        match route_key(combo) {
            Some(KeyCommand::Format(action)) => {
                self.apply_format(action);
                KeydownResult::Handled
            }
            Some(KeyCommand::Indent) => {
                self.indent();
                KeydownResult::Handled
            }
            Some(KeyCommand::Save) => {
                self.save_local();
                KeydownResult::Handled
            }
            None => KeydownResult::NotHandled,
        }
    }

    /// Explicit save: mirrors the document to the local cache.
    pub fn save_local(&mut self) {
        if let Some(ref store) = self.store {
            if let Err(e) = store.save(&self.document) {
                error!("Could not write draft {}: {}", store.path().display(), e);
                self.notifications.error("Could not save content locally");
                return;
            }
        }
        self.notifications.success("Content saved!");
    }

    pub fn stats(&self) -> DocumentStats {
        self.document.stats()
    }

    fn validate_publish(&self) -> Result<(), ValidationError> {
        if self.document.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.document.body.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        if self.document.category.is_none() {
            return Err(ValidationError::MissingCategory);
        }
        Ok(())
    }

    /// Sends the document as a server side draft and mirrors it locally.
    pub async fn save_draft<W: BlogWriter>(&mut self, api: &W) -> Option<BlogSummary> {
        if self.document.title.trim().is_empty() {
            self.notifications.error(ValidationError::EmptyTitle.to_string());
            return None;
        }

        self.document.status = DraftStatus::Draft;
        let request = self.document.to_request(DraftStatus::Draft);
        match api.create_blog(&request).await {
            Ok(blog) => {
                info!("Draft {} saved as {}", blog.id, blog.slug);
                if let Some(ref store) = self.store {
                    if let Err(e) = store.save(&self.document) {
                        warn!("Draft {} saved remotely but not locally: {}", blog.id, e);
                    }
                }
                self.notifications.success("Draft saved successfully!");
                Some(blog)
            }
            Err(e) => {
                error!("Saving draft failed: {}", e);
                self.notifications.error(e.user_message());
                None
            }
        }
    }

    /// Submits the document for review. On success the editor starts over.
    pub async fn publish<W: BlogWriter>(&mut self, api: &W) -> Option<BlogSummary> {
        if let Err(e) = self.validate_publish() {
            self.notifications.error(e.to_string());
            return None;
        }

        let request = self.document.to_request(DraftStatus::PendingReview);
        match api.create_blog(&request).await {
            Ok(blog) => {
                info!("Blog {} submitted for review", blog.id);
                self.document = ContentDocument::default();
                if self.selection.is_some() {
                    self.selection = Some(Selection::caret(0));
                }
                if let Some(ref store) = self.store {
                    if let Err(e) = store.clear() {
                        warn!("Could not clear draft {}: {}", store.path().display(), e);
                    }
                }
                self.notifications.success("Blog submitted for review successfully!");
                Some(blog)
            }
            Err(e) => {
                error!("Publishing failed: {}", e);
                self.notifications.error(e.user_message());
                None
            }
        }
    }
}
