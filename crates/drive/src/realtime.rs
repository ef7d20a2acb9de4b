//! Client-side contract of the realtime collaboration service.
//!
//! A document is loaded by file id; the service calls back into
//! [`DocumentCallbacks`] once the model is ready, once to seed a freshly
//! created model, and whenever an error happens afterwards. Collaborative
//! objects are cheap handles: clones share the same underlying value.
//!
//! [`LocalRealtime`] implements the contract in process. It keeps models in
//! memory for the lifetime of the service and merges nothing; every
//! mutation simply replaces the shared value.

use crate::api::FileCreator;
use crate::error::DriveResult;
use crate::types::{Credential, FileResource, REALTIME_MIME_TYPE};
use async_trait::async_trait;
use parking_lot::RwLock;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    ClientError,
    ConcurrentCreation,
    Forbidden,
    InvalidCompoundOperation,
    NotFound,
    ServerError,
    TokenRefreshRequired,
}

impl ErrorType {
    pub const ALL: [ErrorType; 7] = [
        ErrorType::ClientError,
        ErrorType::ConcurrentCreation,
        ErrorType::Forbidden,
        ErrorType::InvalidCompoundOperation,
        ErrorType::NotFound,
        ErrorType::ServerError,
        ErrorType::TokenRefreshRequired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ClientError => "client_error",
            ErrorType::ConcurrentCreation => "concurrent_creation",
            ErrorType::Forbidden => "forbidden",
            ErrorType::InvalidCompoundOperation => "invalid_compound_operation",
            ErrorType::NotFound => "not_found",
            ErrorType::ServerError => "server_error",
            ErrorType::TokenRefreshRequired => "token_refresh_required",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{error_type}: {message}")]
pub struct RealtimeError {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub message: String,
    #[serde(rename = "isFatal")]
    pub is_fatal: bool,
}

impl RealtimeError {
    pub fn new(error_type: ErrorType, message: impl Into<String>, is_fatal: bool) -> Self {
        Self {
            error_type,
            message: message.into(),
            is_fatal,
        }
    }
}

/// Callbacks registered with [`RealtimeService::load`].
pub trait DocumentCallbacks: Send + Sync {
    /// Called once, when the document and its model are ready.
    fn on_file_loaded(&self, document: &Document);

    /// Called before `on_file_loaded`, only the first time a document is
    /// created.
    fn initialize_model(&self, model: &Model);

    /// Called for load and collaboration errors, at any point after the
    /// load started.
    fn handle_error(&self, error: &RealtimeError);
}

#[async_trait]
pub trait RealtimeService: Send + Sync {
    async fn load(&self, file_id: &str, callbacks: Arc<dyn DocumentCallbacks>);
}

#[derive(Clone)]
pub struct CollaborativeString {
    text: Arc<watch::Sender<String>>,
}

impl fmt::Debug for CollaborativeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CollaborativeString").field(&*self.text.borrow()).finish()
    }
}

impl PartialEq for CollaborativeString {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.text, &other.text)
    }
}

impl CollaborativeString {
    fn new(initial: &str) -> Self {
        let (tx, _) = watch::channel(initial.to_string());
        Self { text: Arc::new(tx) }
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.borrow().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.borrow().is_empty()
    }

    pub fn set_text(&self, value: &str) {
        self.text.send_if_modified(|current| {
            if current == value {
                return false;
            }
            value.clone_into(current);
            true
        });
    }

    pub fn append(&self, value: &str) {
        if value.is_empty() {
            return;
        }
        self.text.send_modify(|current| current.push_str(value));
    }

    /// Inserts at a character index, clamped to the end of the string.
    pub fn insert_string(&self, index: usize, value: &str) {
        if value.is_empty() {
            return;
        }
        self.text.send_modify(|current| {
            let at = byte_offset(current, index);
            current.insert_str(at, value);
        });
    }

    /// Removes characters in `start..end`.
    pub fn remove_range(&self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        self.text.send_if_modified(|current| {
            let from = byte_offset(current, start);
            let to = byte_offset(current, end);
            if from == to {
                return false;
            }
            current.replace_range(from..to, "");
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.text.subscribe()
    }
}

fn byte_offset(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollaborativeObject {
    String(CollaborativeString),
    Map(CollaborativeMap),
    Value(serde_json::Value),
}

impl CollaborativeObject {
    pub fn as_string(&self) -> Option<&CollaborativeString> {
        match self {
            CollaborativeObject::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<CollaborativeString> for CollaborativeObject {
    fn from(s: CollaborativeString) -> Self {
        CollaborativeObject::String(s)
    }
}

impl From<CollaborativeMap> for CollaborativeObject {
    fn from(m: CollaborativeMap) -> Self {
        CollaborativeObject::Map(m)
    }
}

impl From<serde_json::Value> for CollaborativeObject {
    fn from(v: serde_json::Value) -> Self {
        CollaborativeObject::Value(v)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollaborativeMap {
    entries: Arc<RwLock<BTreeMap<String, CollaborativeObject>>>,
}

impl PartialEq for CollaborativeMap {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl CollaborativeMap {
    pub fn get(&self, key: &str) -> Option<CollaborativeObject> {
        self.entries.read().get(key).cloned()
    }

    pub fn get_string(&self, key: &str) -> Option<CollaborativeString> {
        self.get(key).and_then(|o| o.as_string().cloned())
    }

    /// Returns the previous value stored under `key`.
    pub fn set(&self, key: &str, value: impl Into<CollaborativeObject>) -> Option<CollaborativeObject> {
        self.entries.write().insert(key.to_string(), value.into())
    }

    pub fn delete(&self, key: &str) -> Option<CollaborativeObject> {
        self.entries.write().remove(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    root: CollaborativeMap,
}

impl Model {
    pub fn create_string(&self, initial: &str) -> CollaborativeString {
        CollaborativeString::new(initial)
    }

    pub fn create_map(&self) -> CollaborativeMap {
        CollaborativeMap::default()
    }

    pub fn get_root(&self) -> CollaborativeMap {
        self.root.clone()
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    model: Model,
}

impl Document {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get_model(&self) -> &Model {
        &self.model
    }
}

/// In-process realtime service.
///
/// By default any file id can be loaded and is created on first load. A
/// strict service only loads ids that were registered or created through
/// its [`FileCreator`] implementation and reports `NOT_FOUND` otherwise.
#[derive(Default)]
pub struct LocalRealtime {
    strict: bool,
    models: RwLock<HashMap<String, Model>>,
    known_files: RwLock<HashSet<String>>,
    listeners: RwLock<HashMap<String, Vec<Arc<dyn DocumentCallbacks>>>>,
}

impl LocalRealtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn register_file(&self, file_id: &str) {
        self.known_files.write().insert(file_id.to_string());
    }

    pub fn is_loaded(&self, file_id: &str) -> bool {
        self.models.read().contains_key(file_id)
    }

    /// Delivers `error` to every callback set that loaded `file_id`.
    pub fn report_error(&self, file_id: &str, error: RealtimeError) {
        let listeners = self
            .listeners
            .read()
            .get(file_id)
            .cloned()
            .unwrap_or_default();
        for callbacks in listeners {
            callbacks.handle_error(&error);
        }
    }

    /// Tells every open document that its access token needs refreshing.
    pub fn expire_session(&self) {
        let file_ids: Vec<String> = self.listeners.read().keys().cloned().collect();
        for file_id in file_ids {
            self.report_error(
                &file_id,
                RealtimeError::new(
                    ErrorType::TokenRefreshRequired,
                    "The access token has expired.",
                    false,
                ),
            );
        }
    }
}

#[async_trait]
impl RealtimeService for LocalRealtime {
    async fn load(&self, file_id: &str, callbacks: Arc<dyn DocumentCallbacks>) {
        if self.strict && !self.known_files.read().contains(file_id) {
            tracing::debug!(file_id, "Unknown realtime file");
            callbacks.handle_error(&RealtimeError::new(
                ErrorType::NotFound,
                format!("File {file_id} does not exist."),
                true,
            ));
            return;
        }

        let (model, created) = {
            let mut models = self.models.write();
            match models.get(file_id) {
                Some(model) => (model.clone(), false),
                None => {
                    let model = Model::default();
                    models.insert(file_id.to_string(), model.clone());
                    (model, true)
                }
            }
        };

        self.listeners
            .write()
            .entry(file_id.to_string())
            .or_default()
            .push(callbacks.clone());

        if created {
            tracing::debug!(file_id, "Initializing new realtime model");
            callbacks.initialize_model(&model);
        }

        let document = Document {
            id: file_id.to_string(),
            model,
        };
        callbacks.on_file_loaded(&document);
    }
}

#[async_trait]
impl FileCreator for LocalRealtime {
    async fn create_file(&self, _credential: &Credential, title: &str) -> DriveResult<FileResource> {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        let id = format!("local-{suffix}");
        self.register_file(&id);
        Ok(FileResource {
            id: Some(id),
            title: Some(title.to_string()),
            mime_type: Some(REALTIME_MIME_TYPE.to_string()),
            ..FileResource::default()
        })
    }
}
