//! Fakes for the capability traits.

use crate::page::{AuthControl, PageHost};
use crate::params::HistoryEntry;
use async_trait::async_trait;
use parking_lot::Mutex;
use realtime_pad_drive::api::{FileCreator, IdentityProvider};
use realtime_pad_drive::auth::AuthProvider;
use realtime_pad_drive::realtime::{DocumentCallbacks, LocalRealtime, RealtimeService};
use realtime_pad_drive::{AuthRequest, Credential, DriveError, DriveResult, FileResource};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct FakeAuth {
    silent_ok: bool,
    modules_ok: bool,
    interactive: Mutex<VecDeque<bool>>,
    requests: Mutex<Vec<AuthRequest>>,
    modules_loaded: AtomicUsize,
}

impl FakeAuth {
    pub fn silent_ok() -> Self {
        Self::build(true, true, vec![])
    }

    /// Silent attempts fail; interactive attempts succeed or fail in order.
    pub fn interactive(outcomes: Vec<bool>) -> Self {
        Self::build(false, true, outcomes)
    }

    pub fn failing_modules() -> Self {
        Self::build(true, false, vec![])
    }

    fn build(silent_ok: bool, modules_ok: bool, outcomes: Vec<bool>) -> Self {
        Self {
            silent_ok,
            modules_ok,
            interactive: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
            modules_loaded: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> Vec<AuthRequest> {
        self.requests.lock().clone()
    }

    pub fn modules_loaded(&self) -> usize {
        self.modules_loaded.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn load_modules(&self, _modules: &[&str]) -> DriveResult<()> {
        if !self.modules_ok {
            return Err(DriveError::Config("client library unavailable".to_string()));
        }
        self.modules_loaded.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn authorize(&self, request: &AuthRequest) -> DriveResult<Credential> {
        self.requests.lock().push(request.clone());
        let ok = if request.immediate {
            self.silent_ok
        } else {
            self.interactive.lock().pop_front().unwrap_or(false)
        };
        if ok {
            Ok(Credential::bearer("ya29.test"))
        } else {
            Err(DriveError::Auth("denied".to_string()))
        }
    }
}

pub struct FakeIdentity {
    result: Option<Option<String>>,
}

impl FakeIdentity {
    pub fn with_id(id: &str) -> Self {
        Self {
            result: Some(Some(id.to_string())),
        }
    }

    pub fn without_id() -> Self {
        Self { result: Some(None) }
    }

    pub fn failing() -> Self {
        Self { result: None }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn user_id(&self, _credential: &Credential) -> DriveResult<Option<String>> {
        self.result
            .clone()
            .ok_or_else(|| DriveError::Api("userinfo unavailable".to_string()))
    }
}

/// Auth button that is clicked automatically a fixed number of times,
/// then never again.
pub struct FakeControl {
    clicks: AtomicUsize,
    armed: AtomicUsize,
    enabled: Mutex<Vec<bool>>,
}

impl FakeControl {
    pub fn new(clicks: usize) -> Self {
        Self {
            clicks: AtomicUsize::new(clicks),
            armed: AtomicUsize::new(0),
            enabled: Mutex::new(Vec::new()),
        }
    }

    pub fn arm_count(&self) -> usize {
        self.armed.load(Ordering::SeqCst)
    }

    pub fn enabled_history(&self) -> Vec<bool> {
        self.enabled.lock().clone()
    }
}

#[async_trait]
impl AuthControl for FakeControl {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.lock().push(enabled);
    }

    async fn wait_for_click(&self) {
        self.armed.fetch_add(1, Ordering::SeqCst);
        let remaining = self.clicks.load(Ordering::SeqCst);
        if remaining == 0 {
            std::future::pending::<()>().await;
        }
        self.clicks.store(remaining - 1, Ordering::SeqCst);
    }
}

pub struct FakeFiles {
    response: Mutex<Option<DriveResult<FileResource>>>,
    titles: Mutex<Vec<String>>,
}

impl FakeFiles {
    pub fn creating(id: &str) -> Self {
        Self::responding(Ok(FileResource {
            id: Some(id.to_string()),
            ..FileResource::default()
        }))
    }

    pub fn responding(response: DriveResult<FileResource>) -> Self {
        Self {
            response: Mutex::new(Some(response)),
            titles: Mutex::new(Vec::new()),
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().clone()
    }
}

#[async_trait]
impl FileCreator for FakeFiles {
    async fn create_file(&self, _credential: &Credential, title: &str) -> DriveResult<FileResource> {
        self.titles.lock().push(title.to_string());
        self.response
            .lock()
            .take()
            .unwrap_or_else(|| Err(DriveError::Api("no more files".to_string())))
    }
}

#[derive(Default)]
pub struct FakePage {
    history: Mutex<Vec<HistoryEntry>>,
    alerts: Mutex<Vec<String>>,
    navigations: Mutex<Vec<String>>,
}

impl FakePage {
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }
}

impl PageHost for FakePage {
    fn push_history(&self, entry: &HistoryEntry) {
        self.history.lock().push(entry.clone());
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }

    fn navigate(&self, href: &str) {
        self.navigations.lock().push(href.to_string());
    }
}

/// [`LocalRealtime`] that remembers which ids were requested.
pub struct RecordingRealtime {
    pub inner: LocalRealtime,
    requested: Mutex<Vec<String>>,
}

impl RecordingRealtime {
    pub fn new(inner: LocalRealtime) -> Self {
        Self {
            inner,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl RealtimeService for RecordingRealtime {
    async fn load(&self, file_id: &str, callbacks: Arc<dyn DocumentCallbacks>) {
        self.requested.lock().push(file_id.to_string());
        self.inner.load(file_id, callbacks).await;
    }
}
