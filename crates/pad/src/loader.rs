use crate::authorizer::Authorizer;
use crate::page::{AuthControl, PageHost};
use crate::params::{HistoryEntry, SessionParams};
use realtime_pad_drive::api::{FileCreator, IdentityProvider};
use realtime_pad_drive::auth::AuthProvider;
use realtime_pad_drive::realtime::{
    Document, DocumentCallbacks, ErrorType, Model, RealtimeError, RealtimeService,
};
use realtime_pad_drive::{DriveError, DriveResult, FileResource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info, warn};

pub const DEFAULT_TITLE: &str = "新しいリアルタイムドキュメント";

pub const NOT_FOUND_MESSAGE: &str =
    "The file was not found. It does not exist or you do not have read access to the file.";

pub type FileLoadedFn = Arc<dyn Fn(&Document) + Send + Sync>;
pub type InitializeModelFn = Arc<dyn Fn(&Model) + Send + Sync>;
pub type ErrorPolicyFn = Arc<dyn Fn(&RealtimeError) -> ErrorAction + Send + Sync>;

/// What to do about an error delivered by the realtime service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorAction {
    Reauthorize,
    AlertAndNavigateHome(String),
    Ignore,
    /// No policy covers this error type.
    Unhandled,
}

pub fn default_error_policy(error: &RealtimeError) -> ErrorAction {
    match error.error_type {
        ErrorType::TokenRefreshRequired => ErrorAction::Reauthorize,
        ErrorType::ClientError => {
            ErrorAction::AlertAndNavigateHome(format!("An Error happened: {}", error.message))
        }
        ErrorType::NotFound => ErrorAction::AlertAndNavigateHome(NOT_FOUND_MESSAGE.to_string()),
        _ => ErrorAction::Unhandled,
    }
}

#[derive(Clone)]
pub struct LoaderOptions {
    pub on_file_loaded: Option<FileLoadedFn>,
    pub initialize_model: Option<InitializeModelFn>,
    pub handle_errors: Option<ErrorPolicyFn>,
    pub auto_create: bool,
    pub default_title: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            on_file_loaded: None,
            initialize_model: None,
            handle_errors: None,
            auto_create: false,
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl LoaderOptions {
    pub fn on_file_loaded(mut self, f: impl Fn(&Document) + Send + Sync + 'static) -> Self {
        self.on_file_loaded = Some(Arc::new(f));
        self
    }

    pub fn initialize_model(mut self, f: impl Fn(&Model) + Send + Sync + 'static) -> Self {
        self.initialize_model = Some(Arc::new(f));
        self
    }

    pub fn handle_errors(
        mut self,
        f: impl Fn(&RealtimeError) -> ErrorAction + Send + Sync + 'static,
    ) -> Self {
        self.handle_errors = Some(Arc::new(f));
        self
    }

    pub fn auto_create(mut self, auto_create: bool) -> Self {
        self.auto_create = auto_create;
        self
    }

    pub fn default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    FileId,
    OpenState,
    Created,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Requested { file_id: String, source: LoadSource },
    CreationFailed,
    /// Nothing to open and auto-create is off.
    Idle,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("a document load was already started")]
    AlreadyStarted,

    #[error("client modules failed to load: {0}")]
    ModuleLoad(#[from] DriveError),
}

/// External services a [`Loader`] drives.
pub struct Collaborators {
    pub auth: Arc<dyn AuthProvider>,
    pub identity: Arc<dyn IdentityProvider>,
    pub auth_control: Arc<dyn AuthControl>,
    pub realtime: Arc<dyn RealtimeService>,
    pub files: Arc<dyn FileCreator>,
    pub page: Arc<dyn PageHost>,
}

/// Authorizes, then opens, resumes or creates exactly one document.
pub struct Loader {
    params: SessionParams,
    options: LoaderOptions,
    authorizer: Authorizer,
    realtime: Arc<dyn RealtimeService>,
    files: Arc<dyn FileCreator>,
    page: Arc<dyn PageHost>,
    phase: Arc<watch::Sender<LoadPhase>>,
    load_started: AtomicBool,
    errors_tx: mpsc::UnboundedSender<RealtimeError>,
    errors_rx: Mutex<mpsc::UnboundedReceiver<RealtimeError>>,
}

impl Loader {
    pub fn new(
        client_id: &str,
        params: SessionParams,
        options: LoaderOptions,
        collaborators: Collaborators,
    ) -> Self {
        let authorizer = Authorizer::new(
            client_id,
            params.user_id().map(str::to_string),
            collaborators.auth,
            collaborators.identity,
            collaborators.auth_control,
        );
        let (phase, _) = watch::channel(LoadPhase::Unauthenticated);
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();

        Self {
            params,
            options,
            authorizer,
            realtime: collaborators.realtime,
            files: collaborators.files,
            page: collaborators.page,
            phase: Arc::new(phase),
            load_started: AtomicBool::new(false),
            errors_tx,
            errors_rx: Mutex::new(errors_rx),
        }
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    pub fn phase(&self) -> LoadPhase {
        *self.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<LoadPhase> {
        self.phase.subscribe()
    }

    /// Authorizes, runs `after_auth`, then loads.
    pub async fn start(&self, after_auth: impl FnOnce() + Send) -> Result<LoadOutcome, LoadError> {
        self.set_phase(LoadPhase::Authenticating);
        if let Err(e) = self.authorizer.start().await {
            error!("Authorization could not start: {e}");
            self.set_phase(LoadPhase::Failed);
            return Err(e.into());
        }
        self.set_phase(LoadPhase::Authenticated);

        after_auth();
        self.load().await
    }

    pub async fn load(&self) -> Result<LoadOutcome, LoadError> {
        if self.load_started.swap(true, Ordering::SeqCst) {
            warn!("Ignoring a second document load");
            return Err(LoadError::AlreadyStarted);
        }

        if let Some(file_id) = self.params.file_id() {
            let file_id = file_id.to_string();
            self.request_document(&file_id).await;
            return Ok(LoadOutcome::Requested {
                file_id,
                source: LoadSource::FileId,
            });
        }

        if let Some(open) = self.params.open_request() {
            self.page
                .push_history(&HistoryEntry::new(open.file_id.clone(), open.user_id));
            self.request_document(&open.file_id).await;
            return Ok(LoadOutcome::Requested {
                file_id: open.file_id,
                source: LoadSource::OpenState,
            });
        }

        if self.options.auto_create {
            return Ok(self.create_new_file_and_redirect().await);
        }

        debug!("No document to open");
        Ok(LoadOutcome::Idle)
    }

    /// Asks Drive for a new realtime-backed file. The response is returned
    /// without inspection.
    pub async fn create_realtime_file(&self, title: &str) -> DriveResult<FileResource> {
        let credential = self
            .authorizer
            .credential()
            .ok_or_else(|| DriveError::Auth("not authorized".to_string()))?;
        self.files.create_file(&credential, title).await
    }

    pub async fn create_new_file_and_redirect(&self) -> LoadOutcome {
        let file = match self.create_realtime_file(&self.options.default_title).await {
            Ok(FileResource { id: Some(id), .. }) => id,
            Ok(file) => {
                error!(?file, "Error creating file");
                self.set_phase(LoadPhase::Failed);
                return LoadOutcome::CreationFailed;
            }
            Err(e) => {
                error!("Error creating file: {e}");
                self.set_phase(LoadPhase::Failed);
                return LoadOutcome::CreationFailed;
            }
        };

        info!(file_id = %file, "Created realtime file");
        self.page
            .push_history(&HistoryEntry::new(file.clone(), self.authorizer.user_id()));
        self.request_document(&file).await;
        LoadOutcome::Requested {
            file_id: file,
            source: LoadSource::Created,
        }
    }

    async fn request_document(&self, file_id: &str) {
        info!(file_id, "Loading realtime document");
        self.set_phase(LoadPhase::Loading);
        let callbacks = Arc::new(LoaderCallbacks {
            on_file_loaded: self.options.on_file_loaded.clone(),
            initialize_model: self.options.initialize_model.clone(),
            errors: self.errors_tx.clone(),
            phase: self.phase.clone(),
        });
        self.realtime.load(file_id, callbacks).await;
    }

    /// Applies the error policy to every error the service reports. Runs
    /// for as long as the loader lives.
    pub async fn serve_errors(&self) {
        let mut errors = self.errors_rx.lock().await;
        while let Some(error) = errors.recv().await {
            self.handle_error(&error).await;
        }
    }

    /// Handles errors already queued, without waiting for more.
    pub async fn drain_errors(&self) -> usize {
        let mut handled = 0;
        loop {
            let next = self.errors_rx.lock().await.try_recv();
            let Ok(error) = next else {
                return handled;
            };
            self.handle_error(&error).await;
            handled += 1;
        }
    }

    pub async fn handle_error(&self, error: &RealtimeError) {
        let action = match self.options.handle_errors {
            Some(ref policy) => policy(error),
            None => default_error_policy(error),
        };
        debug!(%error, ?action, "Realtime error");

        match action {
            ErrorAction::Reauthorize => {
                info!("Access token expired, authorizing again");
                self.authorizer.authorize().await;
            }
            ErrorAction::AlertAndNavigateHome(message) => {
                self.page.alert(&message);
                self.page.navigate("/");
            }
            ErrorAction::Ignore => {}
            ErrorAction::Unhandled => {
                warn!(
                    error_type = %error.error_type,
                    fatal = error.is_fatal,
                    "No handler configured for realtime error: {}",
                    error.message
                );
            }
        }
    }

    fn set_phase(&self, phase: LoadPhase) {
        let previous = self.phase.send_replace(phase);
        if previous != phase {
            debug!(?previous, ?phase, "Load phase changed");
        }
    }
}

struct LoaderCallbacks {
    on_file_loaded: Option<FileLoadedFn>,
    initialize_model: Option<InitializeModelFn>,
    errors: mpsc::UnboundedSender<RealtimeError>,
    phase: Arc<watch::Sender<LoadPhase>>,
}

impl DocumentCallbacks for LoaderCallbacks {
    fn on_file_loaded(&self, document: &Document) {
        self.phase.send_replace(LoadPhase::Ready);
        match self.on_file_loaded {
            Some(ref f) => f(document),
            None => info!(file_id = document.id(), "File loaded"),
        }
    }

    fn initialize_model(&self, model: &Model) {
        match self.initialize_model {
            Some(ref f) => f(model),
            None => info!("Initializing model"),
        }
    }

    fn handle_error(&self, error: &RealtimeError) {
        if error.is_fatal {
            self.phase.send_replace(LoadPhase::Failed);
        }
        let _ = self.errors.send(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeAuth, FakeControl, FakeFiles, FakeIdentity, FakePage, RecordingRealtime};
    use parking_lot::Mutex as SyncMutex;
    use realtime_pad_drive::realtime::LocalRealtime;

    struct Harness {
        loader: Loader,
        auth: Arc<FakeAuth>,
        realtime: Arc<RecordingRealtime>,
        files: Arc<FakeFiles>,
        page: Arc<FakePage>,
    }

    fn harness_with(query: &str, options: LoaderOptions, files: FakeFiles, realtime: LocalRealtime) -> Harness {
        let auth = Arc::new(FakeAuth::silent_ok());
        let realtime = Arc::new(RecordingRealtime::new(realtime));
        let files = Arc::new(files);
        let page = Arc::new(FakePage::default());
        let loader = Loader::new(
            "client-id",
            SessionParams::parse(query),
            options,
            Collaborators {
                auth: auth.clone(),
                identity: Arc::new(FakeIdentity::with_id("U-me")),
                auth_control: Arc::new(FakeControl::new(0)),
                realtime: realtime.clone(),
                files: files.clone(),
                page: page.clone(),
            },
        );
        Harness {
            loader,
            auth,
            realtime,
            files,
            page,
        }
    }

    fn harness(query: &str, options: LoaderOptions) -> Harness {
        harness_with(query, options, FakeFiles::creating("new-file"), LocalRealtime::new())
    }

    #[tokio::test]
    async fn file_id_is_loaded_directly() {
        let h = harness("?fileId=X", LoaderOptions::default().auto_create(true));
        let outcome = h.loader.start(|| {}).await.expect("start");

        assert_eq!(
            outcome,
            LoadOutcome::Requested {
                file_id: "X".to_string(),
                source: LoadSource::FileId,
            }
        );
        assert_eq!(h.realtime.requested(), vec!["X".to_string()]);
        assert!(h.files.titles().is_empty());
        assert!(h.page.history().is_empty());
        assert_eq!(h.loader.phase(), LoadPhase::Ready);
    }

    #[tokio::test]
    async fn file_id_wins_over_state() {
        let h = harness(
            r#"?fileId=X&state={"action":"open","ids":["A"],"userId":"U"}"#,
            LoaderOptions::default(),
        );
        h.loader.start(|| {}).await.expect("start");
        assert_eq!(h.realtime.requested(), vec!["X".to_string()]);
        assert!(h.page.history().is_empty());
    }

    #[tokio::test]
    async fn open_state_resolves_document_and_pushes_history() {
        let h = harness(
            "?state=%7B%22action%22%3A%22open%22%2C%22ids%22%3A%5B%22A%22%5D%2C%22userId%22%3A%22U%22%7D",
            LoaderOptions::default().auto_create(true),
        );
        let outcome = h.loader.start(|| {}).await.expect("start");

        assert_eq!(
            outcome,
            LoadOutcome::Requested {
                file_id: "A".to_string(),
                source: LoadSource::OpenState,
            }
        );
        assert_eq!(h.realtime.requested(), vec!["A".to_string()]);
        let history = h.page.history();
        assert_eq!(history, vec![HistoryEntry::new("A", Some("U".to_string()))]);
        assert_eq!(history[0].url(), "?fileId=A&userId=U");
        assert!(h.files.titles().is_empty());
    }

    #[tokio::test]
    async fn invalid_state_falls_through_to_auto_create() {
        let h = harness(
            "?state=%7Bbroken",
            LoaderOptions::default().auto_create(true).default_title("Scratch"),
        );
        let outcome = h.loader.start(|| {}).await.expect("start");

        assert_eq!(
            outcome,
            LoadOutcome::Requested {
                file_id: "new-file".to_string(),
                source: LoadSource::Created,
            }
        );
        assert_eq!(h.files.titles(), vec!["Scratch".to_string()]);
    }

    #[tokio::test]
    async fn invalid_state_without_auto_create_is_idle() {
        let h = harness("?state=not-json", LoaderOptions::default());
        let outcome = h.loader.start(|| {}).await.expect("start");

        assert_eq!(outcome, LoadOutcome::Idle);
        assert!(h.realtime.requested().is_empty());
        assert!(h.files.titles().is_empty());
        assert_eq!(h.loader.phase(), LoadPhase::Authenticated);
    }

    #[tokio::test]
    async fn auto_create_uses_default_title_once_and_redirects() {
        let h = harness("", LoaderOptions::default().auto_create(true));
        h.loader.start(|| {}).await.expect("start");

        assert_eq!(h.files.titles(), vec![DEFAULT_TITLE.to_string()]);
        assert_eq!(
            h.page.history(),
            vec![HistoryEntry::new("new-file", Some("U-me".to_string()))]
        );
        assert_eq!(h.realtime.requested(), vec!["new-file".to_string()]);
        assert_eq!(h.loader.phase(), LoadPhase::Ready);
    }

    #[tokio::test]
    async fn creation_without_id_is_logged_and_not_retried() {
        let h = harness_with(
            "",
            LoaderOptions::default().auto_create(true),
            FakeFiles::responding(Ok(FileResource {
                error: Some(serde_json::json!({"code": 403})),
                ..FileResource::default()
            })),
            LocalRealtime::new(),
        );
        let outcome = h.loader.start(|| {}).await.expect("start");

        assert_eq!(outcome, LoadOutcome::CreationFailed);
        assert_eq!(h.files.titles().len(), 1);
        assert!(h.page.history().is_empty());
        assert!(h.realtime.requested().is_empty());
        assert_eq!(h.loader.phase(), LoadPhase::Failed);
    }

    #[tokio::test]
    async fn creation_transport_error_is_a_creation_failure() {
        let h = harness_with(
            "",
            LoaderOptions::default().auto_create(true),
            FakeFiles::responding(Err(DriveError::Api("backend down".to_string()))),
            LocalRealtime::new(),
        );
        let outcome = h.loader.start(|| {}).await.expect("start");
        assert_eq!(outcome, LoadOutcome::CreationFailed);
    }

    #[tokio::test]
    async fn load_runs_at_most_once() {
        let h = harness("?fileId=X", LoaderOptions::default());
        h.loader.start(|| {}).await.expect("start");

        let second = h.loader.load().await;
        assert!(matches!(second, Err(LoadError::AlreadyStarted)));
        assert_eq!(h.realtime.requested().len(), 1);
    }

    #[tokio::test]
    async fn after_auth_runs_before_load() {
        let h = harness("?fileId=X", LoaderOptions::default());
        let seen = Arc::new(SyncMutex::new(None));
        let realtime = h.realtime.clone();
        let record = seen.clone();
        h.loader
            .start(move || *record.lock() = Some(realtime.requested().len()))
            .await
            .expect("start");

        assert_eq!(*seen.lock(), Some(0));
        assert_eq!(h.auth.requests().len(), 1);
    }

    #[tokio::test]
    async fn module_failure_fails_the_load() {
        let auth = Arc::new(FakeAuth::failing_modules());
        let realtime = Arc::new(RecordingRealtime::new(LocalRealtime::new()));
        let loader = Loader::new(
            "client-id",
            SessionParams::parse("?fileId=X"),
            LoaderOptions::default(),
            Collaborators {
                auth,
                identity: Arc::new(FakeIdentity::with_id("U")),
                auth_control: Arc::new(FakeControl::new(0)),
                realtime: realtime.clone(),
                files: Arc::new(FakeFiles::creating("unused")),
                page: Arc::new(FakePage::default()),
            },
        );

        assert!(matches!(loader.start(|| {}).await, Err(LoadError::ModuleLoad(_))));
        assert!(realtime.requested().is_empty());
        assert_eq!(loader.phase(), LoadPhase::Failed);
    }

    #[tokio::test]
    async fn initialize_model_precedes_file_loaded_only_on_creation() {
        let calls = Arc::new(SyncMutex::new(Vec::new()));
        let init_calls = calls.clone();
        let loaded_calls = calls.clone();
        let options = LoaderOptions::default()
            .initialize_model(move |model| {
                let text = model.create_string("Hello Realtime World!");
                model.get_root().set("text", text);
                init_calls.lock().push("initialize".to_string());
            })
            .on_file_loaded(move |doc| {
                let text = doc
                    .get_model()
                    .get_root()
                    .get_string("text")
                    .map(|s| s.text())
                    .unwrap_or_default();
                loaded_calls.lock().push(format!("loaded:{text}"));
            });

        let shared = LocalRealtime::new();
        let h = harness_with("?fileId=doc", options.clone(), FakeFiles::creating("x"), shared);
        h.loader.start(|| {}).await.expect("first start");
        assert_eq!(
            *calls.lock(),
            vec!["initialize".to_string(), "loaded:Hello Realtime World!".to_string()]
        );

        calls.lock().clear();
        let second = Loader::new(
            "client-id",
            SessionParams::parse("?fileId=doc"),
            options,
            Collaborators {
                auth: Arc::new(FakeAuth::silent_ok()),
                identity: Arc::new(FakeIdentity::with_id("U")),
                auth_control: Arc::new(FakeControl::new(0)),
                realtime: h.realtime.clone(),
                files: Arc::new(FakeFiles::creating("unused")),
                page: Arc::new(FakePage::default()),
            },
        );
        second.start(|| {}).await.expect("second start");
        assert_eq!(*calls.lock(), vec!["loaded:Hello Realtime World!".to_string()]);
    }

    #[test]
    fn default_policy_covers_refresh_client_and_not_found() {
        let refresh = RealtimeError::new(ErrorType::TokenRefreshRequired, "expired", false);
        assert_eq!(default_error_policy(&refresh), ErrorAction::Reauthorize);

        let client = RealtimeError::new(ErrorType::ClientError, "boom", true);
        assert_eq!(
            default_error_policy(&client),
            ErrorAction::AlertAndNavigateHome("An Error happened: boom".to_string())
        );

        let missing = RealtimeError::new(ErrorType::NotFound, "gone", true);
        assert_eq!(
            default_error_policy(&missing),
            ErrorAction::AlertAndNavigateHome(NOT_FOUND_MESSAGE.to_string())
        );
    }

    #[test]
    fn default_policy_leaves_other_types_unhandled() {
        for error_type in [
            ErrorType::ConcurrentCreation,
            ErrorType::Forbidden,
            ErrorType::InvalidCompoundOperation,
            ErrorType::ServerError,
        ] {
            let error = RealtimeError::new(error_type, "x", false);
            assert_eq!(default_error_policy(&error), ErrorAction::Unhandled);
        }
    }

    #[tokio::test]
    async fn not_found_alerts_and_navigates_home() {
        let h = harness_with(
            "?fileId=missing",
            LoaderOptions::default(),
            FakeFiles::creating("x"),
            LocalRealtime::strict(),
        );
        h.loader.start(|| {}).await.expect("start");
        assert_eq!(h.loader.phase(), LoadPhase::Failed);

        assert_eq!(h.loader.drain_errors().await, 1);
        assert_eq!(h.page.alerts(), vec![NOT_FOUND_MESSAGE.to_string()]);
        assert_eq!(h.page.navigations(), vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn token_refresh_reauthorizes() {
        let h = harness("?fileId=X", LoaderOptions::default());
        h.loader.start(|| {}).await.expect("start");
        assert_eq!(h.auth.requests().len(), 1);

        h.realtime.inner.expire_session();
        assert_eq!(h.loader.drain_errors().await, 1);

        assert_eq!(h.auth.requests().len(), 2);
        assert!(h.page.alerts().is_empty());
        assert_eq!(h.loader.phase(), LoadPhase::Ready);
    }

    #[tokio::test]
    async fn unhandled_errors_take_no_action() {
        let h = harness("?fileId=X", LoaderOptions::default());
        h.loader.start(|| {}).await.expect("start");

        h.realtime.inner.report_error(
            "X",
            RealtimeError::new(ErrorType::ServerError, "try later", false),
        );
        assert_eq!(h.loader.drain_errors().await, 1);
        assert!(h.page.alerts().is_empty());
        assert!(h.page.navigations().is_empty());
        assert_eq!(h.auth.requests().len(), 1);
    }

    #[tokio::test]
    async fn custom_policy_replaces_the_default() {
        let options = LoaderOptions::default().handle_errors(|error| match error.error_type {
            ErrorType::ServerError => ErrorAction::AlertAndNavigateHome("Server trouble".to_string()),
            _ => ErrorAction::Ignore,
        });
        let h = harness("?fileId=X", options);
        h.loader.start(|| {}).await.expect("start");

        h.realtime.inner.report_error(
            "X",
            RealtimeError::new(ErrorType::ServerError, "down", false),
        );
        h.realtime.inner.expire_session();
        assert_eq!(h.loader.drain_errors().await, 2);

        assert_eq!(h.page.alerts(), vec!["Server trouble".to_string()]);
        assert_eq!(h.auth.requests().len(), 1);
    }

    #[tokio::test]
    async fn fatal_errors_fail_the_phase() {
        let h = harness("?fileId=X", LoaderOptions::default());
        h.loader.start(|| {}).await.expect("start");
        assert_eq!(h.loader.phase(), LoadPhase::Ready);

        h.realtime.inner.report_error(
            "X",
            RealtimeError::new(ErrorType::Forbidden, "revoked", true),
        );
        assert_eq!(h.loader.phase(), LoadPhase::Failed);
    }
}
