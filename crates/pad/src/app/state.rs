use super::*;

pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub loader: Arc<Loader>,
    pub drive_api: Option<DriveApi>,
    pub layout: LayoutState,
    pub keybinds: Keybinds,
    pub location: String,
    pub history: Vec<HistoryEntry>,
    pub auth_enabled: bool,
    pub auth_armed: bool,
    pub consent_url: Option<String>,
    pub editor: InputState,
    pub editor_enabled: bool,
    pub binding: Option<Binding>,
    pub file_id: Option<String>,
    pub alert: Option<String>,
    pub share_prompt: Option<InputState>,
    pub show_help: bool,
    pub status: Option<String>,
    pub last_error: Option<String>,
    pub page_rx: mpsc::UnboundedReceiver<PageEvent>,
    pub clicks_tx: mpsc::UnboundedSender<()>,
    pub prompt_rx: Option<watch::Receiver<Option<String>>>,
    pub phase_rx: watch::Receiver<LoadPhase>,
    pub auth_rx: watch::Receiver<AuthState>,
    pub app_async_tx: mpsc::UnboundedSender<AppAsyncEvent>,
    pub app_async_rx: mpsc::UnboundedReceiver<AppAsyncEvent>,
}

impl App {
    pub fn new(
        config: Config,
        loader: Arc<Loader>,
        channels: SurfaceChannels,
        drive_api: Option<DriveApi>,
        prompt_rx: Option<watch::Receiver<Option<String>>>,
    ) -> Self {
        let (app_async_tx, app_async_rx) = mpsc::unbounded_channel();
        let location = initial_location(loader.params());
        let phase_rx = loader.subscribe_phase();
        let auth_rx = loader.authorizer().subscribe();

        Self {
            should_quit: false,
            config,
            loader,
            drive_api,
            layout: LayoutState::default(),
            keybinds: Keybinds,
            location,
            history: Vec::new(),
            auth_enabled: false,
            auth_armed: false,
            consent_url: None,
            editor: InputState::new(),
            editor_enabled: false,
            binding: None,
            file_id: None,
            alert: None,
            share_prompt: None,
            show_help: false,
            status: None,
            last_error: None,
            page_rx: channels.events,
            clicks_tx: channels.clicks,
            prompt_rx,
            phase_rx,
            auth_rx,
            app_async_tx,
            app_async_rx,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.loader.phase()
    }

    pub fn auth_state(&self) -> AuthState {
        self.loader.authorizer().state()
    }
}

fn initial_location(params: &SessionParams) -> String {
    match (params.file_id(), params.state()) {
        (Some(file_id), _) => HistoryEntry::new(file_id, params.user_id().map(str::to_string)).url(),
        (None, Some(_)) => "?state=…".to_string(),
        (None, None) => "/".to_string(),
    }
}
