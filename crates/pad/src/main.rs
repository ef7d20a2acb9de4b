use color_eyre::eyre::{eyre, Result};
use directories::ProjectDirs;
use ratatui::crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyModifiers,
};
use realtime_pad::app::{page_options, App, TerminalSurface};
use realtime_pad::{Collaborators, Config, Loader, SessionParams};
use realtime_pad_drive::api::{DriveApi, FileCreator, IdentityProvider};
use realtime_pad_drive::auth::{AuthProvider, CredentialStore, GoogleAuthProvider, OfflineAuth};
use realtime_pad_drive::realtime::LocalRealtime;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "realtime-pad", "realtime-pad")
}

fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        proj_dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config/default.toml")
    }
}

fn init_logging() -> Result<()> {
    let dir = project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("realtime-pad.log"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("realtime_pad=info,realtime_pad_drive=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    init_logging()?;

    let mut config = Config::load_or_default(&get_config_path());
    config.apply_env();
    let query = std::env::args().nth(1).unwrap_or_default();
    let params = SessionParams::parse(&query);

    let rt = tokio::runtime::Runtime::new()?;
    let _runtime = rt.enter();

    let (surface, channels) = TerminalSurface::new();
    let realtime = Arc::new(LocalRealtime::new());

    let auth: Arc<dyn AuthProvider>;
    let identity: Arc<dyn IdentityProvider>;
    let files: Arc<dyn FileCreator>;
    let mut drive_api = None;
    let mut prompt_rx = None;
    if config.is_offline() {
        tracing::info!("No client_id configured, running offline");
        auth = Arc::new(OfflineAuth);
        identity = Arc::new(OfflineAuth);
        files = realtime.clone();
    } else {
        let store = CredentialStore::open_default().map_err(|e| eyre!("{e}"))?;
        let provider = Arc::new(GoogleAuthProvider::new(
            Some(config.google.client_secret.clone()),
            config.google.redirect_port,
            store,
        ));
        prompt_rx = Some(provider.prompts());
        let api = DriveApi::new();
        auth = provider;
        identity = Arc::new(api.clone());
        files = Arc::new(api.clone());
        drive_api = Some(api);
    }

    let loader = Arc::new(Loader::new(
        &config.google.client_id,
        params,
        page_options(&config, &surface),
        Collaborators {
            auth,
            identity,
            auth_control: surface.clone(),
            realtime,
            files,
            page: surface.clone(),
        },
    ));

    tokio::spawn({
        let loader = loader.clone();
        async move {
            match loader.start(|| tracing::debug!("Authorization complete")).await {
                Ok(outcome) => tracing::info!(?outcome, "Load finished"),
                Err(e) => tracing::error!("Load did not start: {e}"),
            }
        }
    });
    tokio::spawn({
        let loader = loader.clone();
        async move { loader.serve_errors().await }
    });

    let mut app = App::new(config, loader, channels, drive_api, prompt_rx);

    let mut terminal = ratatui::init();
    ratatui::crossterm::execute!(io::stdout(), EnableBracketedPaste)?;

    let result = run(&mut terminal, &mut app);

    let _ = ratatui::crossterm::execute!(io::stdout(), DisableBracketedPaste);
    ratatui::restore();

    result
}

fn run(terminal: &mut ratatui::DefaultTerminal, app: &mut App) -> Result<()> {
    loop {
        app.process_page_events();
        app.process_async_events();

        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;

            if let Event::Key(key) = &event {
                if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }
            }

            match app.handle_event(event) {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => tracing::warn!("Event handling failed: {e}"),
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
