use crate::authorizer::AuthState;
use crate::input::InputState;
use crate::keybinds::Keybinds;
use crate::loader::{LoadPhase, Loader, LoaderOptions};
use crate::params::{HistoryEntry, SessionParams};
use crate::ui::layout::LayoutState;
use crate::ui::panel::PanelType;
use crate::Config;
use anyhow::Result;
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::Frame;
use realtime_pad_drive::api::DriveApi;
use realtime_pad_drive::databinding::Binding;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

mod effects;
mod input;
mod render;
mod state;
mod surface;
mod types;

pub use state::App;
pub use surface::{SurfaceChannels, TerminalSurface, INITIAL_TEXT, TEXT_KEY};
pub use types::{AppAsyncEvent, PageEvent};

/// Loader options for the pad page: seed a greeting on first creation and
/// bind the `text` string to the editor once the document is ready.
pub fn page_options(config: &Config, surface: &Arc<TerminalSurface>) -> LoaderOptions {
    let surface = surface.clone();
    LoaderOptions::default()
        .auto_create(config.loader.auto_create)
        .default_title(config.loader.default_title.clone())
        .initialize_model(|model| {
            let string = model.create_string(INITIAL_TEXT);
            model.get_root().set(TEXT_KEY, string);
        })
        .on_file_loaded(move |document| surface.bind_document(document))
}

impl App {
    pub(super) fn report_error(&mut self, context: &str, error: impl std::fmt::Display) {
        let message = format!("{context}: {}", Self::redact_sensitive(&error.to_string()));
        self.last_error = Some(message.clone());
        tracing::warn!("{message}");
    }

    pub(super) fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn redact_sensitive(input: &str) -> String {
        input
            .replace("ya29.", "ya29.[REDACTED]")
            .replace("Bearer ", "Bearer [REDACTED]")
    }

    pub(super) fn spawn_app_task<F>(&self, future: F)
    where
        F: Future<Output = AppAsyncEvent> + Send + 'static,
    {
        let tx = self.app_async_tx.clone();
        tokio::spawn(async move {
            let event = future.await;
            let _ = tx.send(event);
        });
    }
}
