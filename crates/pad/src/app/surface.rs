use super::types::PageEvent;
use crate::page::{AuthControl, PageHost};
use crate::params::HistoryEntry;
use async_trait::async_trait;
use realtime_pad_drive::databinding::{bind_string, TextControl};
use realtime_pad_drive::realtime::Document;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

pub const TEXT_KEY: &str = "text";
pub const INITIAL_TEXT: &str = "Hello Realtime World!";

/// Page capabilities backed by the terminal UI. Everything the loader does
/// to the page becomes a [`PageEvent`] for the UI loop.
pub struct TerminalSurface {
    events: mpsc::UnboundedSender<PageEvent>,
    clicks: Mutex<mpsc::UnboundedReceiver<()>>,
}

/// UI-side ends of a [`TerminalSurface`].
pub struct SurfaceChannels {
    pub events: mpsc::UnboundedReceiver<PageEvent>,
    pub clicks: mpsc::UnboundedSender<()>,
}

impl TerminalSurface {
    pub fn new() -> (Arc<Self>, SurfaceChannels) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (clicks_tx, clicks_rx) = mpsc::unbounded_channel();
        let surface = Arc::new(Self {
            events: events_tx,
            clicks: Mutex::new(clicks_rx),
        });
        (
            surface,
            SurfaceChannels {
                events: events_rx,
                clicks: clicks_tx,
            },
        )
    }

    fn send(&self, event: PageEvent) {
        let _ = self.events.send(event);
    }

    pub fn text_field(&self) -> Arc<dyn TextControl> {
        Arc::new(TextField {
            events: self.events.clone(),
        })
    }

    /// Binds the document's `text` string to the editor and enables it.
    pub fn bind_document(&self, document: &Document) {
        let root = document.get_model().get_root();
        let string = match root.get_string(TEXT_KEY) {
            Some(string) => string,
            None => {
                tracing::warn!(file_id = document.id(), "Document has no text entry, adding one");
                let string = document.get_model().create_string("");
                root.set(TEXT_KEY, string.clone());
                string
            }
        };

        let binding = bind_string(string, self.text_field());
        self.send(PageEvent::DocumentBound {
            file_id: document.id().to_string(),
            binding,
        });
    }
}

#[async_trait]
impl AuthControl for TerminalSurface {
    fn set_enabled(&self, enabled: bool) {
        self.send(PageEvent::AuthButton { enabled });
    }

    async fn wait_for_click(&self) {
        let mut clicks = self.clicks.lock().await;
        while clicks.try_recv().is_ok() {}
        self.send(PageEvent::AuthArmed);
        if clicks.recv().await.is_none() {
            // UI is gone; nobody can click any more.
            std::future::pending::<()>().await;
        }
    }
}

impl PageHost for TerminalSurface {
    fn push_history(&self, entry: &HistoryEntry) {
        self.send(PageEvent::HistoryPushed(entry.clone()));
    }

    fn alert(&self, message: &str) {
        self.send(PageEvent::Alert(message.to_string()));
    }

    fn navigate(&self, href: &str) {
        self.send(PageEvent::Navigated(href.to_string()));
    }
}

struct TextField {
    events: mpsc::UnboundedSender<PageEvent>,
}

impl TextControl for TextField {
    fn set_value(&self, value: &str) {
        let _ = self.events.send(PageEvent::TextChanged(value.to_string()));
    }
}
