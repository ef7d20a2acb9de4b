use crate::params::HistoryEntry;
use realtime_pad_drive::databinding::Binding;

/// Things the orchestration does to the page, delivered to the UI loop.
pub enum PageEvent {
    AuthButton { enabled: bool },
    AuthArmed,
    HistoryPushed(HistoryEntry),
    Alert(String),
    Navigated(String),
    TextChanged(String),
    DocumentBound { file_id: String, binding: Binding },
}

pub enum AppAsyncEvent {
    ShareFinished {
        email: String,
        error: Option<String>,
    },
}
