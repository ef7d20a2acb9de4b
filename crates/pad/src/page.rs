//! What the orchestration needs from the surface it runs in.

use crate::params::HistoryEntry;
use async_trait::async_trait;

/// The "authorize" button.
#[async_trait]
pub trait AuthControl: Send + Sync {
    fn set_enabled(&self, enabled: bool);

    /// Resolves on the next activation of the control. Awaiting this is
    /// what arms the interactive authorization path.
    async fn wait_for_click(&self);
}

pub trait PageHost: Send + Sync {
    fn push_history(&self, entry: &HistoryEntry);
    fn alert(&self, message: &str);
    fn navigate(&self, href: &str);
}
