use crate::realtime::CollaborativeString;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A single-line or multi-line text input that can display a value.
pub trait TextControl: Send + Sync {
    fn set_value(&self, value: &str);
}

/// Live two-way link between a collaborative string and a text control.
/// Dropping the binding stops forwarding service-side changes.
pub struct Binding {
    string: CollaborativeString,
    forwarder: JoinHandle<()>,
}

impl Binding {
    pub fn collaborative_string(&self) -> &CollaborativeString {
        &self.string
    }

    /// Applies a value typed into the control.
    pub fn input(&self, value: &str) {
        self.string.set_text(value);
    }

    pub fn unbind(self) {}
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// Shows the current text in `control` and keeps it in sync with later
/// changes. Must be called from within a tokio runtime.
pub fn bind_string(string: CollaborativeString, control: Arc<dyn TextControl>) -> Binding {
    let mut changes = string.subscribe();
    control.set_value(&string.text());

    let forwarder = tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let value = changes.borrow_and_update().clone();
            control.set_value(&value);
        }
    });

    Binding { string, forwarder }
}
