use std::collections::HashMap;

use toastline_bridge::toast::{ActionCallback, ToastId};

/// Action completions of pending and active toasts.
///
/// Every accepted toast has an entry, with or without a callback, until its
/// lifecycle ends. Removing the entry is what releases the caller's closure.
#[derive(Debug, Default)]
pub(crate) struct ActionCallbacks {
    entries: HashMap<ToastId, Option<ActionCallback>>,
}

impl ActionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ToastId, callback: Option<ActionCallback>) {
        self.entries.insert(id, callback);
    }

    /// Removes the entry for `id` and runs its callback, if any. Returns
    /// whether a callback ran.
    pub fn invoke(&mut self, id: ToastId) -> bool {
        match self.entries.remove(&id) {
            Some(Some(callback)) => {
                log::debug!("Invoking action callback of {id}");
                callback.invoke();
                true
            }
            _ => false,
        }
    }

    /// Drops the entry for `id`, whether or not its callback ran.
    pub fn clear(&mut self, id: ToastId) {
        self.entries.remove(&id);
    }

    pub fn has_callback(&self, id: ToastId) -> bool {
        matches!(self.entries.get(&id), Some(Some(_)))
    }

    pub fn contains(&self, id: ToastId) -> bool {
        self.entries.contains_key(&id)
    }
}
