use std::collections::VecDeque;

use toastline_bridge::toast::ToastRequest;

/// Pending toast requests in arrival order.
#[derive(Debug, Default)]
pub(crate) struct ToastQueue {
    pending: VecDeque<ToastRequest>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request to the tail.
    pub fn insert(&mut self, request: ToastRequest) {
        self.pending.push_back(request);
    }

    /// Removes and returns the oldest request.
    pub fn pop_first(&mut self) -> Option<ToastRequest> {
        self.pending.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
