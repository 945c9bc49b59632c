//! Mutual exclusion between features that need the user's full attention.
//!
//! Independent parts of the SDK (toasts, authentication flows, ...) must
//! never compete for the screen. Each of them registers a [`Blocker`] while it
//! is on screen and waits for the blockers of the relevant types to go away
//! before showing anything. The [`registry::BlockerRegistry`] is the shared
//! arbiter:
//! - Adding and removing blockers is synchronous and never fails.
//! - Waiting is asynchronous and has no timeout; a blocker that is never
//!   removed stalls its waiters.
//!
//! The registry is meant to be created once by the host and injected into
//! every consumer, usually behind an [`std::sync::Arc`].

pub mod registry;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use crate::registry::BlockerRegistry;

/// Kind of exclusive-UI feature a blocker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockerType {
    /// A toast banner, including its exit animation.
    Toast,
    /// An interactive authentication flow presented by the host.
    Authentication,
    /// A silent single-sign-on renewal.
    RenewAuthentication,
}

/// Identity of a single blocker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockerId(u64);

impl BlockerId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BlockerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blocker#{}", self.0)
    }
}

/// Token stating that a feature currently needs exclusive UI attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocker {
    id: BlockerId,
    blocker_type: BlockerType,
}

impl Blocker {
    /// Creates a blocker with a fresh identity.
    pub fn new(blocker_type: BlockerType) -> Self {
        Self {
            id: BlockerId::next(),
            blocker_type,
        }
    }

    pub fn id(&self) -> BlockerId {
        self.id
    }

    pub fn blocker_type(&self) -> BlockerType {
        self.blocker_type
    }
}
