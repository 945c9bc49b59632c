use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::oneshot;

use crate::{Blocker, BlockerType};

/// Set of blockers currently held by the SDK's features.
///
/// Pending waiters are stored next to the active set and checked inside every
/// mutation, under the same lock. A waiter whose types are all gone is
/// released by that mutation even if a later call adds a matching blocker
/// before the waiting task gets to run.
#[derive(Debug, Default)]
pub struct BlockerRegistry {
    state: Mutex<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    active: Vec<Blocker>,
    waiters: Vec<Waiter>,
}

#[derive(Debug)]
struct Waiter {
    types: Vec<BlockerType>,
    release: oneshot::Sender<()>,
}

impl RegistryState {
    fn blocks_any(&self, types: &[BlockerType]) -> bool {
        self.active
            .iter()
            .any(|blocker| types.contains(&blocker.blocker_type))
    }

    /// Releases every waiter whose condition holds now. Waiters whose future
    /// was dropped are discarded on the way.
    fn release_waiters(&mut self) {
        let waiters = std::mem::take(&mut self.waiters);
        for waiter in waiters {
            if waiter.release.is_closed() {
                continue;
            }
            if self.blocks_any(&waiter.types) {
                self.waiters.push(waiter);
            } else {
                // The receiver resolves on its own poll, never from here.
                let _ = waiter.release.send(());
            }
        }
    }
}

impl BlockerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a blocker. Blockers of the same type may coexist.
    pub fn add(&self, blocker: Blocker) {
        log::debug!("Adding {:?} {}", blocker.blocker_type(), blocker.id());
        let mut state = self.lock();
        state.active.push(blocker);
        state.release_waiters();
    }

    /// Inserts `blocker` only if no blocker of the same type is active.
    ///
    /// The check and the insertion happen under one lock, so two features
    /// racing for the same type cannot both succeed.
    pub fn try_add_exclusive(&self, blocker: Blocker) -> bool {
        let blocker_type = blocker.blocker_type();
        let id = blocker.id();
        let mut state = self.lock();
        if state.blocks_any(&[blocker_type]) {
            return false;
        }
        state.active.push(blocker);
        state.release_waiters();
        log::debug!("Acquired exclusive {blocker_type:?} {id}");
        true
    }

    /// Removes exactly this blocker. Removing an absent blocker is a no-op.
    pub fn remove(&self, blocker: &Blocker) {
        let id = blocker.id();
        let mut state = self.lock();
        let before = state.active.len();
        state.active.retain(|held| held.id != id);
        if state.active.len() != before {
            log::debug!("Removed {:?} {id}", blocker.blocker_type());
            state.release_waiters();
        }
    }

    /// Removes every blocker of the given type.
    pub fn remove_blocker(&self, blocker_type: BlockerType) {
        let mut state = self.lock();
        state.active.retain(|held| held.blocker_type != blocker_type);
        state.release_waiters();
    }

    /// Drops every active blocker, whatever its type. Used when the SDK is
    /// reset and no feature can be trusted to release its own.
    pub fn invalidate_all_blockers(&self) {
        log::info!("Invalidating all blockers");
        let mut state = self.lock();
        state.active.clear();
        state.release_waiters();
    }

    /// Whether a blocker of any of `types` is active right now.
    pub fn is_blocked(&self, types: &[BlockerType]) -> bool {
        self.lock().blocks_any(types)
    }

    /// Snapshot of the active blockers, in insertion order.
    pub fn active_blockers(&self) -> Vec<Blocker> {
        self.lock().active.clone()
    }

    /// Resolves once no blocker of any of `types` is active.
    ///
    /// The condition is checked when this is called, not when the future is
    /// first polled. If it already holds the future is ready right away.
    /// Otherwise it completes after the first mutation that leaves the set
    /// without such a blocker, even if the set changes again before the
    /// future is polled. All pending waiters are released by the same
    /// mutation. There is no timeout.
    pub fn wait_for_non_blocker(
        &self,
        types: &[BlockerType],
    ) -> impl Future<Output = ()> + Send + use<> {
        let mut state = self.lock();
        let pending = if state.blocks_any(types) {
            state.waiters.retain(|waiter| !waiter.release.is_closed());
            let (release, released) = oneshot::channel();
            state.waiters.push(Waiter {
                types: types.to_vec(),
                release,
            });
            Some(released)
        } else {
            None
        };
        async move {
            if let Some(released) = pending {
                // A dropped registry takes its blockers with it.
                let _ = released.await;
            }
        }
    }

    #[cfg(test)]
    fn pending_waiters(&self) -> usize {
        self.lock().waiters.len()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // No user code runs under the lock, so poisoning can only come from a
        // panic inside the registry itself.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
