use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Lets one backend confirmation per checkout session run at a time. Later
/// callers wait for the running one and then see its result in the store.
#[derive(Default)]
pub(crate) struct ConfirmationLocks {
    sessions: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

/// Held for the length of one confirmation.
pub(crate) struct ConfirmationTurn<'a> {
    locks: &'a ConfirmationLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ConfirmationLocks {
    fn table(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<AsyncMutex<()>>>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) async fn acquire(&self, session_id: Uuid) -> ConfirmationTurn<'_> {
        let lock = self.table().entry(session_id).or_default().clone();
        let guard = lock.lock_owned().await;
        ConfirmationTurn {
            locks: self,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.table().len()
    }
}

impl Drop for ConfirmationTurn<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Entries nobody holds or waits on.
        self.locks.table().retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}
