//! In-memory session registry.
//!
//! Each session sits behind its own async mutex. Handlers take it with
//! `try_lock`, so a second action on a busy session fails fast instead of
//! queueing behind a long upload.
//!
//! Sessions idle for longer than [`SessionLimits::idle_ttl`] are swept, and
//! creating a session past [`SessionLimits::max_sessions`] evicts the least
//! recently used idle one. Locked sessions are never evicted.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use contextor::{Credential, Session};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error_handler::AppError;

/// Bounds on how many sessions are kept and for how long.
#[derive(Clone, Copy, Debug)]
pub struct SessionLimits {
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(60 * 60),
            max_sessions: 256,
        }
    }
}

struct Entry {
    session: Arc<Mutex<Session>>,
    last_used: Instant,
}

impl Entry {
    fn is_idle(&self) -> bool {
        self.session.try_lock().is_ok()
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    limits: SessionLimits,
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionRegistry {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            limits,
            sessions: RwLock::default(),
        }
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    /// Registers a new session and returns its id.
    pub async fn create(&self, credential: Option<Credential>) -> Uuid {
        let now = Instant::now();
        let mut map = self.sessions.write().await;
        expire_idle(&mut map, now, self.limits.idle_ttl);

        while map.len() >= self.limits.max_sessions.max(1) {
            let oldest = map
                .iter()
                .filter(|(_, e)| e.is_idle())
                .min_by_key(|(_, e)| e.last_used)
                .map(|(id, _)| *id);
            let Some(oldest) = oldest else { break };
            map.remove(&oldest);
            debug!(session = %oldest, "session evicted at capacity");
        }

        let id = Uuid::new_v4();
        map.insert(
            id,
            Entry {
                session: Arc::new(Mutex::new(Session::new(credential))),
                last_used: now,
            },
        );
        debug!(session = %id, total = map.len(), "session created");
        id
    }

    /// Locks the session for one action and marks it as used.
    ///
    /// # Errors
    /// `SessionNotFound` for unknown ids, `SessionBusy` while another action
    /// holds the lock.
    pub async fn acquire(&self, id: Uuid) -> Result<OwnedMutexGuard<Session>, AppError> {
        let session = {
            let mut map = self.sessions.write().await;
            let entry = map.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
            entry.last_used = Instant::now();
            entry.session.clone()
        };
        session
            .try_lock_owned()
            .map_err(|_| AppError::SessionBusy(id))
    }

    /// Forgets a session; returns `false` if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        debug!(session = %id, removed, "session removed");
        removed
    }

    /// Drops sessions idle since before `now - idle_ttl`; returns how many.
    pub async fn sweep(&self, now: Instant) -> usize {
        let mut map = self.sessions.write().await;
        let swept = expire_idle(&mut map, now, self.limits.idle_ttl);
        if swept > 0 {
            info!(swept, remaining = map.len(), "idle sessions expired");
        }
        swept
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn expire_idle(map: &mut HashMap<Uuid, Entry>, now: Instant, ttl: Duration) -> usize {
    let before = map.len();
    map.retain(|_, e| now.saturating_duration_since(e.last_used) <= ttl || !e.is_idle());
    before - map.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_action_is_busy() {
        let reg = SessionRegistry::default();
        let id = reg.create(None).await;

        let guard = reg.acquire(id).await.unwrap();
        assert!(matches!(reg.acquire(id).await, Err(AppError::SessionBusy(_))));
        drop(guard);
        assert!(reg.acquire(id).await.is_ok());
    }

    #[tokio::test]
    async fn removed_sessions_are_unknown() {
        let reg = SessionRegistry::default();
        let id = reg.create(Credential::new("sk-x")).await;
        assert_eq!(reg.len().await, 1);

        assert!(reg.remove(id).await);
        assert!(!reg.remove(id).await);
        assert!(matches!(
            reg.acquire(id).await,
            Err(AppError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn idle_sessions_expire_but_busy_ones_stay() {
        let reg = SessionRegistry::new(SessionLimits {
            idle_ttl: Duration::from_secs(60),
            max_sessions: 16,
        });
        let idle = reg.create(None).await;
        let busy = reg.create(None).await;
        let _held = reg.acquire(busy).await.unwrap();

        assert_eq!(reg.sweep(Instant::now()).await, 0);
        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(reg.sweep(later).await, 1);

        assert!(matches!(
            reg.acquire(idle).await,
            Err(AppError::SessionNotFound(_))
        ));
        assert!(matches!(reg.acquire(busy).await, Err(AppError::SessionBusy(_))));
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let reg = SessionRegistry::new(SessionLimits {
            idle_ttl: Duration::from_secs(3600),
            max_sessions: 2,
        });
        let first = reg.create(None).await;
        let second = reg.create(None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        drop(reg.acquire(first).await.unwrap());

        let third = reg.create(None).await;

        assert_eq!(reg.len().await, 2);
        assert!(matches!(
            reg.acquire(second).await,
            Err(AppError::SessionNotFound(_))
        ));
        assert!(reg.acquire(first).await.is_ok());
        assert!(reg.acquire(third).await.is_ok());
    }
}
