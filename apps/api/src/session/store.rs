//! Process-wide session registry with explicit lifecycle: create on first
//! request, touch on every pass, remove on teardown or idle expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::models::Session;

/// A session handle. The mutex serializes render passes within one session.
pub type SharedSession = Arc<Mutex<Session>>;

struct Entry {
    session: SharedSession,
    last_seen: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Opens a fresh, empty session.
    pub async fn create(&self) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new(id)));
        self.inner.write().await.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: Utc::now(),
            },
        );
        info!(session_id = %id, "Session created");
        (id, session)
    }

    /// Looks up a live session and marks it as recently used.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.inner.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Utc::now();
        Some(entry.session.clone())
    }

    /// Tears a session down. Returns false if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.inner.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Session removed");
        }
        removed
    }

    /// Drops every session idle for longer than the TTL as of `now`.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        let ttl = self.ttl;
        // A negative idle time (clock skew) never expires a session.
        sessions.retain(|_, entry| {
            now.signed_duration_since(entry.last_seen)
                .to_std()
                .map_or(true, |idle| idle <= ttl)
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Runs `sweep_expired` on a fixed interval for the life of the process.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let expired = store.sweep_expired(Utc::now()).await;
                if expired > 0 {
                    info!("Expired {expired} idle session(s)");
                } else {
                    debug!("Session sweep found nothing to expire");
                }
            }
        })
    }
}
