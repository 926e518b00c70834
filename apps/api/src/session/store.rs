//! In-memory home for tool sessions. Each session is independent; the map
//! lock is held only for state transitions, never across a provider call.
//!
//! Pages that close without a DELETE leave their session behind, so sessions
//! idle for longer than the TTL are evicted. A Pending session is never
//! evicted; its call finishes within the transport timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::generation::error::GenerationError;
use crate::generation::generator::Generator;
use crate::session::view_model::{SessionSnapshot, Ticket, ToolSession};

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, ToolSession>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn create(&self, task_id: &str) -> Result<SessionSnapshot, GenerationError> {
        let session = ToolSession::new(task_id)?;
        let snapshot = session.snapshot();

        let mut sessions = self.sessions.write().await;
        evict_idle(&mut sessions, self.ttl);
        sessions.insert(session.id(), session);
        drop(sessions);

        info!("Opened session {} for task {}", snapshot.id, snapshot.task_id);
        Ok(snapshot)
    }

    /// Drops every session idle for longer than the TTL. Returns how many went.
    pub async fn evict_expired(&self) -> usize {
        evict_idle(&mut *self.sessions.write().await, self.ttl)
    }

    /// Runs `evict_expired` every `period` until the runtime shuts down.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                store.evict_expired().await;
            }
        })
    }

    pub async fn snapshot(&self, id: Uuid) -> Option<SessionSnapshot> {
        self.sessions.read().await.get(&id).map(ToolSession::snapshot)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Runs `f` against one session under the write lock.
    pub async fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut ToolSession) -> R,
    ) -> Option<R> {
        self.sessions.write().await.get_mut(&id).map(f)
    }

    /// Calls the facade for `ticket` and applies the outcome to the session.
    ///
    /// Returns false when the outcome was dropped: the session moved on
    /// (reset or resubmitted) or was closed while the call was in flight.
    pub async fn run(&self, generator: &Generator, session_id: Uuid, ticket: Ticket) -> bool {
        let outcome = generator.generate(ticket.task_id, &ticket.params).await;

        if let Err(err) = &outcome {
            warn!(
                "Session {} request {} failed: kind={:?} error={}",
                session_id,
                ticket.request_id,
                err.kind(),
                err
            );
        }

        let applied = self
            .with_session(session_id, |session| session.complete(&ticket, outcome))
            .await
            .unwrap_or(false);

        if !applied {
            debug!(
                "Dropped outcome of request {} for session {}",
                ticket.request_id, session_id
            );
        }
        applied
    }
}

fn evict_idle(sessions: &mut HashMap<Uuid, ToolSession>, ttl: Duration) -> usize {
    let now = Utc::now();
    let before = sessions.len();
    sessions.retain(|_, session| {
        let idle = (now - session.updated_at()).to_std().unwrap_or_default();
        !session.controls_enabled() || idle < ttl
    });

    let evicted = before - sessions.len();
    if evicted > 0 {
        info!("Evicted {evicted} idle sessions");
    }
    evicted
}
