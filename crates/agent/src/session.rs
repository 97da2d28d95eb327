use std::collections::HashMap;
use std::time::Duration;

use bookstore_core::journey::{JourneyContext, JourneyState};
use bookstore_core::SessionId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Customer,
    Agent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub journey_state: JourneyState,
    pub journey_context: JourneyContext,
    pub transcript: Vec<Turn>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(SessionId::generate())
    }

    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            journey_state: JourneyState::Initial,
            journey_context: JourneyContext::default(),
            transcript: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn record(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.transcript.push(Turn { speaker, text: text.into(), at: Utc::now() });
    }

    /// Time of the latest turn, or creation time for a fresh session.
    pub fn last_active(&self) -> DateTime<Utc> {
        self.transcript.last().map_or(self.created_at, |turn| turn.at)
    }

    fn idle_longer_than(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        (now - self.last_active()).to_std().is_ok_and(|idle| idle >= ttl)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_sessions: usize,
    pub idle_ttl: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self { max_sessions: 10_000, idle_ttl: Duration::from_secs(1800) }
    }
}

/// In-memory sessions. Idle sessions expire after `idle_ttl`; when the store
/// is full the least recently active session makes room for a new one.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    limits: SessionLimits,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionLimits::default())
    }
}

impl SessionStore {
    pub fn new(limits: SessionLimits) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), limits }
    }

    pub async fn create(&self) -> Session {
        let session = Session::new();
        self.insert(session.clone()).await;
        session
    }

    pub async fn get(&self, id: &SessionId) -> Option<Session> {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .get(id)
            .filter(|session| !session.idle_longer_than(self.limits.idle_ttl, now))
            .cloned()
    }

    pub async fn save(&self, session: Session) {
        self.insert(session).await;
    }

    async fn insert(&self, session: Session) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, existing| !existing.idle_longer_than(self.limits.idle_ttl, now));
        let expired = before - sessions.len();

        let mut evicted = 0usize;
        if !sessions.contains_key(&session.id) {
            while sessions.len() >= self.limits.max_sessions.max(1) {
                let oldest = sessions
                    .values()
                    .min_by_key(|existing| existing.last_active())
                    .map(|existing| existing.id.clone());
                match oldest {
                    Some(id) => {
                        sessions.remove(&id);
                        evicted += 1;
                    }
                    None => break,
                }
            }
        }

        if expired + evicted > 0 {
            info!(
                event_name = "agent.session.evicted",
                expired,
                evicted,
                remaining = sessions.len(),
                "sessions evicted"
            );
        }
        sessions.insert(session.id.clone(), session);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use bookstore_core::journey::JourneyState;
    use bookstore_core::SessionId;

    use std::time::Duration;

    use chrono::Utc;

    use super::{Session, SessionLimits, SessionStore, Speaker};

    #[tokio::test]
    async fn store_round_trips_sessions() {
        let store = SessionStore::default();
        let mut session = store.create().await;
        session.record(Speaker::Customer, "hello");
        session.journey_state = JourneyState::AwaitingSelection;
        store.save(session.clone()).await;

        let loaded = store.get(&session.id).await.expect("session exists");
        assert_eq!(loaded.transcript.len(), 1);
        assert_eq!(loaded.journey_state, JourneyState::AwaitingSelection);
        assert_eq!(store.len().await, 1);
        assert!(store.get(&SessionId("missing".to_string())).await.is_none());
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::new(SessionLimits {
            max_sessions: 10,
            idle_ttl: Duration::from_secs(60),
        });
        let mut stale = store.create().await;
        stale.created_at = Utc::now() - chrono::Duration::seconds(120);
        store.save(stale.clone()).await;
        assert!(store.get(&stale.id).await.is_none(), "idle session is no longer served");

        let fresh = store.create().await;
        assert_eq!(store.len().await, 1);
        assert!(store.get(&fresh.id).await.is_some());
    }

    #[tokio::test]
    async fn full_store_evicts_least_recently_active() {
        let store = SessionStore::new(SessionLimits {
            max_sessions: 2,
            idle_ttl: Duration::from_secs(3600),
        });
        let mut oldest = store.create().await;
        oldest.created_at = Utc::now() - chrono::Duration::seconds(30);
        store.save(oldest.clone()).await;
        let mut busy = store.create().await;
        busy.created_at = Utc::now() - chrono::Duration::seconds(60);
        busy.record(Speaker::Customer, "still here");
        store.save(busy.clone()).await;

        let newest = store.create().await;
        assert_eq!(store.len().await, 2);
        assert!(store.get(&oldest.id).await.is_none());
        assert!(store.get(&busy.id).await.is_some(), "a recent turn keeps the session alive");
        assert!(store.get(&newest.id).await.is_some());
    }

    #[tokio::test]
    async fn saving_an_existing_session_never_evicts_others() {
        let store = SessionStore::new(SessionLimits {
            max_sessions: 1,
            idle_ttl: Duration::from_secs(3600),
        });
        let mut session = store.create().await;
        session.record(Speaker::Agent, "hello");
        store.save(session.clone()).await;

        assert_eq!(store.len().await, 1);
        let loaded = store.get(&session.id).await.expect("session kept");
        assert_eq!(loaded.transcript.len(), 1);
    }
}
