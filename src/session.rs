//! Per-participant quiz session store

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::observability::update_active_sessions;
use crate::quiz::QuizSession;

/// Identifies one participant in one chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub user_id: i64,
    pub chat_id: i64,
}

impl SessionKey {
    pub fn new(user_id: i64, chat_id: i64) -> Self {
        Self { user_id, chat_id }
    }
}

/// Quiz sessions shared by all handlers
#[derive(Debug)]
pub struct QuizSessions {
    sessions: Mutex<HashMap<SessionKey, QuizSession>>,
    max_attempts: u32,
}

impl QuizSessions {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_attempts,
        }
    }

    /// Run `f` against the session for `key`, creating it on first use
    pub fn with_session<R>(&self, key: SessionKey, f: impl FnOnce(&mut QuizSession) -> R) -> R {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .entry(key)
            .or_insert_with(|| QuizSession::new(self.max_attempts));
        f(session)
    }

    /// Run `f` against an existing session only
    pub fn with_existing<R>(
        &self,
        key: SessionKey,
        f: impl FnOnce(&mut QuizSession) -> R,
    ) -> Option<R> {
        self.sessions.lock().get_mut(&key).map(f)
    }

    pub fn remove(&self, key: SessionKey) -> Option<QuizSession> {
        self.sessions.lock().remove(&key)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions with no activity for longer than `max_idle`
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, session| session.last_activity().elapsed() <= max_idle);
        before - sessions.len()
    }
}

/// Periodically evict idle sessions and publish the live count
pub fn spawn_session_reaper(
    sessions: Arc<QuizSessions>,
    max_idle: Duration,
) -> tokio::task::JoinHandle<()> {
    let period = (max_idle / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let evicted = sessions.evict_idle(max_idle);
            if evicted > 0 {
                info!(evicted, "Evicted idle quiz sessions");
            } else {
                debug!("No idle quiz sessions to evict");
            }
            update_active_sessions(sessions.len());
        }
    })
}
