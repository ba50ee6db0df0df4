//! In-memory conversation history, keyed by session id.

use crate::error::{Result, SyllabusError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// One question and the answer given to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
}

/// Bounded per-session history. Oldest exchanges are evicted first.
pub struct SessionStore {
    max_history: usize,
    sessions: Mutex<HashMap<String, VecDeque<Exchange>>>,
}

impl SessionStore {
    /// Keep at most `max_history` exchanges per session.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, VecDeque<Exchange>>>> {
        self.sessions
            .lock()
            .map_err(|e| SyllabusError::Session(format!("Failed to acquire lock: {}", e)))
    }

    /// Start a new, empty session and return its id.
    pub fn create(&self) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.lock()?.insert(id.clone(), VecDeque::new());
        debug!("Created session {}", id);
        Ok(id)
    }

    /// Record an exchange, creating the session if it does not exist yet.
    pub fn append(&self, session_id: &str, user: &str, assistant: &str) -> Result<()> {
        let mut sessions = self.lock()?;
        let history = sessions.entry(session_id.to_string()).or_default();

        history.push_back(Exchange {
            user: user.to_string(),
            assistant: assistant.to_string(),
        });
        while history.len() > self.max_history {
            history.pop_front();
        }
        Ok(())
    }

    /// Render a session's history, oldest first. `None` when the session is
    /// unknown or has no exchanges.
    pub fn history(&self, session_id: &str) -> Result<Option<String>> {
        let sessions = self.lock()?;
        let Some(history) = sessions.get(session_id).filter(|h| !h.is_empty()) else {
            return Ok(None);
        };

        let rendered = history
            .iter()
            .map(|e| format!("User: {}\nAssistant: {}", e.user, e.assistant))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(Some(rendered))
    }

    /// Forget a session. Returns whether it existed.
    pub fn clear(&self, session_id: &str) -> Result<bool> {
        Ok(self.lock()?.remove(session_id).is_some())
    }

    pub fn exchange_count(&self, session_id: &str) -> Result<usize> {
        Ok(self.lock()?.get(session_id).map_or(0, VecDeque::len))
    }
}
