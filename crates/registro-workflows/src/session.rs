//! Per-browser session state.
//!
//! A session is a small JSON map keyed by [`SessionId`]. Two things live in
//! it: the [`PendingSelection`] of the survey workflow and queued
//! [`FlashMessage`]s.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use registro_core::{Error, InstitutionId, Result, SessionId};

// ============================================================================
// Session store
// ============================================================================

/// Key/value storage scoped to one browser session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Reads `key`, if set.
    async fn get(&self, session: SessionId, key: &str) -> Result<Option<Value>>;

    /// Writes `key`, replacing any previous value.
    async fn set(&self, session: SessionId, key: &str, value: Value) -> Result<()>;

    /// Removes `key` and returns what it held.
    async fn remove(&self, session: SessionId, key: &str) -> Result<Option<Value>>;
}

/// How long an untouched session is kept: two weeks.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);

#[derive(Debug)]
struct SessionData {
    values: serde_json::Map<String, Value>,
    touched: Instant,
}

impl SessionData {
    fn is_idle(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.touched) > ttl
    }
}

/// Process-local session store.
///
/// A session expires once it has gone `ttl` without a write. Expired
/// sessions read as empty and are dropped on the next write to the store.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionData>>,
    ttl: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl MemorySessionStore {
    /// Creates an empty store with the default idle timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store whose sessions expire after `ttl` idle.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Idle timeout.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of sessions holding at least one key, expired ones included
    /// until they are purged.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// True when no session holds any key.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every expired session and returns how many went.
    pub fn purge_expired(&self) -> Result<usize> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        Ok(purge(&mut sessions, self.ttl, Instant::now()))
    }
}

fn purge(sessions: &mut HashMap<SessionId, SessionData>, ttl: Duration, now: Instant) -> usize {
    let before = sessions.len();
    sessions.retain(|_, data| !data.is_idle(ttl, now));
    let purged = before - sessions.len();
    if purged > 0 {
        tracing::debug!(purged, remaining = sessions.len(), "Expired sessions dropped");
    }
    purged
}

fn poisoned() -> Error {
    Error::store("session store lock poisoned")
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session: SessionId, key: &str) -> Result<Option<Value>> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        Ok(sessions
            .get(&session)
            .filter(|data| !data.is_idle(self.ttl, Instant::now()))
            .and_then(|data| data.values.get(key))
            .cloned())
    }

    async fn set(&self, session: SessionId, key: &str, value: Value) -> Result<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        purge(&mut sessions, self.ttl, now);
        let data = sessions.entry(session).or_insert_with(|| SessionData {
            values: serde_json::Map::new(),
            touched: now,
        });
        data.values.insert(key.to_string(), value);
        data.touched = now;
        Ok(())
    }

    async fn remove(&self, session: SessionId, key: &str) -> Result<Option<Value>> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        purge(&mut sessions, self.ttl, now);
        let Some(data) = sessions.get_mut(&session) else {
            return Ok(None);
        };
        let removed = data.values.remove(key);
        data.touched = now;
        if data.values.is_empty() {
            sessions.remove(&session);
        }
        Ok(removed)
    }
}

// ============================================================================
// Pending institution selection
// ============================================================================

/// The institution a session has selected for its next survey.
pub struct PendingSelection;

impl PendingSelection {
    /// Session key holding the selected institution id.
    pub const KEY: &'static str = "institucion_id";

    /// The selected institution, if any.
    ///
    /// A value that is not an id is treated as no selection.
    pub async fn load(
        sessions: &dyn SessionStore,
        session: SessionId,
    ) -> Result<Option<InstitutionId>> {
        let id = match sessions.get(session, Self::KEY).await? {
            None => None,
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.parse::<i64>().ok(),
            Some(other) => {
                tracing::warn!(%session, value = %other, "Ignoring malformed pending selection");
                None
            }
        };
        Ok(id.map(InstitutionId::new))
    }

    /// Records the selection, replacing any earlier one.
    pub async fn save(
        sessions: &dyn SessionStore,
        session: SessionId,
        institution: InstitutionId,
    ) -> Result<()> {
        sessions
            .set(session, Self::KEY, Value::from(institution.get()))
            .await
    }

    /// Forgets the selection.
    pub async fn clear(sessions: &dyn SessionStore, session: SessionId) -> Result<()> {
        sessions.remove(session, Self::KEY).await?;
        Ok(())
    }
}

// ============================================================================
// Flash messages
// ============================================================================

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Something was saved
    Success,
    /// Neutral notice
    Info,
    /// The request could not proceed as asked
    Warning,
    /// The request failed
    Error,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Severity
    pub level: Level,
    /// User-visible text
    pub message: String,
}

/// Queue of flash messages kept in the session.
pub struct Flash;

impl Flash {
    /// Session key holding the queue.
    pub const KEY: &'static str = "_messages";

    /// Appends a message to the queue.
    pub async fn push(
        sessions: &dyn SessionStore,
        session: SessionId,
        level: Level,
        message: impl Into<String>,
    ) -> Result<()> {
        let mut queue = Self::peek(sessions, session).await?;
        queue.push(FlashMessage {
            level,
            message: message.into(),
        });
        sessions
            .set(session, Self::KEY, serde_json::to_value(queue)?)
            .await
    }

    /// Queues a success message.
    pub async fn success(
        sessions: &dyn SessionStore,
        session: SessionId,
        message: impl Into<String>,
    ) -> Result<()> {
        Self::push(sessions, session, Level::Success, message).await
    }

    /// Queues a warning.
    pub async fn warning(
        sessions: &dyn SessionStore,
        session: SessionId,
        message: impl Into<String>,
    ) -> Result<()> {
        Self::push(sessions, session, Level::Warning, message).await
    }

    /// Queues an error message.
    pub async fn error(
        sessions: &dyn SessionStore,
        session: SessionId,
        message: impl Into<String>,
    ) -> Result<()> {
        Self::push(sessions, session, Level::Error, message).await
    }

    /// The queued messages, left in place.
    pub async fn peek(sessions: &dyn SessionStore, session: SessionId) -> Result<Vec<FlashMessage>> {
        match sessions.get(session, Self::KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Removes and returns every queued message.
    pub async fn drain(
        sessions: &dyn SessionStore,
        session: SessionId,
    ) -> Result<Vec<FlashMessage>> {
        match sessions.remove(session, Self::KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }
}
