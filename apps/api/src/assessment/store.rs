//! Session context storage.
//!
//! `AppState` holds an `Arc<dyn SessionStore>`, chosen at startup: Redis when
//! `REDIS_URL` is set, otherwise process memory.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::assessment::session::SessionContext;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt session payload: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<SessionContext>, StoreError>;

    async fn save(&self, ctx: &SessionContext) -> Result<(), StoreError>;

    /// Returns whether a session was removed.
    async fn remove(&self, session_id: &str) -> Result<bool, StoreError>;

    /// Loads the session, creating (and saving) a fresh one on first sight.
    async fn load_or_create(&self, session_id: &str) -> Result<SessionContext, StoreError> {
        if let Some(ctx) = self.load(session_id).await? {
            return Ok(ctx);
        }
        let ctx = SessionContext::new(session_id);
        self.save(&ctx).await?;
        Ok(ctx)
    }
}

/// Process-local store. Like the Redis store, an entry expires `ttl` after
/// its last save; expired entries are pruned on every save.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, (SessionContext, Instant)>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    fn is_live(&self, saved_at: Instant) -> bool {
        saved_at.elapsed() < self.ttl
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionContext>, StoreError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .filter(|(_, saved_at)| self.is_live(*saved_at))
            .map(|(ctx, _)| ctx.clone()))
    }

    async fn save(&self, ctx: &SessionContext) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, (_, saved_at)| self.is_live(*saved_at));
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!("Pruned {pruned} expired in-memory sessions");
        }
        sessions.insert(ctx.session_id.clone(), (ctx.clone(), Instant::now()));
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .sessions
            .write()
            .await
            .remove(session_id)
            .is_some_and(|(_, saved_at)| self.is_live(saved_at)))
    }
}

/// Stores each context as JSON under `assessment:session:{id}` with a TTL
/// that is refreshed on every save.
pub struct RedisSessionStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    fn key(session_id: &str) -> String {
        format!("assessment:session:{session_id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionContext>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(Self::key(session_id))
            .query_async(&mut conn)
            .await?;
        raw.map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn save(&self, ctx: &SessionContext) -> Result<(), StoreError> {
        let payload = serde_json::to_string(ctx)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(Self::key(&ctx.session_id))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<bool, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let removed: i64 = redis::cmd("DEL")
            .arg(Self::key(session_id))
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }
}
