//! Session tokens for request handlers.
//!
//! Handlers receive a [`SessionRepository`] and resolve the bearer token on
//! every request. Only a SHA-256 of each token is kept, and a session
//! stores its user's id rather than a copy of the account.

use async_trait::async_trait;
use certdeck_core::User;
use chrono::{DateTime, Duration, Utc};
use ring::digest::{digest, SHA256};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AccessError, Result};
use crate::users::UserDirectory;

/// Random bytes per token before hex encoding.
pub const TOKEN_BYTES: usize = 32;

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

/// A live login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A newly created session and the only copy of its plaintext token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: Session,
}

/// Storage for sessions, injected into request handlers.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Open a session for an active user.
    async fn create(&self, user: &User, now: DateTime<Utc>) -> Result<IssuedSession>;

    /// Resolve a token to the current state of the user it was issued for.
    ///
    /// Fails with `InactiveUser` once the account is deactivated, and with
    /// `SessionExpired` once it is gone.
    async fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<User>;

    /// Drop a session. Returns false if the token was unknown.
    async fn revoke(&self, token: &str) -> Result<bool>;

    /// Drop every session of a user. Returns how many were dropped.
    async fn revoke_user(&self, user_id: Uuid) -> Result<usize>;
}

/// Process-local [`SessionRepository`].
pub struct InMemorySessionRepository {
    ttl: Duration,
    rng: SystemRandom,
    users: Arc<dyn UserDirectory>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl std::fmt::Debug for InMemorySessionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionRepository")
            .field("ttl", &self.ttl)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl InMemorySessionRepository {
    #[must_use]
    pub fn new(users: Arc<dyn UserDirectory>, ttl: Duration) -> Self {
        Self {
            ttl,
            rng: SystemRandom::new(),
            users,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Sessions lasting [`DEFAULT_SESSION_TTL_HOURS`].
    #[must_use]
    pub fn with_default_ttl(users: Arc<dyn UserDirectory>) -> Self {
        Self::new(users, Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }

    fn generate_token(&self) -> Result<String> {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AccessError::TokenGeneration)?;
        Ok(hex::encode(bytes))
    }

    /// Remove every expired session. Returns how many were dropped.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn hash_token(token: &str) -> String {
    hex::encode(digest(&SHA256, token.as_bytes()).as_ref())
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, user: &User, now: DateTime<Utc>) -> Result<IssuedSession> {
        if !user.active {
            return Err(AccessError::InactiveUser(user.id));
        }

        let token = self.generate_token()?;
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash: hash_token(&token),
            created_at: now,
            expires_at: now + self.ttl,
        };

        self.sessions
            .write()
            .await
            .insert(session.token_hash.clone(), session.clone());
        info!(user = %user.id, session = %session.id, expires_at = %session.expires_at, "session created");

        Ok(IssuedSession { token, session })
    }

    async fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<User> {
        let key = hash_token(token);
        let user_id = {
            let mut sessions = self.sessions.write().await;
            let (session_id, user_id, expired) = match sessions.get(&key) {
                Some(session) => (session.id, session.user_id, session.is_expired(now)),
                None => return Err(AccessError::SessionExpired),
            };
            if expired {
                debug!(session = %session_id, "session expired");
                sessions.remove(&key);
                return Err(AccessError::SessionExpired);
            }
            user_id
        };

        match self.users.get(user_id).await {
            Some(user) if user.active => Ok(user),
            Some(_) => {
                self.revoke_user(user_id).await?;
                Err(AccessError::InactiveUser(user_id))
            }
            None => {
                self.revoke_user(user_id).await?;
                Err(AccessError::SessionExpired)
            }
        }
    }

    async fn revoke(&self, token: &str) -> Result<bool> {
        let removed = self.sessions.write().await.remove(&hash_token(token));
        if let Some(session) = &removed {
            info!(user = %session.user_id, session = %session.id, "session revoked");
        }
        Ok(removed.is_some())
    }

    async fn revoke_user(&self, user_id: Uuid) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        let dropped = before - sessions.len();
        if dropped > 0 {
            info!(user = %user_id, sessions = dropped, "user sessions revoked");
        }
        Ok(dropped)
    }
}
