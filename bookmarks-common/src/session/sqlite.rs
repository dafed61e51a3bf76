//! SQLite-backed Session Provider
//!
//! Stands in for a hosted identity service. The consent step is [`SqliteSessionProvider::authorize`],
//! which the web layer exposes as a minimal email form; everything after that (one-time
//! code, callback exchange, bearer session) follows the usual redirect flow.
//!
//! Bearer tokens are never stored; `sessions.token_hash` holds their SHA-256 digest.

use async_trait::async_trait;
use chrono::Duration;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, info};
use url::Url;

use super::{SessionProvider, SignInRequest};
use crate::{time, Error, Result, SessionToken, User, UserId};

/// Lifetime of a code between the consent step and the callback
const AUTH_CODE_TTL_MINUTES: i64 = 5;

#[derive(Clone)]
pub struct SqliteSessionProvider {
    pool: SqlitePool,
    authorize_url: String,
    session_ttl: Duration,
}

impl SqliteSessionProvider {
    /// `authorize_url` must be absolute
    pub fn new(pool: SqlitePool, authorize_url: impl Into<String>) -> Self {
        Self {
            pool,
            authorize_url: authorize_url.into(),
            session_ttl: Duration::hours(720),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Consent step: register (or find) the user for `email` and issue a one-time code
    pub async fn authorize(&self, email: &str) -> Result<String> {
        let email = normalize_email(email)?;
        let now = time::now();

        sqlx::query("INSERT INTO users (id, email, created_at) VALUES (?, ?, ?) ON CONFLICT(email) DO NOTHING")
            .bind(UserId::new().to_string())
            .bind(&email)
            .bind(time::to_storage(&now))
            .execute(&self.pool)
            .await?;

        let (user_id,): (String,) = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_one(&self.pool)
            .await?;

        let code = random_hex(16);
        let expires_at = now + Duration::minutes(AUTH_CODE_TTL_MINUTES);

        sqlx::query("INSERT INTO auth_codes (code, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&code)
            .bind(&user_id)
            .bind(time::to_storage(&expires_at))
            .execute(&self.pool)
            .await?;

        debug!("Issued sign-in code for {}", email);

        Ok(code)
    }

    /// Remove expired sessions and codes, returning how many rows went away
    pub async fn purge_expired(&self) -> Result<u64> {
        let now = time::to_storage(&time::now());

        let sessions = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(&now)
            .execute(&self.pool)
            .await?
            .rows_affected();
        let codes = sqlx::query("DELETE FROM auth_codes WHERE expires_at <= ?")
            .bind(&now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(sessions + codes)
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(Error::InvalidInput(format!("Not an email address: {:?}", email))),
    }
}

/// `len` random bytes, hex encoded
fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn token_hash(token: &SessionToken) -> String {
    format!("{:x}", Sha256::digest(token.as_str().as_bytes()))
}

fn parse_user(id: &str, email: String) -> Result<User> {
    Ok(User {
        id: id
            .parse()
            .map_err(|e| Error::Internal(format!("Invalid user id {:?}: {}", id, e)))?,
        email,
    })
}

#[async_trait]
impl SessionProvider for SqliteSessionProvider {
    async fn current_user(&self, token: &SessionToken) -> Result<Option<User>> {
        let row: Option<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT u.id, u.email, s.expires_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = ?
            "#,
        )
        .bind(token_hash(token))
        .fetch_optional(&self.pool)
        .await?;

        let Some((user_id, email, expires_at)) = row else {
            return Ok(None);
        };

        if time::from_storage(&expires_at)? <= time::now() {
            debug!("Session {} expired", token);
            self.sign_out(token).await?;
            return Ok(None);
        }

        parse_user(&user_id, email).map(Some)
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<String> {
        let mut url = Url::parse(&self.authorize_url).map_err(|e| {
            Error::Config(format!("Invalid authorize URL {:?}: {}", self.authorize_url, e))
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("provider", &request.provider)
                .append_pair("redirect_to", &request.redirect_to);
            for (key, value) in &request.query_params {
                query.append_pair(key, value);
            }
        }

        Ok(url.into())
    }

    async fn complete_sign_in(&self, code: &str) -> Result<(SessionToken, User)> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String, String)> =
            sqlx::query_as("SELECT user_id, expires_at FROM auth_codes WHERE code = ?")
                .bind(code)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((user_id, expires_at)) = row else {
            return Err(Error::Unauthorized("Unknown sign-in code".to_string()));
        };

        // Single use, whether or not it is still valid
        sqlx::query("DELETE FROM auth_codes WHERE code = ?")
            .bind(code)
            .execute(&mut *tx)
            .await?;

        let now = time::now();
        if time::from_storage(&expires_at)? <= now {
            tx.commit().await?;
            return Err(Error::Unauthorized("Sign-in code expired".to_string()));
        }

        let (email,): (String,) = sqlx::query_as("SELECT email FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_one(&mut *tx)
            .await?;
        let user = parse_user(&user_id, email)?;

        let expires_at = now
            .checked_add_signed(self.session_ttl)
            .ok_or_else(|| Error::Config(format!("Session TTL out of range: {}", self.session_ttl)))?;

        let token = SessionToken::new(random_hex(32));
        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token_hash(&token))
        .bind(&user_id)
        .bind(time::to_storage(&now))
        .bind(time::to_storage(&expires_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("Session started for {}", user.email);

        Ok((token, user))
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash(token))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
