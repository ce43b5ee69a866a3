use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppResult;

pub const SESSION_COOKIE: &str = "inkwell_session";

/// 32 bytes of OS entropy, hex-encoded. The raw token only ever lives in
/// the cookie; the database sees its hash.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compute SHA-256 hash of a raw token string, returned as lowercase hex.
pub fn hash_token(raw_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Insert a session row and return the raw token destined for the cookie.
pub async fn create_session(db: &PgPool, user_id: Uuid, ttl_secs: i64) -> AppResult<String> {
    let raw_token = generate_token();
    let token_hash = hash_token(&raw_token);
    let expires_at = Utc::now() + Duration::seconds(ttl_secs);

    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, token_hash, expires_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&token_hash)
    .bind(expires_at)
    .execute(db)
    .await?;

    Ok(raw_token)
}

/// Resolve a raw token to its owning user. Expired sessions resolve to None.
pub async fn resolve_session(db: &PgPool, raw_token: &str) -> AppResult<Option<Uuid>> {
    let user_id = sqlx::query_scalar::<_, Uuid>(
        "SELECT user_id FROM sessions WHERE token_hash = $1 AND expires_at > NOW()",
    )
    .bind(hash_token(raw_token))
    .fetch_optional(db)
    .await?;

    Ok(user_id)
}

/// Delete the session row for a raw token, if any.
pub async fn revoke_session(db: &PgPool, raw_token: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(hash_token(raw_token))
        .execute(db)
        .await?;
    Ok(())
}

pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.session_ttl_secs))
        .build()
}

/// Same name and path as the session cookie so removal reaches the browser.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Single-tenant mode: make sure the configured owner row exists at boot.
pub async fn ensure_single_tenant_user(db: &PgPool, user_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash)
        VALUES ($1, 'owner', '')
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_deterministic() {
        let token = "test-session-token-value";
        let h1 = hash_token(token);
        let h2 = hash_token(token);
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64); // SHA-256 hex = 64 chars
    }

    #[test]
    fn test_hash_token_different_inputs() {
        let h1 = hash_token("token-a");
        let h2 = hash_token("token-b");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_generate_token_entropy() {
        let t1 = generate_token();
        let t2 = generate_token();
        assert_eq!(t1.len(), 64); // 32 bytes hex = 64 chars
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let config = Config {
            database_url: String::new(),
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: String::new(),
            session_ttl_secs: 604_800,
            cookie_secure: false,
            single_tenant_user: None,
        };
        let cookie = session_cookie("abc".into(), &config);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
    }
}
