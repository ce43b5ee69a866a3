use std::env;

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub session_ttl_secs: i64,
    pub cookie_secure: bool,

    /// Single-tenant mode: when set, every request is owned by this user
    /// and session cookies are never consulted.
    pub single_tenant_user: Option<Uuid>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "604800".into()) // 7 days
                .parse()
                .expect("SESSION_TTL_SECS must be a number"),
            cookie_secure: env::var("COOKIE_SECURE")
                .unwrap_or_else(|_| "false".into())
                .parse()
                .unwrap_or(false),

            single_tenant_user: env::var("SINGLE_TENANT_USER")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|s| s.parse().expect("SINGLE_TENANT_USER must be a UUID")),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
