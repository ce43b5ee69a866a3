use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::auth::session::{resolve_session, SESSION_COOKIE};
use crate::error::AppError;
use crate::AppState;

/// Identity resolved for the current request. Injected into request
/// extensions before any protected handler runs; handlers read the owner
/// from here and never from the request body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Single-tenant mode: one configured owner, cookies ignored.
    if let Some(user_id) = state.config.single_tenant_user {
        req.extensions_mut().insert(AuthUser { id: user_id });
        return Ok(next.run(req).await);
    }

    let jar = CookieJar::from_headers(req.headers());
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AppError::Unauthorized)?;

    let user_id = resolve_session(&state.db, &token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(AuthUser { id: user_id });
    Ok(next.run(req).await)
}
