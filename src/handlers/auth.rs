use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::{
    clear_session_cookie, create_session, revoke_session, session_cookie, SESSION_COOKIE,
};
use crate::error::{AppError, AppJson, AppResult};
use crate::models::user::{
    AuthUserResponse, CurrentUserResponse, LoginRequest, RegisterRequest, User,
};
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthUserResponse>)> {
    body.validate()?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&body.username)
        .fetch_one(&state.db)
        .await?;

    if existing > 0 {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let password_hash = hash_password(&body.password)?;
    let user_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(&body.username)
    .bind(&body.email)
    .bind(&password_hash)
    .execute(&state.db)
    .await?;

    let token = create_session(&state.db, user_id, state.config.session_ttl_secs).await?;

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token, &state.config)),
        Json(AuthUserResponse {
            id: user_id,
            username: body.username,
            email: body.email,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthUserResponse>)> {
    body.validate()?;

    // Same error for unknown user and wrong password.
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(&body.username)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = create_session(&state.db, user.id, state.config.session_ttl_secs).await?;

    Ok((
        jar.add(session_cookie(token, &state.config)),
        Json(AuthUserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }),
    ))
}

/// Works with or without a live session: the row is removed when the cookie
/// still resolves to one, and the cookie is cleared either way.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<serde_json::Value>)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        revoke_session(&state.db, cookie.value()).await?;
    }

    Ok((
        jar.remove(clear_session_cookie()),
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    ))
}

pub async fn current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<CurrentUserResponse>> {
    let user = sqlx::query_as::<_, CurrentUserResponse>(
        "SELECT id, username, email, first_name, last_name FROM users WHERE id = $1",
    )
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::Unauthorized)?;

    Ok(Json(user))
}
