use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppJson, AppResult};
use crate::models::goal::{CreateGoalRequest, Goal, UpdateGoalRequest};
use crate::AppState;

pub async fn list_goals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Goal>>> {
    let goals = sqlx::query_as::<_, Goal>(
        "SELECT * FROM goals WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(goals))
}

pub async fn create_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(body): AppJson<CreateGoalRequest>,
) -> AppResult<(StatusCode, Json<Goal>)> {
    body.validate()?;

    let goal = sqlx::query_as::<_, Goal>(
        r#"
        INSERT INTO goals (id, user_id, title, description, target_date, progress, is_completed, reward_image)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.description)
    .bind(body.target_date)
    .bind(body.progress.unwrap_or(0))
    .bind(body.is_completed.unwrap_or(false))
    .bind(&body.reward_image)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn update_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
    AppJson(body): AppJson<UpdateGoalRequest>,
) -> AppResult<Json<Goal>> {
    fetch_owned_goal(&state, goal_id, auth_user.id).await?;
    body.validate()?;

    // reward_image uses an explicit present/absent flag: a null in the body
    // clears the column, which COALESCE cannot express.
    let goal = sqlx::query_as::<_, Goal>(
        r#"
        UPDATE goals SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            target_date = COALESCE($4, target_date),
            progress = COALESCE($5, progress),
            is_completed = COALESCE($6, is_completed),
            reward_image = CASE WHEN $7 THEN $8 ELSE reward_image END
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(goal_id)
    .bind(&body.title)
    .bind(&body.description)
    .bind(body.target_date)
    .bind(body.progress)
    .bind(body.is_completed)
    .bind(body.reward_image.is_some())
    .bind(body.reward_image.flatten())
    .fetch_one(&state.db)
    .await?;

    Ok(Json(goal))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    fetch_owned_goal(&state, goal_id, auth_user.id).await?;

    // Linked todos survive; the FK nulls their goal_id.
    sqlx::query("DELETE FROM goals WHERE id = $1")
        .bind(goal_id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Absent rows are 404; rows owned by someone else are 401 and never touched.
async fn fetch_owned_goal(state: &AppState, id: Uuid, user_id: Uuid) -> AppResult<Goal> {
    let goal = sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Goal not found".into()))?;

    if goal.user_id != user_id {
        return Err(AppError::Unauthorized);
    }

    Ok(goal)
}
