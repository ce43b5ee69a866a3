use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppJson, AppQuery, AppResult};
use crate::models::todo::{CreateTodoRequest, Todo, TodoListQuery, UpdateTodoRequest};
use crate::AppState;

pub async fn list_todos(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppQuery(query): AppQuery<TodoListQuery>,
) -> AppResult<Json<Vec<Todo>>> {
    let todos = match query.date {
        Some(day) => {
            let (start, end) = day_window(day);
            sqlx::query_as::<_, Todo>(
                r#"
                SELECT * FROM todos
                WHERE user_id = $1 AND date BETWEEN $2 AND $3
                ORDER BY created_at DESC
                "#,
            )
            .bind(auth_user.id)
            .bind(start)
            .bind(end)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Todo>(
                "SELECT * FROM todos WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(auth_user.id)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(todos))
}

pub async fn create_todo(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(body): AppJson<CreateTodoRequest>,
) -> AppResult<(StatusCode, Json<Todo>)> {
    body.validate()?;

    let todo = sqlx::query_as::<_, Todo>(
        r#"
        INSERT INTO todos (id, user_id, goal_id, title, date, priority, is_completed)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.goal_id)
    .bind(&body.title)
    .bind(body.date)
    .bind(body.priority.clone().unwrap_or_default())
    .bind(body.is_completed.unwrap_or(false))
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(todo_id): Path<Uuid>,
    AppJson(body): AppJson<UpdateTodoRequest>,
) -> AppResult<Json<Todo>> {
    fetch_owned_todo(&state, todo_id, auth_user.id).await?;
    body.validate()?;

    let todo = sqlx::query_as::<_, Todo>(
        r#"
        UPDATE todos SET
            title = COALESCE($2, title),
            date = COALESCE($3, date),
            priority = COALESCE($4, priority),
            goal_id = COALESCE($5, goal_id),
            is_completed = COALESCE($6, is_completed)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(todo_id)
    .bind(&body.title)
    .bind(body.date)
    .bind(&body.priority)
    .bind(body.goal_id)
    .bind(body.is_completed)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(todo_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    fetch_owned_todo(&state, todo_id, auth_user.id).await?;

    sqlx::query("DELETE FROM todos WHERE id = $1")
        .bind(todo_id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Absent rows are 404; rows owned by someone else are 401 and never touched.
async fn fetch_owned_todo(state: &AppState, id: Uuid, user_id: Uuid) -> AppResult<Todo> {
    let todo = sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;

    if todo.user_id != user_id {
        return Err(AppError::Unauthorized);
    }

    Ok(todo)
}

/// Closed interval covering one calendar day: [00:00:00, 23:59:59].
fn day_window(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::seconds(86_399);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_window_spans_the_whole_day() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let (start, end) = day_window(day);
        assert_eq!(start.to_rfc3339(), "2024-06-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-06-01T23:59:59+00:00");
    }

    #[test]
    fn day_window_stays_inside_the_day_across_month_end() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let (start, end) = day_window(day);
        assert_eq!(start.to_rfc3339(), "2024-02-29T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-02-29T23:59:59+00:00");
    }
}
