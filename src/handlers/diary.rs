use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppJson, AppQuery, AppResult};
use crate::models::diary::{
    CreateDiaryEntryRequest, DiaryEntry, DiaryListQuery, UpdateDiaryEntryRequest,
};
use crate::AppState;

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppQuery(query): AppQuery<DiaryListQuery>,
) -> AppResult<Json<Vec<DiaryEntry>>> {
    let entries = match parse_date_window(&query)? {
        Some((start, end)) => {
            sqlx::query_as::<_, DiaryEntry>(
                r#"
                SELECT * FROM diary_entries
                WHERE user_id = $1 AND date >= $2 AND date < $3
                ORDER BY date DESC
                "#,
            )
            .bind(auth_user.id)
            .bind(start)
            .bind(end)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, DiaryEntry>(
                "SELECT * FROM diary_entries WHERE user_id = $1 ORDER BY date DESC",
            )
            .bind(auth_user.id)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<DiaryEntry>> {
    let entry = fetch_owned_entry(&state, entry_id, auth_user.id).await?;
    Ok(Json(entry))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    AppJson(body): AppJson<CreateDiaryEntryRequest>,
) -> AppResult<(StatusCode, Json<DiaryEntry>)> {
    body.validate()?;

    let entry = sqlx::query_as::<_, DiaryEntry>(
        r#"
        INSERT INTO diary_entries (id, user_id, date, title, content, mood, notes, images)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.date)
    .bind(&body.title)
    .bind(&body.content)
    .bind(&body.mood)
    .bind(&body.notes)
    .bind(&body.images)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
    AppJson(body): AppJson<UpdateDiaryEntryRequest>,
) -> AppResult<Json<DiaryEntry>> {
    fetch_owned_entry(&state, entry_id, auth_user.id).await?;
    body.validate()?;

    let entry = sqlx::query_as::<_, DiaryEntry>(
        r#"
        UPDATE diary_entries SET
            date = COALESCE($2, date),
            title = COALESCE($3, title),
            content = COALESCE($4, content),
            mood = COALESCE($5, mood),
            notes = COALESCE($6, notes),
            images = COALESCE($7, images),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .bind(body.date)
    .bind(&body.title)
    .bind(&body.content)
    .bind(&body.mood)
    .bind(&body.notes)
    .bind(&body.images)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    fetch_owned_entry(&state, entry_id, auth_user.id).await?;

    sqlx::query("DELETE FROM diary_entries WHERE id = $1")
        .bind(entry_id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Absent rows are 404; rows owned by someone else are 401 and never touched.
async fn fetch_owned_entry(state: &AppState, id: Uuid, user_id: Uuid) -> AppResult<DiaryEntry> {
    let entry = sqlx::query_as::<_, DiaryEntry>("SELECT * FROM diary_entries WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Entry not found".into()))?;

    if entry.user_id != user_id {
        return Err(AppError::Unauthorized);
    }

    Ok(entry)
}

/// Translate the month/year query params into a half-open UTC window.
fn parse_date_window(query: &DiaryListQuery) -> AppResult<Option<(DateTime<Utc>, DateTime<Utc>)>> {
    let year = match query.year.as_deref() {
        Some(raw) => Some(
            raw.parse::<i32>()
                .map_err(|_| AppError::validation_field("Year must be a number", "year"))?,
        ),
        None => None,
    };

    match (query.month.as_deref(), year) {
        (Some(raw), Some(year)) => {
            let month = raw
                .parse::<u32>()
                .map_err(|_| AppError::validation_field("Month must be a number", "month"))?;
            Ok(Some(month_window(year, month)?))
        }
        (None, Some(year)) => Ok(Some(year_window(year)?)),
        (Some(_), None) => Err(AppError::validation_field(
            "Month filter requires a year",
            "year",
        )),
        (None, None) => Ok(None),
    }
}

fn month_window(year: i32, month: u32) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::validation_field("Month must be between 1 and 12", "month"))?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::validation_field("Month must be between 1 and 12", "month"))?;

    Ok((day_start(start), day_start(end)))
}

fn year_window(year: i32) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| AppError::validation_field("Year is out of range", "year"))?;
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)
        .ok_or_else(|| AppError::validation_field("Year is out of range", "year"))?;

    Ok((day_start(start), day_start(end)))
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_window_covers_one_calendar_month() {
        let (start, end) = month_window(2024, 6).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-06-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-07-01T00:00:00+00:00");
    }

    #[test]
    fn month_window_rolls_over_december() {
        let (start, end) = month_window(2024, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn month_window_rejects_invalid_months() {
        for month in [0, 13] {
            match month_window(2024, month) {
                Err(AppError::Validation { field, .. }) => {
                    assert_eq!(field.as_deref(), Some("month"));
                }
                other => panic!("expected Validation, got {:?}", other.map(|_| ())),
            }
        }
    }

    #[test]
    fn year_window_covers_one_year() {
        let (start, end) = year_window(2023).unwrap();
        assert_eq!(start.to_rfc3339(), "2023-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn month_without_year_is_rejected() {
        let query = DiaryListQuery {
            month: Some("06".into()),
            year: None,
        };
        match parse_date_window(&query) {
            Err(AppError::Validation { field, .. }) => {
                assert_eq!(field.as_deref(), Some("year"));
            }
            other => panic!("expected Validation, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn no_filter_means_no_window() {
        let query = DiaryListQuery {
            month: None,
            year: None,
        };
        assert!(parse_date_window(&query).unwrap().is_none());
    }

    #[test]
    fn zero_padded_month_parses() {
        let query = DiaryListQuery {
            month: Some("06".into()),
            year: Some("2024".into()),
        };
        let (start, _) = parse_date_window(&query).unwrap().unwrap();
        assert_eq!(start.to_rfc3339(), "2024-06-01T00:00:00+00:00");
    }
}
