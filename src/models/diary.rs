use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    pub notes: Option<String>,
    /// Ordered image payloads (data URIs), stored inline.
    pub images: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "mood", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Neutral,
    Productive,
    Tired,
    Anxious,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiaryEntryRequest {
    pub date: DateTime<Utc>,

    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    pub mood: Mood,
    pub notes: Option<String>,
    pub images: Option<Vec<String>>,
}

/// PATCH body: any subset of the create fields. Omitted fields keep their
/// stored value.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiaryEntryRequest {
    pub date: Option<DateTime<Utc>>,

    #[validate(length(min = 1, max = 200, message = "Title must not be empty"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,

    pub mood: Option<Mood>,
    pub notes: Option<String>,
    pub images: Option<Vec<String>>,
}

/// GET /api/diary query params. `month` is "MM", `year` is "YYYY".
#[derive(Debug, Deserialize)]
pub struct DiaryListQuery {
    pub month: Option<String>,
    pub year: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Mood::Productive).unwrap(),
            serde_json::json!("productive")
        );
        let mood: Mood = serde_json::from_value(serde_json::json!("anxious")).unwrap();
        assert_eq!(mood, Mood::Anxious);
    }

    #[test]
    fn unknown_mood_is_rejected() {
        assert!(serde_json::from_value::<Mood>(serde_json::json!("ecstatic")).is_err());
    }

    #[test]
    fn update_request_accepts_any_subset() {
        let body: UpdateDiaryEntryRequest = serde_json::from_value(serde_json::json!({
            "title": "Revised"
        }))
        .unwrap();
        assert_eq!(body.title.as_deref(), Some("Revised"));
        assert!(body.content.is_none());
        assert!(body.mood.is_none());
        assert!(body.date.is_none());
    }
}
