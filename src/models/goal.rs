use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    /// Percent complete, 0-100.
    pub progress: i32,
    /// Reward image payload (data URI), stored inline.
    pub reward_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,
    pub target_date: Option<DateTime<Utc>>,

    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<i32>,

    pub is_completed: Option<bool>,
    pub reward_image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must not be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,
    pub target_date: Option<DateTime<Utc>>,

    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<i32>,

    pub is_completed: Option<bool>,

    /// `"rewardImage": null` clears the stored image; omitting the field
    /// leaves it untouched.
    #[serde(default, deserialize_with = "double_option")]
    pub reward_image: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_image_null_is_distinct_from_omitted() {
        let cleared: UpdateGoalRequest =
            serde_json::from_value(serde_json::json!({ "rewardImage": null })).unwrap();
        assert_eq!(cleared.reward_image, Some(None));

        let omitted: UpdateGoalRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(omitted.reward_image, None);

        let replaced: UpdateGoalRequest =
            serde_json::from_value(serde_json::json!({ "rewardImage": "data:image/png;base64,AA==" }))
                .unwrap();
        assert_eq!(
            replaced.reward_image,
            Some(Some("data:image/png;base64,AA==".to_string()))
        );
    }

    #[test]
    fn progress_outside_range_fails_validation() {
        let body: CreateGoalRequest = serde_json::from_value(serde_json::json!({
            "title": "Read 12 books",
            "progress": 150
        }))
        .unwrap();
        assert!(body.validate().is_err());

        let body: CreateGoalRequest = serde_json::from_value(serde_json::json!({
            "title": "Read 12 books",
            "progress": 100
        }))
        .unwrap();
        assert!(body.validate().is_ok());
    }
}
