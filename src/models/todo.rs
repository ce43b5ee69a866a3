use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Optional link to a goal. Nulled when the goal is deleted.
    pub goal_id: Option<Uuid>,
    pub title: String,
    /// The day the task applies to.
    pub date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    pub date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub goal_id: Option<Uuid>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, max = 200, message = "Title must not be empty"))]
    pub title: Option<String>,

    pub date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub goal_id: Option<Uuid>,
    pub is_completed: Option<bool>,
}

/// GET /api/todos query params.
#[derive(Debug, Deserialize)]
pub struct TodoListQuery {
    /// Calendar day, YYYY-MM-DD.
    pub date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);

        let body: CreateTodoRequest = serde_json::from_value(serde_json::json!({
            "title": "Water the plants"
        }))
        .unwrap();
        assert!(body.priority.is_none());
        assert_eq!(body.priority.unwrap_or_default(), Priority::Medium);
    }

    #[test]
    fn priority_uses_capitalized_wire_names() {
        assert_eq!(
            serde_json::to_value(Priority::High).unwrap(),
            serde_json::json!("High")
        );
        let p: Priority = serde_json::from_value(serde_json::json!("Low")).unwrap();
        assert_eq!(p, Priority::Low);
        assert!(serde_json::from_value::<Priority>(serde_json::json!("urgent")).is_err());
    }
}
