// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Difficulty level of a quiz, stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Level {
    Easy,
    Medium,
    Advanced,
}

/// Represents the 'quizzes' table in the database.
/// Serialized verbatim by the API layer.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub category_id: i64,
    pub level: Level,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub category_id: i64,
    pub level: Level,
}

/// DTO for updating a quiz. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    pub category_id: Option<i64>,
    pub level: Option<Level>,
}

impl UpdateQuizRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.category_id.is_none() && self.level.is_none()
    }
}
