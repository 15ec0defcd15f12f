// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'quiz_results' table in the database.
/// One row per (user, quiz); never updated once written.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i64,
    pub completed_at: DateTime<Utc>,
}

/// Scored view of an attempt, served on `GET /quiz_result/{quiz}/{score}/`.
#[derive(Debug, Serialize)]
pub struct QuizResultResponse {
    pub quiz_id: i64,
    pub quiz_title: String,
    pub category: String,
    pub score: i64,
    pub question_count: i64,
    pub percentage: f64,
    pub global_rank: i64,
    pub category_rank: i64,

    /// Name of the comparison strategy the ranks were computed with.
    pub ranking: &'static str,
    pub completed_at: DateTime<Utc>,
}

/// Sum of a user's scores within one category.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct CategoryScore {
    pub category_id: i64,
    pub category: String,
    pub score: i64,
}

/// One line of the attempt history on the profile page.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttemptSummary {
    pub quiz_id: i64,
    pub quiz_title: String,
    pub category: String,
    pub score: i64,
    pub question_count: i64,
    pub completed_at: DateTime<Utc>,
}

/// Aggregated profile data for the current user.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: i64,
    pub username: String,
    pub total_score: i64,
    pub worldwide_rank: i64,
    pub scores_by_category: Vec<CategoryScore>,
    pub attempts: Vec<AttemptSummary>,
}
