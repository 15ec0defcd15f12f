// src/models/category.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'categories' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: i64,

    /// Unique display name (e.g., "Geography").
    pub name: String,
}

/// DTO for creating or renaming a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Category name must be between 1 and 100 characters"
    ))]
    pub name: String,
}

/// Response for listing the quizzes of one category.
#[derive(Debug, Serialize)]
pub struct CategoryQuizzes {
    pub category: Category,
    pub quizzes: Vec<crate::models::quiz::Quiz>,
}
