// src/services/catalog.rs

//! Read-only accessors over the category -> quiz -> question -> choice
//! hierarchy used by the quiz-taking flow.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        category::{Category, CategoryQuizzes},
        question::{Choice, Question, QuestionWithChoices, QuizDetail},
        quiz::Quiz,
    },
};

/// Lists every category, ordered by name.
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>, AppError> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name, id")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::from(e)
            })?;

    Ok(categories)
}

pub async fn get_category(pool: &SqlitePool, category_id: i64) -> Result<Category, AppError> {
    sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))
}

/// A category with its quizzes in creation order.
/// Fails with `NotFound` when the category does not exist.
pub async fn list_quizzes(pool: &SqlitePool, category_id: i64) -> Result<CategoryQuizzes, AppError> {
    let category = get_category(pool, category_id).await?;

    let quizzes = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, category_id, level, created_at
        FROM quizzes
        WHERE category_id = $1
        ORDER BY created_at, id
        "#,
    )
    .bind(category_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list quizzes of category {}: {:?}", category_id, e);
        AppError::from(e)
    })?;

    Ok(CategoryQuizzes { category, quizzes })
}

/// Fetches the bare quiz row.
pub async fn find_quiz(pool: &SqlitePool, quiz_id: i64) -> Result<Quiz, AppError> {
    sqlx::query_as::<_, Quiz>(
        "SELECT id, title, category_id, level, created_at FROM quizzes WHERE id = $1",
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))
}

/// Fetches a quiz with its questions (creation order) and each question's choices.
pub async fn get_quiz(pool: &SqlitePool, quiz_id: i64) -> Result<QuizDetail, AppError> {
    let quiz = find_quiz(pool, quiz_id).await?;

    let questions = sqlx::query_as::<_, Question>(
        "SELECT id, quiz_id, text FROM questions WHERE quiz_id = $1 ORDER BY id",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let choices = sqlx::query_as::<_, Choice>(
        r#"
        SELECT c.id, c.question_id, c.text, c.is_correct
        FROM choices c
        JOIN questions q ON q.id = c.question_id
        WHERE q.quiz_id = $1
        ORDER BY c.id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let mut by_question: HashMap<i64, Vec<Choice>> = HashMap::new();
    for choice in choices {
        by_question.entry(choice.question_id).or_default().push(choice);
    }

    let questions = questions
        .into_iter()
        .map(|question| QuestionWithChoices {
            choices: by_question.remove(&question.id).unwrap_or_default(),
            question,
        })
        .collect();

    Ok(QuizDetail { quiz, questions })
}

/// All quizzes, for the read-only API layer.
pub async fn all_quizzes(pool: &SqlitePool) -> Result<Vec<Quiz>, AppError> {
    let quizzes = sqlx::query_as::<_, Quiz>(
        "SELECT id, title, category_id, level, created_at FROM quizzes ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(quizzes)
}

/// All questions, for the read-only API layer.
pub async fn all_questions(pool: &SqlitePool) -> Result<Vec<Question>, AppError> {
    let questions =
        sqlx::query_as::<_, Question>("SELECT id, quiz_id, text FROM questions ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(questions)
}
