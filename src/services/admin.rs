// src/services/admin.rs

//! Catalog authoring: the capability set behind the `/admin` routes.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::{
    error::{AppError, is_unique_violation},
    models::{
        category::Category,
        question::{
            Choice, CreateQuestionRequest, NewChoice, Question, QuestionWithChoices,
            UpdateChoiceRequest,
        },
        quiz::{CreateQuizRequest, Quiz, UpdateQuizRequest},
    },
    services::catalog,
    utils::html::clean_html,
};

pub const NO_CORRECT_CHOICE: &str = "At least one choice must be correct";

/// Row counts shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct DashboardCounts {
    pub quizzes_count: i64,
    pub categories_count: i64,
    pub questions_count: i64,
    pub choices_count: i64,
}

/// Create, update, delete and duplicate operations over the catalog.
///
/// Every question must keep at least one correct choice; operations that
/// would break that are rejected with `BadRequest`.
#[async_trait]
pub trait CatalogAdmin {
    async fn create_category(&self, name: &str) -> Result<Category, AppError>;
    async fn rename_category(&self, id: i64, name: &str) -> Result<Category, AppError>;
    async fn delete_category(&self, id: i64) -> Result<(), AppError>;

    async fn create_quiz(&self, req: &CreateQuizRequest) -> Result<Quiz, AppError>;
    async fn update_quiz(&self, id: i64, req: &UpdateQuizRequest) -> Result<Quiz, AppError>;
    async fn delete_quiz(&self, id: i64) -> Result<(), AppError>;

    /// Copies the quiz row as "<title> (Copy)". Questions are not copied.
    async fn duplicate_quiz(&self, id: i64) -> Result<Quiz, AppError>;

    async fn create_question(
        &self,
        req: &CreateQuestionRequest,
    ) -> Result<QuestionWithChoices, AppError>;
    async fn update_question(&self, id: i64, text: &str) -> Result<Question, AppError>;
    async fn delete_question(&self, id: i64) -> Result<(), AppError>;

    async fn add_choice(&self, question_id: i64, choice: &NewChoice) -> Result<Choice, AppError>;
    async fn update_choice(&self, id: i64, req: &UpdateChoiceRequest) -> Result<Choice, AppError>;
    async fn delete_choice(&self, id: i64) -> Result<(), AppError>;

    async fn dashboard(&self) -> Result<DashboardCounts, AppError>;
}

fn sanitize_question_text(text: &str) -> Result<String, AppError> {
    let cleaned = clean_html(text);
    if cleaned.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Question text is empty after sanitizing".to_string(),
        ));
    }
    Ok(cleaned)
}

fn map_write_error(what: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| {
        tracing::error!("Failed to write {}: {:?}", what, e);
        AppError::from(e)
    }
}

#[async_trait]
impl CatalogAdmin for SqlitePool {
    async fn create_category(&self, name: &str) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(self)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!("Category '{}' already exists", name))
                } else {
                    map_write_error("category")(e)
                }
            })
    }

    async fn rename_category(&self, id: i64, name: &str) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(self)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Category '{}' already exists", name))
            } else {
                map_write_error("category")(e)
            }
        })?
        .ok_or(AppError::NotFound("Category not found".to_string()))
    }

    async fn delete_category(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self)
            .await
            .map_err(map_write_error("category"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
        Ok(())
    }

    async fn create_quiz(&self, req: &CreateQuizRequest) -> Result<Quiz, AppError> {
        catalog::get_category(self, req.category_id).await?;

        sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (title, category_id, level)
            VALUES ($1, $2, $3)
            RETURNING id, title, category_id, level, created_at
            "#,
        )
        .bind(&req.title)
        .bind(req.category_id)
        .bind(req.level)
        .fetch_one(self)
        .await
        .map_err(map_write_error("quiz"))
    }

    async fn update_quiz(&self, id: i64, req: &UpdateQuizRequest) -> Result<Quiz, AppError> {
        if req.is_empty() {
            return catalog::find_quiz(self, id).await;
        }

        if let Some(category_id) = req.category_id {
            catalog::get_category(self, category_id).await?;
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE quizzes SET ");
        let mut separated = builder.separated(", ");

        if let Some(title) = &req.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title.clone());
        }

        if let Some(category_id) = req.category_id {
            separated.push("category_id = ");
            separated.push_bind_unseparated(category_id);
        }

        if let Some(level) = req.level {
            separated.push("level = ");
            separated.push_bind_unseparated(level);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING id, title, category_id, level, created_at");

        builder
            .build_query_as::<Quiz>()
            .fetch_optional(self)
            .await
            .map_err(map_write_error("quiz"))?
            .ok_or(AppError::NotFound("Quiz not found".to_string()))
    }

    async fn delete_quiz(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(self)
            .await
            .map_err(map_write_error("quiz"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Quiz not found".to_string()));
        }
        Ok(())
    }

    async fn duplicate_quiz(&self, id: i64) -> Result<Quiz, AppError> {
        sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (title, category_id, level)
            SELECT title || ' (Copy)', category_id, level
            FROM quizzes
            WHERE id = $1
            RETURNING id, title, category_id, level, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(self)
        .await
        .map_err(map_write_error("quiz"))?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))
    }

    async fn create_question(
        &self,
        req: &CreateQuestionRequest,
    ) -> Result<QuestionWithChoices, AppError> {
        if !req.choices.iter().any(|c| c.is_correct) {
            return Err(AppError::BadRequest(NO_CORRECT_CHOICE.to_string()));
        }
        let text = sanitize_question_text(&req.text)?;

        catalog::find_quiz(self, req.quiz_id).await?;

        let mut tx = self.begin().await?;

        let question = sqlx::query_as::<_, Question>(
            "INSERT INTO questions (quiz_id, text) VALUES ($1, $2) RETURNING id, quiz_id, text",
        )
        .bind(req.quiz_id)
        .bind(&text)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error("question"))?;

        let mut choices = Vec::with_capacity(req.choices.len());
        for choice in &req.choices {
            let row = sqlx::query_as::<_, Choice>(
                r#"
                INSERT INTO choices (question_id, text, is_correct)
                VALUES ($1, $2, $3)
                RETURNING id, question_id, text, is_correct
                "#,
            )
            .bind(question.id)
            .bind(&choice.text)
            .bind(choice.is_correct)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error("choice"))?;
            choices.push(row);
        }

        tx.commit().await?;

        tracing::info!(
            quiz_id = req.quiz_id,
            "Created question {} with {} choices",
            question.id,
            choices.len()
        );

        Ok(QuestionWithChoices { question, choices })
    }

    async fn update_question(&self, id: i64, text: &str) -> Result<Question, AppError> {
        let text = sanitize_question_text(text)?;

        sqlx::query_as::<_, Question>(
            "UPDATE questions SET text = $1 WHERE id = $2 RETURNING id, quiz_id, text",
        )
        .bind(&text)
        .bind(id)
        .fetch_optional(self)
        .await
        .map_err(map_write_error("question"))?
        .ok_or(AppError::NotFound("Question not found".to_string()))
    }

    async fn delete_question(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(self)
            .await
            .map_err(map_write_error("question"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Question not found".to_string()));
        }
        Ok(())
    }

    async fn add_choice(&self, question_id: i64, choice: &NewChoice) -> Result<Choice, AppError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM questions WHERE id = $1")
            .bind(question_id)
            .fetch_optional(self)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("Question not found".to_string()));
        }

        sqlx::query_as::<_, Choice>(
            r#"
            INSERT INTO choices (question_id, text, is_correct)
            VALUES ($1, $2, $3)
            RETURNING id, question_id, text, is_correct
            "#,
        )
        .bind(question_id)
        .bind(&choice.text)
        .bind(choice.is_correct)
        .fetch_one(self)
        .await
        .map_err(map_write_error("choice"))
    }

    async fn update_choice(&self, id: i64, req: &UpdateChoiceRequest) -> Result<Choice, AppError> {
        let mut tx = self.begin().await?;

        let current = sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, text, is_correct FROM choices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Choice not found".to_string()))?;

        if current.is_correct && req.is_correct == Some(false) {
            let others: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM choices WHERE question_id = $1 AND is_correct AND id <> $2",
            )
            .bind(current.question_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if others == 0 {
                return Err(AppError::BadRequest(NO_CORRECT_CHOICE.to_string()));
            }
        }

        let updated = sqlx::query_as::<_, Choice>(
            r#"
            UPDATE choices
            SET text = COALESCE($1, text), is_correct = COALESCE($2, is_correct)
            WHERE id = $3
            RETURNING id, question_id, text, is_correct
            "#,
        )
        .bind(req.text.as_deref())
        .bind(req.is_correct)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error("choice"))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_choice(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        let current = sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, text, is_correct FROM choices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Choice not found".to_string()))?;

        if current.is_correct {
            let others: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM choices WHERE question_id = $1 AND is_correct AND id <> $2",
            )
            .bind(current.question_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if others == 0 {
                return Err(AppError::BadRequest(NO_CORRECT_CHOICE.to_string()));
            }
        }

        sqlx::query("DELETE FROM choices WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error("choice"))?;

        tx.commit().await?;
        Ok(())
    }

    async fn dashboard(&self) -> Result<DashboardCounts, AppError> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM quizzes) AS quizzes_count,
                (SELECT COUNT(*) FROM categories) AS categories_count,
                (SELECT COUNT(*) FROM questions) AS questions_count,
                (SELECT COUNT(*) FROM choices) AS choices_count
            "#,
        )
        .fetch_one(self)
        .await?;

        Ok(counts)
    }
}
