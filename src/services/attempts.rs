// src/services/attempts.rs

//! Records quiz attempts and guards the one-attempt-per-user-per-quiz rule.

use sqlx::SqlitePool;

use crate::{
    error::{AppError, is_unique_violation},
    models::attempt::Attempt,
};

/// What happened when an attempt was offered to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The attempt was written by this call.
    Created(Attempt),

    /// An attempt for the same (user, quiz) already existed; nothing was written.
    AlreadyAttempted(Attempt),
}

impl RecordOutcome {
    pub fn attempt(&self) -> &Attempt {
        match self {
            RecordOutcome::Created(a) | RecordOutcome::AlreadyAttempted(a) => a,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, RecordOutcome::Created(_))
    }
}

pub async fn find_existing(
    pool: &SqlitePool,
    user_id: i64,
    quiz_id: i64,
) -> Result<Option<Attempt>, AppError> {
    let attempt = sqlx::query_as::<_, Attempt>(
        r#"
        SELECT id, user_id, quiz_id, score, completed_at
        FROM quiz_results
        WHERE user_id = $1 AND quiz_id = $2
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?;

    Ok(attempt)
}

/// Inserts an attempt unconditionally.
///
/// The unique index on (user_id, quiz_id) still applies: a second insert for
/// the same pair fails with `Conflict`. Prefer [`record_if_absent`].
pub async fn record(
    pool: &SqlitePool,
    user_id: i64,
    quiz_id: i64,
    score: i64,
) -> Result<Attempt, AppError> {
    sqlx::query_as::<_, Attempt>(
        r#"
        INSERT INTO quiz_results (user_id, quiz_id, score)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, quiz_id, score, completed_at
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(score)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Quiz already attempted".to_string())
        } else {
            tracing::error!("Failed to record attempt: {:?}", e);
            AppError::from(e)
        }
    })
}

/// Atomically records an attempt unless one already exists for (user, quiz).
///
/// The insert and the uniqueness check are a single statement; when the
/// conflict clause swallows the insert, the stored attempt is returned as
/// `AlreadyAttempted`.
pub async fn record_if_absent(
    pool: &SqlitePool,
    user_id: i64,
    quiz_id: i64,
    score: i64,
) -> Result<RecordOutcome, AppError> {
    let inserted = sqlx::query_as::<_, Attempt>(
        r#"
        INSERT INTO quiz_results (user_id, quiz_id, score)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, quiz_id) DO NOTHING
        RETURNING id, user_id, quiz_id, score, completed_at
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(score)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record attempt: {:?}", e);
        AppError::from(e)
    })?;

    if let Some(attempt) = inserted {
        tracing::info!(
            user_id,
            quiz_id,
            score = attempt.score,
            "Recorded quiz attempt {}",
            attempt.id
        );
        return Ok(RecordOutcome::Created(attempt));
    }

    let existing = find_existing(pool, user_id, quiz_id).await?.ok_or_else(|| {
        AppError::InternalServerError(format!(
            "attempt for user {} on quiz {} vanished after conflict",
            user_id, quiz_id
        ))
    })?;

    tracing::debug!(user_id, quiz_id, "Quiz already attempted, keeping stored score");
    Ok(RecordOutcome::AlreadyAttempted(existing))
}
