// src/handlers/quiz.rs

use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{attempt::Attempt, question::QuizForm},
    services::{
        attempts, catalog,
        ranking::{self, RankingStrategy},
        scoring,
    },
    utils::jwt::Claims,
};

fn result_location(attempt: &Attempt) -> String {
    format!("/quiz_result/{}/{}/", attempt.quiz_id, attempt.score)
}

fn redirect_to_result(attempt: &Attempt) -> Response {
    Redirect::to(&result_location(attempt)).into_response()
}

/// Serves the quiz form.
///
/// Once the user has an attempt on this quiz, every request is redirected
/// to the stored result instead.
pub async fn take_quiz_form(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<Response, AppError> {
    let user_id = claims.user_id()?;

    if let Some(attempt) = attempts::find_existing(&pool, user_id, quiz_id).await? {
        return Ok(redirect_to_result(&attempt));
    }

    let detail = catalog::get_quiz(&pool, quiz_id).await?;
    Ok(Json(QuizForm::from(detail)).into_response())
}

/// Scores a submitted quiz form and records the attempt.
///
/// * Rejects the whole submission when a question is unanswered.
/// * Rejects choices that do not belong to their question.
/// * Records at most one attempt per user and quiz, even under concurrent
///   submissions; the loser of a race is redirected to the stored result.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let user_id = claims.user_id()?;

    if let Some(attempt) = attempts::find_existing(&pool, user_id, quiz_id).await? {
        return Ok(redirect_to_result(&attempt));
    }

    let detail = catalog::get_quiz(&pool, quiz_id).await?;
    let answers = scoring::parse_answers(&form)?;
    let outcome = scoring::score(&detail, &answers)?;

    if outcome.unanswered {
        return Err(AppError::IncompleteSubmission);
    }

    let recorded = attempts::record_if_absent(&pool, user_id, quiz_id, outcome.score).await?;
    Ok(redirect_to_result(recorded.attempt()))
}

/// Shows score, percentage and ranks for the caller's attempt on a quiz.
///
/// The score in the path is informational; the stored attempt wins.
pub async fn quiz_result(
    State(pool): State<SqlitePool>,
    State(strategy): State<Arc<dyn RankingStrategy>>,
    Extension(claims): Extension<Claims>,
    Path((quiz_id, score)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let attempt = attempts::find_existing(&pool, user_id, quiz_id)
        .await?
        .ok_or(AppError::NotFound("No result for this quiz".to_string()))?;

    if attempt.score != score {
        tracing::debug!(
            quiz_id,
            requested = score,
            stored = attempt.score,
            "Result requested with a stale score"
        );
    }

    let result = ranking::attempt_result(&pool, strategy.as_ref(), &attempt).await?;
    Ok(Json(result))
}
