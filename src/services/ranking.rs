// src/services/ranking.rs

//! Derived standings: percentage, per-quiz rank, per-category rank and the
//! profile's worldwide rank.
//!
//! Every rank is a competition rank, `1 + number of peers that outrank the
//! subject`, so ties share a rank. Whether one score outranks another is
//! delegated to a [`RankingStrategy`]. The default [`RawScore`] compares raw
//! scores even across quizzes with different question counts;
//! [`PercentageScore`] normalizes by question count instead.

use std::{str::FromStr, sync::Arc};

use sqlx::{FromRow, SqlitePool};

use crate::{
    error::AppError,
    models::attempt::{Attempt, AttemptSummary, CategoryScore, ProfileResponse, QuizResultResponse},
};

/// A score together with the size of the quiz it was earned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct RankedScore {
    pub score: i64,
    pub question_count: i64,
}

impl RankedScore {
    pub fn percentage(&self) -> f64 {
        percentage(self.score, self.question_count)
    }
}

/// `score / question_count * 100`, or 0 for a quiz without questions.
pub fn percentage(score: i64, question_count: i64) -> f64 {
    if question_count == 0 {
        return 0.0;
    }
    score as f64 / question_count as f64 * 100.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Decides whether one score strictly beats another.
pub trait RankingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// True when `other` must be ranked ahead of `subject`.
    fn outranks(&self, other: &RankedScore, subject: &RankedScore) -> bool;
}

/// Compares un-normalized scores.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawScore;

impl RankingStrategy for RawScore {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn outranks(&self, other: &RankedScore, subject: &RankedScore) -> bool {
        other.score > subject.score
    }
}

/// Compares scores as a fraction of the quiz's question count.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentageScore;

impl RankingStrategy for PercentageScore {
    fn name(&self) -> &'static str {
        "percentage"
    }

    fn outranks(&self, other: &RankedScore, subject: &RankedScore) -> bool {
        // Cross-multiplied to stay in integers; an empty quiz counts as 0%.
        let (a_num, a_den) = as_fraction(other);
        let (b_num, b_den) = as_fraction(subject);
        a_num * b_den > b_num * a_den
    }
}

fn as_fraction(s: &RankedScore) -> (i64, i64) {
    if s.question_count <= 0 {
        (0, 1)
    } else {
        (s.score, s.question_count)
    }
}

/// Strategy selector, read from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankingKind {
    #[default]
    Raw,
    Percentage,
}

impl RankingKind {
    pub fn strategy(self) -> Arc<dyn RankingStrategy> {
        match self {
            RankingKind::Raw => Arc::new(RawScore),
            RankingKind::Percentage => Arc::new(PercentageScore),
        }
    }
}

impl FromStr for RankingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(RankingKind::Raw),
            "percentage" => Ok(RankingKind::Percentage),
            other => Err(format!("unknown ranking strategy '{}'", other)),
        }
    }
}

/// `1 + count(peers that outrank subject)`.
pub fn competition_rank(
    strategy: &dyn RankingStrategy,
    subject: &RankedScore,
    peers: &[RankedScore],
) -> i64 {
    1 + peers
        .iter()
        .filter(|peer| strategy.outranks(peer, subject))
        .count() as i64
}

const PEER_SELECT: &str = r#"
    SELECT
        r.score AS score,
        (SELECT COUNT(*) FROM questions q WHERE q.quiz_id = r.quiz_id) AS question_count
    FROM quiz_results r
    JOIN quizzes z ON z.id = r.quiz_id
"#;

async fn quiz_peers(pool: &SqlitePool, quiz_id: i64) -> Result<Vec<RankedScore>, AppError> {
    let peers = sqlx::query_as::<_, RankedScore>(&format!("{} WHERE r.quiz_id = $1", PEER_SELECT))
        .bind(quiz_id)
        .fetch_all(pool)
        .await?;
    Ok(peers)
}

async fn category_peers(
    pool: &SqlitePool,
    category_id: i64,
) -> Result<Vec<RankedScore>, AppError> {
    let peers =
        sqlx::query_as::<_, RankedScore>(&format!("{} WHERE z.category_id = $1", PEER_SELECT))
            .bind(category_id)
            .fetch_all(pool)
            .await?;
    Ok(peers)
}

async fn all_peers(pool: &SqlitePool) -> Result<Vec<RankedScore>, AppError> {
    let peers = sqlx::query_as::<_, RankedScore>(PEER_SELECT)
        .fetch_all(pool)
        .await?;
    Ok(peers)
}

#[derive(FromRow)]
struct QuizHeader {
    title: String,
    category_id: i64,
    category: String,
    question_count: i64,
}

/// Computes percentage, global rank and category rank for a stored attempt.
pub async fn attempt_result(
    pool: &SqlitePool,
    strategy: &dyn RankingStrategy,
    attempt: &Attempt,
) -> Result<QuizResultResponse, AppError> {
    let header = sqlx::query_as::<_, QuizHeader>(
        r#"
        SELECT
            z.title AS title,
            c.id AS category_id,
            c.name AS category,
            (SELECT COUNT(*) FROM questions q WHERE q.quiz_id = z.id) AS question_count
        FROM quizzes z
        JOIN categories c ON c.id = z.category_id
        WHERE z.id = $1
        "#,
    )
    .bind(attempt.quiz_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let subject = RankedScore {
        score: attempt.score,
        question_count: header.question_count,
    };

    let global_rank = competition_rank(strategy, &subject, &quiz_peers(pool, attempt.quiz_id).await?);
    let category_rank =
        competition_rank(strategy, &subject, &category_peers(pool, header.category_id).await?);

    Ok(QuizResultResponse {
        quiz_id: attempt.quiz_id,
        quiz_title: header.title,
        category: header.category,
        score: attempt.score,
        question_count: header.question_count,
        percentage: round2(subject.percentage()),
        global_rank,
        category_rank,
        ranking: strategy.name(),
        completed_at: attempt.completed_at,
    })
}

/// Aggregates a user's attempts into totals, a worldwide rank and a
/// per-category breakdown.
///
/// The worldwide rank compares the user's summed score against individual
/// attempts of every user.
pub async fn profile(
    pool: &SqlitePool,
    strategy: &dyn RankingStrategy,
    user_id: i64,
) -> Result<ProfileResponse, AppError> {
    let username: String = sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let attempts = sqlx::query_as::<_, AttemptSummary>(
        r#"
        SELECT
            r.quiz_id AS quiz_id,
            z.title AS quiz_title,
            c.name AS category,
            r.score AS score,
            (SELECT COUNT(*) FROM questions q WHERE q.quiz_id = r.quiz_id) AS question_count,
            r.completed_at AS completed_at
        FROM quiz_results r
        JOIN quizzes z ON z.id = r.quiz_id
        JOIN categories c ON c.id = z.category_id
        WHERE r.user_id = $1
        ORDER BY r.completed_at DESC, r.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let scores_by_category = sqlx::query_as::<_, CategoryScore>(
        r#"
        SELECT
            c.id AS category_id,
            c.name AS category,
            COALESCE(SUM(r.score), 0) AS score
        FROM quiz_results r
        JOIN quizzes z ON z.id = r.quiz_id
        JOIN categories c ON c.id = z.category_id
        WHERE r.user_id = $1
        GROUP BY c.id, c.name
        ORDER BY c.name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let subject = RankedScore {
        score: attempts.iter().map(|a| a.score).sum(),
        question_count: attempts.iter().map(|a| a.question_count).sum(),
    };
    let worldwide_rank = competition_rank(strategy, &subject, &all_peers(pool).await?);

    Ok(ProfileResponse {
        user_id,
        username,
        total_score: subject.score,
        worldwide_rank,
        scores_by_category,
        attempts,
    })
}
