// src/handlers/profile.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    services::ranking::{self, RankingStrategy},
    utils::jwt::Claims,
};

/// Current user's totals, worldwide rank and per-category breakdown.
pub async fn get_profile(
    State(pool): State<SqlitePool>,
    State(strategy): State<Arc<dyn RankingStrategy>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let profile = ranking::profile(&pool, strategy.as_ref(), user_id).await?;

    Ok(Json(profile))
}
