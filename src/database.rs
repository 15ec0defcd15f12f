// src/database.rs

use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{config::Config, error::AppError, utils::hash::hash_password, utils::jwt::ADMIN_ROLE};

/// Opens the pool, creating the database file when missing.
/// Foreign keys are enforced so catalog deletes cascade.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Creates the configured admin account unless a user with that name exists.
pub async fn seed_admin_user(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(());
    };

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    if exists.is_none() {
        tracing::info!("Seeding admin user: {}", username);
        let hashed_password = hash_password(password)?;

        sqlx::query("INSERT INTO users (username, password, role) VALUES ($1, $2, $3)")
            .bind(username)
            .bind(hashed_password)
            .bind(ADMIN_ROLE)
            .execute(pool)
            .await?;
        tracing::info!("Admin user created successfully.");
    }

    Ok(())
}
