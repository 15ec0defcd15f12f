// tests/common/mod.rs

#![allow(dead_code)]

use std::str::FromStr;

use appquiz::{
    config::Config,
    database, routes,
    models::{
        question::{CreateQuestionRequest, NewChoice},
        quiz::{CreateQuizRequest, Level},
    },
    services::{admin::CatalogAdmin, attempts, ranking::RankingKind},
    state::AppState,
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    /// Does not follow redirects, so `Location` headers can be asserted.
    pub client: reqwest::Client,
}

pub struct Member {
    pub id: i64,
    pub username: String,
    pub token: String,
}

/// A seeded question: its id, one correct and one wrong choice.
#[derive(Debug, Clone, Copy)]
pub struct SeededQuestion {
    pub id: i64,
    pub correct: i64,
    pub wrong: i64,
}

pub struct SeededQuiz {
    pub id: i64,
    pub category_id: i64,
    pub questions: Vec<SeededQuestion>,
}

impl SeededQuiz {
    /// Form answering the first `correct` questions right and the rest wrong.
    pub fn answers(&self, correct: usize) -> Vec<(String, String)> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let choice = if i < correct { q.correct } else { q.wrong };
                (format!("question_{}", q.id), choice.to_string())
            })
            .collect()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(RankingKind::Raw).await
}

/// Spawns the app on a random port, backed by a fresh in-memory database.
pub async fn spawn_app_with(ranking: RankingKind) -> TestApp {
    // A single connection that never recycles keeps the in-memory database alive.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Invalid sqlite url")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    serve(pool, ranking).await
}

/// Spawns the app on a temporary database file with a multi-connection pool,
/// so requests really hit the database in parallel.
pub async fn spawn_app_on_disk() -> TestApp {
    let path = std::env::temp_dir().join(format!("appquiz_{}.db", uuid::Uuid::new_v4()));
    let url = format!("sqlite://{}", path.display());

    let pool = database::init_pool(&url, 5)
        .await
        .expect("Failed to open database file");

    serve(pool, RankingKind::Raw).await
}

async fn serve(pool: SqlitePool, ranking: RankingKind) -> TestApp {
    database::run_migrations(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        ranking,
        admin_username: Some(ADMIN_USERNAME.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
    };

    database::seed_admin_user(&pool, &config)
        .await
        .expect("Failed to seed admin");

    let app = routes::create_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        pool,
        client,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Registers a fresh user through the API and returns its token.
    pub async fn new_member(&self) -> Member {
        let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

        let response = self
            .client
            .post(self.url("/signup/"))
            .json(&serde_json::json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password1": "password123",
                "confirm_password": "password123"
            }))
            .send()
            .await
            .expect("Signup failed");
        assert_eq!(response.status().as_u16(), 201);

        let body: serde_json::Value = response.json().await.unwrap();
        Member {
            id: body["user"]["id"].as_i64().unwrap(),
            username,
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn admin_token(&self) -> String {
        let body: serde_json::Value = self
            .client
            .post(self.url("/login/"))
            .json(&serde_json::json!({
                "username": ADMIN_USERNAME,
                "password": ADMIN_PASSWORD
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        body["token"].as_str().unwrap().to_string()
    }

    /// Inserts a user row directly, for attempts that only serve as ranking peers.
    pub async fn insert_user(&self) -> i64 {
        let username = format!("peer_{}", &uuid::Uuid::new_v4().to_string()[..8]);
        sqlx::query_scalar("INSERT INTO users (username, password) VALUES ($1, 'x') RETURNING id")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn insert_attempt(&self, user_id: i64, quiz_id: i64, score: i64) {
        attempts::record(&self.pool, user_id, quiz_id, score)
            .await
            .expect("Failed to insert attempt");
    }

    pub async fn category(&self, name: &str) -> i64 {
        self.pool.create_category(name).await.unwrap().id
    }

    /// Seeds a quiz whose every question has one correct and one wrong choice.
    pub async fn seed_quiz(&self, category_id: i64, title: &str, questions: usize) -> SeededQuiz {
        let quiz = self
            .pool
            .create_quiz(&CreateQuizRequest {
                title: title.to_string(),
                category_id,
                level: Level::Easy,
            })
            .await
            .unwrap();

        let mut seeded = Vec::with_capacity(questions);
        for i in 0..questions {
            let created = self
                .pool
                .create_question(&CreateQuestionRequest {
                    quiz_id: quiz.id,
                    text: format!("{} question {}", title, i + 1),
                    choices: vec![
                        NewChoice {
                            text: "right".to_string(),
                            is_correct: true,
                        },
                        NewChoice {
                            text: "wrong".to_string(),
                            is_correct: false,
                        },
                    ],
                })
                .await
                .unwrap();

            seeded.push(SeededQuestion {
                id: created.question.id,
                correct: created.choices[0].id,
                wrong: created.choices[1].id,
            });
        }

        SeededQuiz {
            id: quiz.id,
            category_id,
            questions: seeded,
        }
    }

    pub async fn submit(
        &self,
        token: &str,
        quiz_id: i64,
        form: &[(String, String)],
    ) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/take_quiz/{}/", quiz_id)))
            .bearer_auth(token)
            .form(form)
            .send()
            .await
            .expect("Submit failed")
    }

    pub async fn get_json(&self, token: &str, path: &str) -> serde_json::Value {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200, "GET {} failed", path);
        response.json().await.unwrap()
    }

    pub async fn attempt_count(&self, quiz_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM quiz_results WHERE quiz_id = $1")
            .bind(quiz_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .expect("Missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}
