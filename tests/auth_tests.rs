// tests/auth_tests.rs

mod common;

use appquiz::error::{is_unique_violation, is_unique_violation_on};
use common::{spawn_app, spawn_app_on_disk};

fn signup_body(username: &str, email: &str, password1: &str, confirm: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "email": email,
        "password1": password1,
        "confirm_password": confirm
    })
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn unmatched_paths_near_protected_routes_are_404_not_401() {
    let app = spawn_app().await;

    for path in ["/quiz_result/1/", "/take_quiz/", "/profile/extra/", "/admin/nope/"] {
        let response = app.client.get(app.url(path)).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 404, "GET {}", path);
    }

    // Matched protected routes still demand a token
    let response = app.client.get(app.url("/profile/")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
    let response = app.client.get(app.url("/admin/dashboard/")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn signup_logs_the_user_in() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/signup/"))
        .json(&signup_body("newcomer", "newcomer@example.com", "password123", "password123"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["username"], "newcomer");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password").is_none());

    let token = body["token"].as_str().unwrap();
    let profile = app.get_json(token, "/profile/").await;
    assert_eq!(profile["username"], "newcomer");
}

#[tokio::test]
async fn signup_rejects_mismatched_passwords() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/signup/"))
        .json(&signup_body("mismatch", "mismatch@example.com", "password123", "password321"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Passwords do not match");
}

#[tokio::test]
async fn signup_rejects_email_in_use() {
    let app = spawn_app().await;

    let first = app
        .client
        .post(app.url("/signup/"))
        .json(&signup_body("first", "shared@example.com", "password123", "password123"))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = app
        .client
        .post(app.url("/signup/"))
        .json(&signup_body("second", "shared@example.com", "password123", "password123"))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 400);
    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(body["error"], "Email is already in use");
}

#[tokio::test]
async fn signup_rejects_taken_username_and_bad_input() {
    let app = spawn_app().await;

    let first = app
        .client
        .post(app.url("/signup/"))
        .json(&signup_body("taken", "taken1@example.com", "password123", "password123"))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let duplicate = app
        .client
        .post(app.url("/signup/"))
        .json(&signup_body("taken", "taken2@example.com", "password123", "password123"))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status().as_u16(), 409);

    let short_name = app
        .client
        .post(app.url("/signup/"))
        .json(&signup_body("yo", "yo@example.com", "password123", "password123"))
        .send()
        .await
        .unwrap();
    assert_eq!(short_name.status().as_u16(), 400);

    let bad_email = app
        .client
        .post(app.url("/signup/"))
        .json(&signup_body("bademail", "not-an-email", "password123", "password123"))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_email.status().as_u16(), 400);
}

#[tokio::test]
async fn login_and_logout() {
    let app = spawn_app().await;
    let member = app.new_member().await;

    let wrong = app
        .client
        .post(app.url("/login/"))
        .json(&serde_json::json!({"username": member.username, "password": "nope"}))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status().as_u16(), 401);

    let unknown = app
        .client
        .post(app.url("/login/"))
        .json(&serde_json::json!({"username": "ghost", "password": "password123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 401);

    let login: serde_json::Value = app
        .client
        .post(app.url("/login/"))
        .json(&serde_json::json!({"username": member.username, "password": "password123"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(login["type"], "Bearer");
    let token = login["token"].as_str().unwrap();

    let logout = app
        .client
        .post(app.url("/logout/"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status().as_u16(), 200);
    let body: serde_json::Value = logout.json().await.unwrap();
    assert_eq!(body["message"], "Logged out successfully");
}

#[tokio::test]
async fn unique_violations_name_the_offending_column() {
    let app = spawn_app().await;

    sqlx::query("INSERT INTO users (username, email, password) VALUES ('ada', 'ada@example.com', 'x')")
        .execute(&app.pool)
        .await
        .unwrap();

    let same_email = sqlx::query(
        "INSERT INTO users (username, email, password) VALUES ('other', 'ada@example.com', 'x')",
    )
    .execute(&app.pool)
    .await
    .unwrap_err();
    assert!(is_unique_violation_on(&same_email, "users.email"));
    assert!(!is_unique_violation_on(&same_email, "users.username"));

    let same_name = sqlx::query(
        "INSERT INTO users (username, email, password) VALUES ('ada', 'new@example.com', 'x')",
    )
    .execute(&app.pool)
    .await
    .unwrap_err();
    assert!(is_unique_violation(&same_name));
    assert!(!is_unique_violation_on(&same_name, "users.email"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_signups_with_one_email_report_email_in_use() {
    let app = spawn_app_on_disk().await;

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let client = app.client.clone();
            let url = app.url("/signup/");
            let body = signup_body(&format!("racer{}", i), "race@example.com", "password123", "password123");

            tokio::spawn(async move { client.post(url).json(&body).send().await.unwrap() })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let response = handle.await.unwrap();
        match response.status().as_u16() {
            201 => created += 1,
            400 => {
                let body: serde_json::Value = response.json().await.unwrap();
                assert_eq!(body["error"], "Email is already in use");
            }
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(created, 1);
}
