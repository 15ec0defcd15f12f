// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, api, auth, catalog, profile, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public: account endpoints, catalog browsing, read-only API.
/// * Authenticated: quiz taking, results, profile, logout.
/// * Admin: catalog authoring under `/admin`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            header::HeaderValue::from_static("http://localhost:3000"),
            header::HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/signup/", post(auth::signup))
        .route("/login/", post(auth::login))
        .route("/categories/", get(catalog::list_categories))
        .route("/quizzes/{category_id}/", get(catalog::list_quizzes))
        .route("/api/quizzes/", get(api::list_quizzes))
        .route("/api/questions/", get(api::list_questions));

    let member_routes = Router::new()
        .route("/logout/", post(auth::logout))
        .route(
            "/take_quiz/{quiz_id}/",
            get(quiz::take_quiz_form).post(quiz::submit_quiz),
        )
        .route("/quiz_result/{quiz_id}/{score}/", get(quiz::quiz_result))
        .route("/profile/", get(profile::get_profile))
        // route_layer: unmatched paths fall through to a plain 404
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/dashboard/", get(admin::dashboard))
        .route("/categories/", post(admin::create_category))
        .route(
            "/categories/{id}/",
            put(admin::rename_category).delete(admin::delete_category),
        )
        .route("/quizzes/", post(admin::create_quiz))
        .route(
            "/quizzes/{id}/",
            put(admin::update_quiz).delete(admin::delete_quiz),
        )
        .route("/quizzes/{id}/duplicate/", post(admin::duplicate_quiz))
        .route("/questions/", post(admin::create_question))
        .route(
            "/questions/{id}/",
            put(admin::update_question).delete(admin::delete_question),
        )
        .route("/questions/{id}/choices/", post(admin::add_choice))
        .route(
            "/choices/{id}/",
            put(admin::update_choice).delete(admin::delete_choice),
        )
        // Auth runs first (outermost), then the role check
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(member_routes)
        .nest("/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
