#![allow(dead_code)]

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;
use tasklist_api::auth::{AuthMiddleware, AuthResponse};
use tasklist_api::config::Config;
use tasklist_api::error::error_handlers;
use tasklist_api::repository::MemoryRepository;
use tasklist_api::routes::{self, health};
use tasklist_api::AppState;

pub const PASSWORD: &str = "Password123!";

pub fn test_config() -> Config {
    Config {
        database_url: None,
        server_port: 0,
        server_host: "127.0.0.1".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expiration_ms: 60 * 60 * 1000,
        bcrypt_cost: 4,
    }
}

pub fn memory_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(MemoryRepository::new()),
        &test_config(),
        "memory",
    ))
}

/// Builds the same application as `main`, backed by a fresh in-memory store.
pub async fn init_app() -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    init_app_with(memory_state()).await
}

/// Builds the same application as `main` around an existing state.
pub async fn init_app_with(
    state: web::Data<AppState>,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(state)
            .app_data(routes::json_config())
            .app_data(routes::path_config())
            .wrap(error_handlers())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            ),
    )
    .await
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Registers `email`, logs in and returns the access token.
pub async fn register_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "name": "Test User", "email": email, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", email);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login of {} failed", email);

    let auth: AuthResponse = test::read_body_json(resp).await;
    auth.access_token
}

/// Sends an authenticated request and returns the status with the parsed body
/// (`Value::Null` for empty bodies).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: test::TestRequest,
    token: &str,
) -> (u16, Value) {
    let resp = test::call_service(app, req.insert_header(bearer(token)).to_request()).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}
