use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

/// Health check endpoint
///
/// Returns the current status of the API, the active storage backend and a timestamp.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "storage": state.storage,
        "timestamp": Utc::now()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::repository::MemoryRepository;
    use actix_web::test;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_health_endpoint() {
        let config = Config {
            database_url: None,
            server_port: 0,
            server_host: "127.0.0.1".to_string(),
            jwt_secret: "health-secret".to_string(),
            jwt_expiration_ms: 60_000,
            bcrypt_cost: 4,
        };
        let state = AppState::new(Arc::new(MemoryRepository::new()), &config, "memory");
        let app = test::init_service(
            actix_web::App::new()
                .app_data(web::Data::new(state))
                .service(health),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["storage"], "memory");
        assert!(json["timestamp"].is_string());
    }
}
