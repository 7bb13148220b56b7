use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;

use super::Claims;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// The authenticated caller, loaded from storage.
///
/// Relies on `AuthMiddleware` having stored the token's `Claims` in request
/// extensions; resolution itself is delegated to [`super::AuthGate`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                AppError::InternalServerError("AppState is not registered".to_string())
            })?;
            let user = state.gate.current_user(claims.as_ref()).await?;
            Ok(CurrentUser(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::NewUser;
    use crate::repository::{MemoryRepository, UserRepository};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use std::sync::Arc;

    fn test_state(repo: Arc<MemoryRepository>) -> web::Data<AppState> {
        let config = Config {
            database_url: None,
            server_port: 0,
            server_host: "127.0.0.1".to_string(),
            jwt_secret: "extractor-secret".to_string(),
            jwt_expiration_ms: 60_000,
            bcrypt_cost: 4,
        };
        web::Data::new(AppState::new(repo, &config, "memory"))
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_success() {
        let repo = Arc::new(MemoryRepository::new());
        repo.create(NewUser {
            name: "Ada".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap();

        let req = test::TestRequest::default()
            .app_data(test_state(repo))
            .to_http_request();
        req.extensions_mut().insert(Claims {
            sub: "a@x.com".to_string(),
            iat: 0,
            exp: usize::MAX,
        });

        let mut payload = Payload::None;
        let CurrentUser(user) = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(user.email, "a@x.com");
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_without_claims() {
        let repo = Arc::new(MemoryRepository::new());
        let req = test::TestRequest::default()
            .app_data(test_state(repo))
            .to_http_request();

        let mut payload = Payload::None;
        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
