//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every domain failure (missing record, duplicate name, bad credentials, invalid input)
//! is expressed as one of its variants, and each variant maps to exactly one HTTP status.
//!
//! `AppError` implements `actix_web::error::ResponseError`, producing the JSON body
//! `{timestamp, status, error, message, path, validationErrors?}`. The `path` field is
//! only known once the response travels back through the app, so it is filled in by the
//! [`error_handlers`] middleware, which also gives framework-generated errors (unknown
//! routes, malformed JSON) the same shape.

use actix_web::{
    body::EitherBody,
    dev::ServiceResponse,
    error::ResponseError,
    http::{
        header::{self, HeaderValue},
        StatusCode,
    },
    middleware::{ErrorHandlerResponse, ErrorHandlers},
    HttpResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::ValidationErrors;

const GENERIC_SERVER_MESSAGE: &str = "An unexpected error occurred";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// No authenticated principal, or bad credentials / token (HTTP 401).
    Unauthorized(String),
    /// An argument failed a business rule, e.g. a blank name (HTTP 400).
    BadRequest(String),
    /// The requested resource does not exist or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// A uniqueness rule was violated: duplicate email or list name (HTTP 409).
    Conflict(String),
    /// Unexpected server-side failure (HTTP 500). The message is logged, never returned.
    InternalServerError(String),
    /// Failure reported by the storage layer (HTTP 500).
    DatabaseError(String),
    /// Request payload failed field validation (HTTP 400), keyed by field name.
    ValidationError(BTreeMap<String, String>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(fields) => {
                write!(f, "Validation Error: ")?;
                let mut first = true;
                for (field, msg) in fields {
                    if !first {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}: {}", field, msg)?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for AppError {}

/// JSON body returned for every error response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<BTreeMap<String, String>>,
}

impl ErrorBody {
    fn new(status: StatusCode, error: &str, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: error.to_string(),
            message: message.into(),
            path: String::new(),
            validation_errors: None,
        }
    }

    fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }
}

impl AppError {
    /// Short label used in the `error` field of the response body.
    fn label(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::BadRequest(_) => "Bad Request",
            AppError::NotFound(_) => "Not Found",
            AppError::Conflict(_) => "Conflict",
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                "Internal Server Error"
            }
            AppError::ValidationError(_) => "Validation Failed",
        }
    }

    /// Builds the response body. Server-side details never leave the process.
    pub fn body(&self) -> ErrorBody {
        let status = self.status_code();
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => ErrorBody::new(status, self.label(), msg.as_str()),
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                ErrorBody::new(status, self.label(), GENERIC_SERVER_MESSAGE)
            }
            AppError::ValidationError(fields) => {
                let mut body = ErrorBody::new(status, self.label(), "Invalid input parameters");
                body.validation_errors = Some(fields.clone());
                body
            }
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::InternalServerError(_) | AppError::DatabaseError(_) = self {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

/// Middleware that stamps the request path onto every 4xx/5xx body.
///
/// Responses produced from an `AppError` keep their message. Other client
/// errors (unmatched route, malformed JSON) carry the framework's text, while
/// any other server error is reduced to the generic message.
pub fn error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().default_handler(render_error_body)
}

fn render_error_body<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let path = res.request().path().to_string();
    let status = res.status();

    let body = match res.response().error().and_then(|e| e.as_error::<AppError>()) {
        Some(app_err) => app_err.body(),
        None => {
            let reason = status.canonical_reason().unwrap_or("Error");
            let message = match res.response().error() {
                Some(e) if status.is_server_error() => {
                    log::error!("{}", e);
                    GENERIC_SERVER_MESSAGE.to_string()
                }
                Some(e) => e.to_string(),
                None => reason.to_string(),
            };
            ErrorBody::new(status, reason, message)
        }
    }
    .with_path(&path);

    let json = serde_json::to_string(&body)?;
    let (req, res) = res.into_parts();
    let res = res.set_body(json).map_into_boxed_body();
    let mut res: ServiceResponse<EitherBody<B>> =
        ServiceResponse::new(req, res).map_into_right_body();
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Ok(ErrorHandlerResponse::Response(res))
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, a unique-constraint violation becomes `Conflict`,
/// and everything else is a `DatabaseError`. Repositories that know which constraint
/// they hit map the violation themselves to produce a more specific message.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Resource already exists".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into a per-field message map.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let fields = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|err| {
                    let msg = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    (field.to_string(), msg)
                })
            })
            .collect();
        AppError::ValidationError(fields)
    }
}

/// JWT processing failures are reported uniformly; the cause is only logged.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("Rejected token: {}", error);
        AppError::Unauthorized("Invalid or expired token".into())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};
    use validator::Validate;

    #[::core::prelude::v1::test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::BadRequest("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Resource not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::Conflict("Duplicate".into());
        assert_eq!(error.error_response().status(), 409);

        let error = AppError::InternalServerError("Server error".into());
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::DatabaseError("connection reset".into());
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::ValidationError(BTreeMap::new());
        assert_eq!(error.error_response().status(), 400);
    }

    #[::core::prelude::v1::test]
    fn test_server_errors_hide_details() {
        let body = AppError::DatabaseError("relation \"tasks\" does not exist".into()).body();
        assert_eq!(body.message, GENERIC_SERVER_MESSAGE);
        assert_eq!(body.status, 500);
        assert!(body.validation_errors.is_none());
    }

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[::core::prelude::v1::test]
    fn test_validation_errors_are_collected_per_field() {
        let signup = Signup {
            name: "ab".into(),
            email: "nope".into(),
        };
        let err: AppError = signup.validate().unwrap_err().into();
        match err {
            AppError::ValidationError(fields) => {
                assert_eq!(fields.get("name").map(String::as_str), Some("too short"));
                assert_eq!(fields.get("email").map(String::as_str), Some("email"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[::core::prelude::v1::test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_rt::test]
    async fn test_foreign_server_errors_are_generic() {
        let app = test::init_service(
            App::new().wrap(error_handlers()).route(
                "/boom",
                web::get().to(|| async {
                    Err::<HttpResponse, _>(actix_web::error::ErrorInternalServerError(
                        "connection string postgres://admin:hunter2@db",
                    ))
                }),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/boom").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.message, GENERIC_SERVER_MESSAGE);
        assert_eq!(body.error, "Internal Server Error");
        assert_eq!(body.path, "/boom");
    }
}
