use thiserror::Error;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::Request;
use rocket::Response;
use rocket::http::ContentType;
use std::io::Cursor;
use serde_json::json;
use serde::Serialize;
use rocket_okapi::JsonSchema;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub enum AppError {
    #[error("Database unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Seat conflict: {0}")]
    SeatConflict(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Message suitable for showing to the person at the screen.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ConnectionUnavailable(_) => {
                "The booking service is unavailable right now, please try again later".to_string()
            }
            AppError::DatabaseError(_) => "Something went wrong while talking to the database".to_string(),
            AppError::SeatConflict(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg) => msg.clone(),
        }
    }
}

// Split sqlx errors into "could not reach the store" and everything else
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_) => AppError::ConnectionUnavailable(err.to_string()),
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

// Define a type alias for the result type
pub type AppResult<T> = Result<T, AppError>;

// Format all errors from the route level into a JSON HTTP response
#[rocket::async_trait]
impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let status = match self {
            AppError::ValidationError(_) => Status::BadRequest,
            AppError::BadRequest(_) => Status::BadRequest,
            AppError::AuthError(_) => Status::Unauthorized,
            AppError::Forbidden(_) => Status::Forbidden,
            AppError::NotFound(_) => Status::NotFound,
            AppError::Conflict(_) => Status::Conflict,
            AppError::SeatConflict(_) => Status::Conflict,
            AppError::ConnectionUnavailable(_) => Status::ServiceUnavailable,
            AppError::DatabaseError(_) => Status::InternalServerError,
        };

        let json = json!({
            "error": self.user_message()
        });

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(None, Cursor::new(json.to_string()))
            .ok()
    }
}
