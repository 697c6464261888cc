use crate::utils::error::AppError;
use rocket_okapi::okapi::openapi3::{Response, Responses, MediaType};
use rocket_okapi::response::OpenApiResponderInner;
use rocket_okapi::gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::RefOr;
use okapi::openapi3::SchemaObject;
use okapi::Map;
use serde_json::json;
use rocket::http::Status;

impl OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let mut responses = Responses::default();

        // One documented example per status the API can answer with
        let error_responses = [
            (Status::BadRequest, "Bad Request", AppError::ValidationError("Select at least one seat".to_string())),
            (Status::Unauthorized, "Unauthorized", AppError::AuthError("Invalid credentials".to_string())),
            (Status::Forbidden, "Forbidden", AppError::Forbidden("Administrator access required".to_string())),
            (Status::NotFound, "NotFound", AppError::NotFound("Showtime not found".to_string())),
            (Status::Conflict, "Conflict", AppError::SeatConflict("Seat F7 has just been taken by someone else".to_string())),
            (Status::ServiceUnavailable, "ServiceUnavailable", AppError::ConnectionUnavailable("pool timed out".to_string())),
            (Status::InternalServerError, "InternalServerError", AppError::DatabaseError("Internal ServerError".to_string())),
        ];

        for (status, description, error) in error_responses {
            responses.responses.insert(
                status.code.to_string(),
                RefOr::Object(Response {
                    description: description.to_string(),
                    content: {
                        let mut content = Map::new();
                        content.insert(
                            "application/json".to_string(),
                            MediaType {
                                schema: Some(SchemaObject::default()),
                                example: Some(json!({
                                    "error": error.user_message()
                                })),
                                ..Default::default()
                            },
                        );
                        content
                    },
                    ..Default::default()
                }),
            );
        }

        Ok(responses)
    }
}