use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::EngineError;

use api_types::ErrorResponse;
pub use server::{SESSION_COOKIE, run_with_listener, spawn_with_listener};

mod accounts;
mod budgets;
mod categories;
mod mapping;
mod months;
mod payees;
mod server;
mod transactions;
mod user;

pub enum ServerError {
    Engine(EngineError),
    /// The request body could not be read as JSON of the expected shape.
    Unprocessable(String),
}

const INTERNAL_ERROR: &str = "Internal error";

fn status_for_engine_error(err: &EngineError) -> (StatusCode, &'static str) {
    match err {
        EngineError::Invalid(_) | EngineError::InvalidAmount(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "invalid")
        }
        EngineError::KeyNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        EngineError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
        EngineError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
        EngineError::Hashing(_) | EngineError::Database(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal")
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            INTERNAL_ERROR.to_string()
        }
        EngineError::Hashing(hash_err) => {
            tracing::error!("password hashing error: {hash_err}");
            INTERNAL_ERROR.to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self {
            ServerError::Engine(err) => {
                let (status, code) = status_for_engine_error(&err);
                (status, code, message_for_engine_error(err))
            }
            ServerError::Unprocessable(err) => (StatusCode::BAD_REQUEST, "unprocessable", err),
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Unprocessable(value.body_text())
    }
}
