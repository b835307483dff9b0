use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::error::EngineError;

/// Error unificado para la superficie HTTP/gRPC del motor.
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self.0 {
            EngineError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            EngineError::WalletNotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            EngineError::GroupNotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            EngineError::InsufficientFunds(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            EngineError::State(_) => (StatusCode::CONFLICT, self.0.to_string()),
            EngineError::ZeroSum(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string()),
            EngineError::Integrity(ref msg) => {
                tracing::error!("Integrity violation: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "integrity violation".to_string())
            }
            EngineError::Transient(ref e) => {
                tracing::error!("Transient store error: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "temporarily unavailable".to_string())
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ApiError> for tonic::Status {
    fn from(err: ApiError) -> Self {
        match err.0 {
            EngineError::Validation(msg) => tonic::Status::invalid_argument(msg),
            EngineError::WalletNotFound(id) => tonic::Status::not_found(format!("wallet {id} not found")),
            EngineError::GroupNotFound(id) => tonic::Status::not_found(format!("group {id} not found")),
            EngineError::InsufficientFunds(id) => {
                tonic::Status::failed_precondition(format!("insufficient funds on wallet {id}"))
            }
            EngineError::State(msg) => tonic::Status::failed_precondition(msg),
            EngineError::ZeroSum(id) => tonic::Status::failed_precondition(format!("group {id} does not balance")),
            EngineError::Integrity(msg) => {
                tracing::error!("Integrity violation: {}", msg);
                tonic::Status::internal("integrity violation")
            }
            EngineError::Transient(e) => {
                tracing::error!("Transient store error: {}", e);
                tonic::Status::unavailable("temporarily unavailable")
            }
        }
    }
}
