use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use greenline_core::ReservationError;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    Domain(ReservationError),
    Internal(anyhow::Error),
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            ApiError::Domain(err) => {
                let status = match &err {
                    ReservationError::NotFound(_) => StatusCode::NOT_FOUND,
                    ReservationError::InvalidSeat { .. } | ReservationError::Validation(_) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    ReservationError::SeatUnavailable { .. }
                    | ReservationError::InvalidState { .. } => StatusCode::CONFLICT,
                    ReservationError::ReservationExpired(_) => StatusCode::GONE,
                    ReservationError::PaymentFailed(_) => StatusCode::PAYMENT_REQUIRED,
                    ReservationError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                let mut body = json!({ "error": err.to_string() });
                if let ReservationError::InvalidSeat { labels }
                | ReservationError::SeatUnavailable { labels } = &err
                {
                    body["seats"] = json!(labels);
                }
                (status, body)
            }
            ApiError::Internal(err) => {
                tracing::error!("internal server error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
