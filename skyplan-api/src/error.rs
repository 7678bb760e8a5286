use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skyplan_checkout::{CheckoutError, PayloadError};
use skyplan_core::{BackendError, CoreError};

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    Anyhow(anyhow::Error),
}

fn checkout_status(err: &CheckoutError) -> (StatusCode, Option<&'static str>) {
    match err {
        CheckoutError::Payload(PayloadError::MissingPrerequisite(p)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Some(p.as_str()))
        }
        CheckoutError::NoActiveBooking => (StatusCode::NOT_FOUND, None),
        CheckoutError::NotCancellable { .. } => (StatusCode::CONFLICT, None),
        CheckoutError::Core(_) => (StatusCode::BAD_REQUEST, None),
        CheckoutError::Backend(e) => (backend_status(e), None),
    }
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::Unauthorized => StatusCode::UNAUTHORIZED,
        BackendError::Rejected { .. } => StatusCode::CONFLICT,
        BackendError::Unreachable(_) | BackendError::Decode(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, missing) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Anyhow(err) => {
                if let Some(e) = err.downcast_ref::<CheckoutError>() {
                    let (status, missing) = checkout_status(e);
                    if status.is_server_error() {
                        tracing::warn!("Checkout backend failure: {}", e);
                    }
                    (status, e.to_string(), missing)
                } else if let Some(e) = err.downcast_ref::<CoreError>() {
                    (StatusCode::BAD_REQUEST, e.to_string(), None)
                } else {
                    tracing::error!("Internal Server Error: {}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
                }
            }
        };

        let body = match missing {
            Some(slot) => Json(json!({ "error": error_message, "missing": slot })),
            None => Json(json!({ "error": error_message })),
        };

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
