use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hostpress_core::errors::HostpressError;

#[derive(Debug)]
pub struct HostpressAxumError(pub anyhow::Error);

impl From<anyhow::Error> for HostpressAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<HostpressError> for HostpressAxumError {
    fn from(e: HostpressError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for HostpressAxumError {
    fn into_response(self) -> Response {
        // Keep the kind even if wrapped by anyhow contexts; anything else is a GeneralError.
        let safe = match HostpressError::find(&self.0) {
            Some(hp) => hp.sanitize_for_client(),
            None => HostpressError::normalize(self.0).sanitize_for_client(),
        };

        let status =
            StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                name = safe.name(),
                details = safe.details.as_deref().unwrap_or(""),
                "{}",
                safe.message
            );
        } else {
            tracing::debug!(status = status.as_u16(), name = safe.name(), "{}", safe.message);
        }

        (status, Json(safe.to_json())).into_response()
    }
}
