use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::client::WhatsAppError;
use crate::domain::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    WhatsApp(#[from] WhatsAppError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::WhatsApp(WhatsAppError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::WhatsApp(err) if err.is_transport() => StatusCode::BAD_GATEWAY,
            Self::WhatsApp(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({ "error": self.to_string() });

        if let Self::WhatsApp(WhatsAppError::HttpStatus {
            status: provider_status,
            body: provider_body,
            provider,
        }) = &self
        {
            body["provider_status"] = json!(provider_status);
            body["provider_body"] = json!(provider_body);
            if let Some(provider) = provider {
                body["provider_error"] = json!({
                    "message": provider.message,
                    "type": provider.kind,
                    "code": provider.code,
                    "fbtrace_id": provider.fbtrace_id,
                });
            }
        }

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}
