//! HTTP request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, AppState};
use crate::client::{BatchReport, WhatsAppError};
use crate::domain::{
    BookPick, DeliveryMode, MonthPlan, RecommendationDigest, SendTemplate, SeriesRecommendation,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/send-recommendations/whatsapp",
            post(send_recommendations),
        )
        .route("/test-whatsapp", post(test_whatsapp))
}

/// Body of `POST /send-recommendations/whatsapp`. All five content fields are required.
#[derive(Debug, Clone, Deserialize)]
pub struct SendRecommendationsRequest {
    pub phone: String,
    pub name: String,
    pub recommendations: Vec<SeriesRecommendation>,
    pub current: Vec<BookPick>,
    pub future: Vec<MonthPlan>,
    /// Send the digest as several packed messages instead of one cut body.
    #[serde(default)]
    pub split: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestWhatsAppRequest {
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageReport {
    pub message_number: usize,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendReport {
    pub message: String,
    pub recipient_phone: String,
    pub total_messages: usize,
    pub successful_messages: usize,
    pub message_responses: Vec<MessageReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendReport {
    fn from_batch(recipient_phone: String, report: &BatchReport) -> Self {
        let message_responses = report
            .outcomes
            .iter()
            .enumerate()
            .map(|(idx, outcome)| match &outcome.result {
                Ok(sent) => MessageReport {
                    message_number: idx + 1,
                    status: "sent",
                    message_id: sent.message_id.clone(),
                    error_code: None,
                    error: None,
                },
                Err(err) => MessageReport {
                    message_number: idx + 1,
                    status: "failed",
                    message_id: None,
                    error_code: match err {
                        WhatsAppError::HttpStatus { status, .. } => Some(*status),
                        _ => None,
                    },
                    error: Some(diagnostic(err)),
                },
            })
            .collect();

        Self {
            message: format!(
                "Successfully sent {} out of {} messages",
                report.successful(),
                report.total()
            ),
            recipient_phone,
            total_messages: report.total(),
            successful_messages: report.successful(),
            message_responses,
            error: report.first_error().map(diagnostic),
        }
    }
}

/// Error text including the provider body, for display to operators.
fn diagnostic(err: &WhatsAppError) -> String {
    match err {
        WhatsAppError::HttpStatus {
            status,
            body: Some(body),
            ..
        } => format!("{status} - {body}"),
        other => other.to_string(),
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn send_recommendations(
    State(state): State<AppState>,
    payload: Result<Json<SendRecommendationsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SendReport>), ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let to = state.config.recipient(&request.phone)?;
    let mode = if request.split {
        DeliveryMode::Split
    } else {
        DeliveryMode::Single
    };
    let digest = RecommendationDigest::new(
        request.name,
        request.recommendations,
        request.current,
        request.future,
    );

    info!(to = %to, ?mode, "sending recommendations over WhatsApp");
    let batch = state.client.send_recommendations(to.clone(), &digest, mode).await?;
    let report = SendReport::from_batch(to.to_string(), &batch);

    let status = if batch.all_sent() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(report)))
}

async fn test_whatsapp(
    State(state): State<AppState>,
    payload: Result<Json<TestWhatsAppRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let phone = request
        .phone
        .filter(|phone| !phone.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Phone number is required".to_owned()))?;

    let to = state.config.recipient(&phone)?;
    let sent = state
        .client
        .send_template(&SendTemplate::hello_world(to.clone()))
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Hello world template sent successfully",
        "recipient_phone": to.as_str(),
        "message_id": sent.message_id,
        "wa_id": sent.wa_id,
    })))
}
