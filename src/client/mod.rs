//! Client layer: orchestrates transport calls, pacing, and maps transport ↔ domain.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{
    AccessToken, DeliveryMode, MessageBody, OutgoingMessage, PhoneNumberId, ProviderError,
    RecipientPhone, RecommendationDigest, SendTemplate, SentMessage, ValidationError,
};

pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v22.0";
/// Pause between two consecutive sends of one batch.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(1);

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        bearer: &'a str,
        body: Value,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        bearer: &'a str,
        body: Value,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .bearer_auth(bearer)
                .json(&body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// Provider credentials: the bearer token and the sending phone-number id.
///
/// Loaded once at startup and shared read-only afterwards.
pub struct Credentials {
    access_token: AccessToken,
    phone_number_id: PhoneNumberId,
}

impl Credentials {
    /// Validate both parts; either one being blank is an error.
    pub fn new(
        access_token: impl Into<String>,
        phone_number_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            access_token: AccessToken::new(access_token)?,
            phone_number_id: PhoneNumberId::new(phone_number_id)?,
        })
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn phone_number_id(&self) -> &PhoneNumberId {
        &self.phone_number_id
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`WhatsAppClient`].
///
/// This error preserves:
/// - HTTP-level failures (non-2xx status or transport failures),
/// - the Graph API error object when the provider sent one,
/// - validation/parse failures.
pub enum WhatsAppError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the provider.
    #[error("provider rejected the request with HTTP {status}")]
    HttpStatus {
        status: u16,
        body: Option<String>,
        provider: Option<ProviderError>,
    },

    /// A 2xx response body could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// The configured base URL does not form a valid endpoint.
    #[error("invalid endpoint {url}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl WhatsAppError {
    /// `true` for failures that happened on the way to or at the provider.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HttpStatus { .. })
    }
}

#[derive(Debug)]
/// Outcome of one message of a batch.
pub struct MessageOutcome {
    pub to: RecipientPhone,
    pub result: Result<SentMessage, WhatsAppError>,
}

#[derive(Debug, Default)]
/// Per-message outcomes of [`WhatsAppClient::send_batch`], in send order.
pub struct BatchReport {
    pub outcomes: Vec<MessageOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn all_sent(&self) -> bool {
        self.successful() == self.total()
    }

    pub fn first_error(&self) -> Option<&WhatsAppError> {
        self.outcomes.iter().find_map(|o| o.result.as_ref().err())
    }
}

#[derive(Debug, Clone)]
/// Builder for [`WhatsAppClient`].
///
/// Use this when you need to customize the endpoint, API version, timeout,
/// user-agent, or the pause between batched sends.
pub struct WhatsAppClientBuilder {
    credentials: Credentials,
    base_url: String,
    api_version: String,
    send_delay: Duration,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl WhatsAppClientBuilder {
    /// Create a builder with the default endpoint and no timeout/user-agent override.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            send_delay: DEFAULT_SEND_DELAY,
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the Graph API base URL (scheme and host, optionally a path prefix).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the Graph API version path segment, e.g. `v22.0`.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Override the pause between two consecutive sends of a batch.
    pub fn send_delay(mut self, send_delay: Duration) -> Self {
        self.send_delay = send_delay;
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`WhatsAppClient`].
    pub fn build(self) -> Result<WhatsAppClient, WhatsAppError> {
        let messages_url = messages_url(
            &self.base_url,
            &self.api_version,
            self.credentials.phone_number_id(),
        )?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| WhatsAppError::Transport(Box::new(err)))?;

        Ok(WhatsAppClient {
            credentials: self.credentials,
            messages_url,
            send_delay: self.send_delay,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

fn messages_url(
    base_url: &str,
    api_version: &str,
    phone_number_id: &PhoneNumberId,
) -> Result<String, WhatsAppError> {
    let raw = format!(
        "{}/{}/{}/messages",
        base_url.trim_end_matches('/'),
        api_version.trim_matches('/'),
        phone_number_id.as_str()
    );
    let url = url::Url::parse(&raw).map_err(|source| WhatsAppError::InvalidEndpoint {
        url: raw.clone(),
        source,
    })?;
    Ok(url.into())
}

#[derive(Clone)]
/// High-level WhatsApp Business Cloud API client.
///
/// Every send is one `POST {base}/{version}/{phone_number_id}/messages` with
/// the bearer token. Nothing is retried; batches are paced by a fixed delay.
pub struct WhatsAppClient {
    credentials: Credentials,
    messages_url: String,
    send_delay: Duration,
    http: Arc<dyn HttpTransport>,
}

impl WhatsAppClient {
    /// Create a client using the default endpoint and API version.
    ///
    /// For more customization, use [`WhatsAppClient::builder`].
    pub fn new(credentials: Credentials) -> Result<Self, WhatsAppError> {
        WhatsAppClientBuilder::new(credentials).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> WhatsAppClientBuilder {
        WhatsAppClientBuilder::new(credentials)
    }

    /// Full URL messages are posted to.
    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    /// Pause applied between two consecutive sends of a batch.
    pub fn send_delay(&self) -> Duration {
        self.send_delay
    }

    /// Send one text message.
    ///
    /// Errors:
    /// - [`WhatsAppError::HttpStatus`] for non-2xx responses, with the provider body,
    /// - [`WhatsAppError::Transport`] when the request never got a response,
    /// - [`WhatsAppError::Parse`] when a 2xx body does not acknowledge a message.
    pub async fn send_text(&self, message: &OutgoingMessage) -> Result<SentMessage, WhatsAppError> {
        debug!(
            to = %message.to(),
            chars = message.body().char_len(),
            "sending WhatsApp text message"
        );
        self.post(crate::transport::encode_text_message(message))
            .await
    }

    /// Send an approved template message.
    pub async fn send_template(&self, request: &SendTemplate) -> Result<SentMessage, WhatsAppError> {
        debug!(
            to = %request.to(),
            template = request.name().as_str(),
            "sending WhatsApp template message"
        );
        self.post(crate::transport::encode_template_message(request))
            .await
    }

    /// Send messages one at a time in list order, pausing between sends.
    ///
    /// A failed message does not stop the batch; every message gets an outcome.
    pub async fn send_batch(&self, messages: Vec<OutgoingMessage>) -> BatchReport {
        let total = messages.len();
        let mut report = BatchReport {
            outcomes: Vec::with_capacity(total),
        };

        for (idx, message) in messages.into_iter().enumerate() {
            let result = self.send_text(&message).await;
            if let Err(err) = &result {
                warn!(
                    to = %message.to(),
                    message_number = idx + 1,
                    error = %err,
                    "WhatsApp message was not accepted"
                );
            }
            report.outcomes.push(MessageOutcome {
                to: message.to().clone(),
                result,
            });

            if idx + 1 < total {
                tokio::time::sleep(self.send_delay).await;
            }
        }

        info!(
            successful = report.successful(),
            total = report.total(),
            "WhatsApp batch finished"
        );
        report
    }

    /// Render a recommendation digest and send it to one recipient.
    pub async fn send_recommendations(
        &self,
        to: RecipientPhone,
        digest: &RecommendationDigest,
        mode: DeliveryMode,
    ) -> Result<BatchReport, WhatsAppError> {
        let bodies = match mode {
            DeliveryMode::Single => vec![digest.render()],
            DeliveryMode::Split => digest.render_parts(),
        };

        let messages = bodies
            .into_iter()
            .map(|body| MessageBody::new(body).map(|body| OutgoingMessage::new(to.clone(), body)))
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(self.send_batch(messages).await)
    }

    async fn post(&self, payload: Value) -> Result<SentMessage, WhatsAppError> {
        let response = self
            .http
            .post_json(
                &self.messages_url,
                self.credentials.access_token().as_str(),
                payload,
            )
            .await
            .map_err(WhatsAppError::Transport)?;

        if !(200..=299).contains(&response.status) {
            let provider = crate::transport::decode_error_response(&response.body);
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(WhatsAppError::HttpStatus {
                status: response.status,
                body,
                provider,
            });
        }

        crate::transport::decode_send_response(&response.body)
            .map_err(|err| WhatsAppError::Parse(Box::new(err)))
    }
}
