//! Send book recommendation digests through the WhatsApp Business Cloud API.
//!
//! The crate has a domain layer of strong types (phone numbers, message bodies,
//! the recommendation digest and its renderer), a transport layer for the Graph
//! API wire format, a client layer that posts messages and paces batches, and
//! a small axum server exposing the operator endpoints.
//!
//! ```rust,no_run
//! use whatsapp_recs::{Credentials, OutgoingMessage, WhatsAppClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), whatsapp_recs::WhatsAppError> {
//!     let client = WhatsAppClient::new(Credentials::new("EAAG...", "106540352242922")?)?;
//!     let message = OutgoingMessage::from_raw("+14155552671", "hello")?;
//!     let sent = client.send_text(&message).await?;
//!     println!("accepted as {:?}", sent.message_id);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
pub mod server;
mod transport;

pub use client::{
    BatchReport, Credentials, MessageOutcome, WhatsAppClient, WhatsAppClientBuilder, WhatsAppError,
};
pub use config::{Config, ConfigError};
pub use domain::{
    AccessToken, BookPick, DeliveryMode, LanguageCode, MessageBody, MonthPlan, OutgoingMessage,
    PhoneNumberId, ProviderError, RecipientPhone, RecommendationDigest, SendTemplate, SentMessage,
    SeriesRecommendation, TemplateName, ValidationError,
};
