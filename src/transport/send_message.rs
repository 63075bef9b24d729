use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::{OutgoingMessage, ProviderError, SendTemplate, SentMessage};

const MESSAGING_PRODUCT: &str = "whatsapp";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response does not acknowledge any message")]
    MissingMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct SendJsonResponse {
    #[serde(default)]
    contacts: Vec<ContactJson>,
    #[serde(default)]
    messages: Vec<MessageJson>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContactJson {
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    wa_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageJson {
    id: String,
    #[serde(default)]
    message_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope {
    error: ErrorJson,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorJson {
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    error_subcode: Option<i64>,
    #[serde(default)]
    fbtrace_id: Option<String>,
}

pub fn encode_text_message(message: &OutgoingMessage) -> Value {
    json!({
        "messaging_product": MESSAGING_PRODUCT,
        "recipient_type": "individual",
        "to": message.to().as_str(),
        "type": "text",
        "text": {
            "preview_url": false,
            "body": message.body().as_str(),
        },
    })
}

pub fn encode_template_message(request: &SendTemplate) -> Value {
    json!({
        "messaging_product": MESSAGING_PRODUCT,
        "to": request.to().as_str(),
        "type": "template",
        "template": {
            "name": request.name().as_str(),
            "language": { "code": request.language().as_str() },
        },
    })
}

pub fn decode_send_response(json: &str) -> Result<SentMessage, TransportError> {
    let parsed: SendJsonResponse = serde_json::from_str(json)?;
    let message = parsed
        .messages
        .into_iter()
        .next()
        .ok_or(TransportError::MissingMessage)?;
    let contact = parsed.contacts.into_iter().next();

    Ok(SentMessage {
        message_id: Some(message.id),
        message_status: message.message_status,
        wa_id: contact.as_ref().and_then(|c| c.wa_id.clone()),
        input: contact.and_then(|c| c.input),
    })
}

/// Decode a Graph API error envelope; `None` when the body is not one.
pub fn decode_error_response(body: &str) -> Option<ProviderError> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let error = envelope.error;
    Some(ProviderError {
        message: error.message,
        kind: error.kind,
        code: error.code,
        error_subcode: error.error_subcode,
        fbtrace_id: error.fbtrace_id,
    })
}

#[cfg(test)]
mod tests {
    use crate::domain::{OutgoingMessage, RecipientPhone, SendTemplate};

    use super::*;

    #[test]
    fn encode_text_message_payload() {
        let msg = OutgoingMessage::from_raw("+14155552671", "hello").unwrap();
        let payload = encode_text_message(&msg);

        assert_eq!(
            payload,
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "14155552671",
                "type": "text",
                "text": { "preview_url": false, "body": "hello" },
            })
        );
    }

    #[test]
    fn encode_template_message_payload() {
        let to = RecipientPhone::new("14155552671").unwrap();
        let payload = encode_template_message(&SendTemplate::hello_world(to));

        assert_eq!(payload["type"], "template");
        assert_eq!(payload["template"]["name"], "hello_world");
        assert_eq!(payload["template"]["language"]["code"], "en_US");
    }

    #[test]
    fn decode_success_response() {
        let json = r#"
        {
          "messaging_product": "whatsapp",
          "contacts": [{ "input": "14155552671", "wa_id": "14155552671" }],
          "messages": [{ "id": "wamid.HBgLMTQxNTU1NTI2NzEVAgARGBI", "message_status": "accepted" }]
        }
        "#;

        let sent = decode_send_response(json).unwrap();
        assert_eq!(
            sent.message_id.as_deref(),
            Some("wamid.HBgLMTQxNTU1NTI2NzEVAgARGBI")
        );
        assert_eq!(sent.message_status.as_deref(), Some("accepted"));
        assert_eq!(sent.wa_id.as_deref(), Some("14155552671"));
        assert_eq!(sent.input.as_deref(), Some("14155552671"));
    }

    #[test]
    fn decode_success_without_messages_is_an_error() {
        let err = decode_send_response(r#"{"messaging_product":"whatsapp"}"#).unwrap_err();
        assert!(matches!(err, TransportError::MissingMessage));

        let err = decode_send_response("not json").unwrap_err();
        assert!(matches!(err, TransportError::Json(_)));
    }

    #[test]
    fn decode_graph_error_envelope() {
        let body = r#"
        {
          "error": {
            "message": "Invalid OAuth access token - Cannot parse access token",
            "type": "OAuthException",
            "code": 190,
            "fbtrace_id": "AbCdEf"
          }
        }
        "#;

        let error = decode_error_response(body).unwrap();
        assert_eq!(error.code, Some(190));
        assert_eq!(error.kind.as_deref(), Some("OAuthException"));
        assert_eq!(error.fbtrace_id.as_deref(), Some("AbCdEf"));
        assert_eq!(error.error_subcode, None);

        assert!(decode_error_response("<html>bad gateway</html>").is_none());
    }
}
