#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Provider acceptance of one message.
///
/// Acceptance is not delivery: the provider reports delivery through webhooks,
/// which this crate does not consume.
pub struct SentMessage {
    /// Provider message id (`messages[0].id`, `wamid.…`).
    pub message_id: Option<String>,
    /// Provider message status (`messages[0].message_status`), when returned.
    pub message_status: Option<String>,
    /// WhatsApp id of the recipient (`contacts[0].wa_id`).
    pub wa_id: Option<String>,
    /// Recipient as echoed back by the provider (`contacts[0].input`).
    pub input: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Error object of a failed Graph API call (`{"error": {...}}`).
pub struct ProviderError {
    pub message: String,
    pub kind: Option<String>,
    pub code: Option<i64>,
    pub error_subcode: Option<i64>,
    pub fbtrace_id: Option<String>,
}
