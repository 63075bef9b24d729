use crate::domain::validation::ValidationError;
use crate::domain::value::{LanguageCode, MessageBody, RecipientPhone, TemplateName};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One text message for one recipient.
///
/// The body already satisfies the provider length limit; see [`MessageBody`].
pub struct OutgoingMessage {
    to: RecipientPhone,
    body: MessageBody,
}

impl OutgoingMessage {
    pub fn new(to: RecipientPhone, body: MessageBody) -> Self {
        Self { to, body }
    }

    /// Build a message from unvalidated strings, normalizing the phone and cutting the body.
    pub fn from_raw(to: impl Into<String>, body: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            to: RecipientPhone::new(to)?,
            body: MessageBody::new(body)?,
        })
    }

    pub fn to(&self) -> &RecipientPhone {
        &self.to
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A template message for one recipient.
pub struct SendTemplate {
    to: RecipientPhone,
    name: TemplateName,
    language: LanguageCode,
}

impl SendTemplate {
    pub fn new(to: RecipientPhone, name: TemplateName, language: LanguageCode) -> Self {
        Self { to, name, language }
    }

    /// The `hello_world` template in `en_US`, used to check that credentials work.
    pub fn hello_world(to: RecipientPhone) -> Self {
        Self::new(to, TemplateName::hello_world(), LanguageCode::default())
    }

    pub fn to(&self) -> &RecipientPhone {
        &self.to
    }

    pub fn name(&self) -> &TemplateName {
        &self.name
    }

    pub fn language(&self) -> &LanguageCode {
        &self.language
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// How a recommendation digest is turned into messages.
pub enum DeliveryMode {
    /// One body, cut at the provider limit.
    #[default]
    Single,
    /// Several bodies packed below the provider limit, sent back to back.
    Split,
}
