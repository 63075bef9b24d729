use std::fmt;

use crate::domain::validation::ValidationError;

use phonenumber::country;

#[derive(Clone, PartialEq, Eq, Hash)]
/// Graph API bearer token.
///
/// Invariant: non-empty after trimming. `Debug` never prints the token.
pub struct AccessToken(String);

impl AccessToken {
    /// Environment variable the token is read from.
    pub const FIELD: &'static str = "FACEBOOK_WHATSAPP_TOKEN";

    /// Create a validated [`AccessToken`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Provider-assigned id of the sending phone number (a Graph API path segment).
///
/// Invariant: non-empty after trimming, ASCII digits only.
pub struct PhoneNumberId(String);

impl PhoneNumberId {
    /// Environment variable the id is read from.
    pub const FIELD: &'static str = "FACEBOOK_WHATSAPP_PHONE_NUMBER_ID";

    /// Create a validated [`PhoneNumberId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::NotNumeric {
                field: Self::FIELD,
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient phone number as sent to the Graph API (`to`).
///
/// Invariant: 7 to 15 ASCII digits, international calling code first, no `+`.
pub struct RecipientPhone(String);

impl RecipientPhone {
    /// JSON field name used by the Graph API (`to`).
    pub const FIELD: &'static str = "to";

    /// Shortest accepted number, in digits.
    pub const MIN_DIGITS: usize = 7;
    /// Longest accepted number, in digits (E.164 limit).
    pub const MAX_DIGITS: usize = 15;

    /// Normalize a phone number that already carries its calling code.
    ///
    /// Spaces, `-`, `.`, `(` and `)` are dropped and a single leading `+` is
    /// stripped. Anything else that is not a digit is rejected.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let digits = phone_digits(trimmed)?;
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(ValidationError::InvalidPhoneNumber {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(digits))
    }

    /// Parse a phone number with the `phonenumber` crate and keep its E.164 digits.
    ///
    /// `default_region` is used when the input does not contain an explicit
    /// country prefix, e.g. a 10-digit US number becomes `1XXXXXXXXXX`.
    /// The same characters as [`RecipientPhone::new`] are accepted, so vanity
    /// letters are rejected rather than mapped to digits.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        phone_digits(raw)?;

        let parsed = phonenumber::parse(default_region, raw).map_err(|_| {
            ValidationError::InvalidPhoneNumber {
                input: raw.to_owned(),
            }
        })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Self::new(e164)
    }

    /// Digits as sent to the provider.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Digits of `input` with one leading `+` and the separators ` -.()` removed.
fn phone_digits(input: &str) -> Result<String, ValidationError> {
    let rest = input.strip_prefix('+').unwrap_or(input);
    let mut digits = String::with_capacity(rest.len());
    for ch in rest.chars() {
        match ch {
            '0'..='9' => digits.push(ch),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => {
                return Err(ValidationError::InvalidPhoneNumber {
                    input: input.to_owned(),
                });
            }
        }
    }
    Ok(digits)
}

impl fmt::Display for RecipientPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Text message body (`text.body`).
///
/// Invariant: non-empty after trimming and at most [`MessageBody::MAX_CHARS`]
/// characters. Longer input is cut at the limit with no continuation marker.
pub struct MessageBody(String);

impl MessageBody {
    /// JSON field name used by the Graph API (`body`).
    pub const FIELD: &'static str = "body";

    /// Provider limit for a text body, in characters.
    pub const MAX_CHARS: usize = 4096;

    /// Create a message body, truncating it to [`MessageBody::MAX_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(truncate_chars(value, Self::MAX_CHARS)))
    }

    /// Borrow the (possibly truncated) text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

/// Cut `text` to at most `max` characters, never splitting a character.
pub fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
    text
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Name of an approved message template (`template.name`).
///
/// Invariant: non-empty after trimming, at most 512 characters.
pub struct TemplateName(String);

impl TemplateName {
    /// JSON path used by the Graph API.
    pub const FIELD: &'static str = "template.name";

    /// Longest template name the provider accepts.
    pub const MAX_CHARS: usize = 512;

    /// Template every new WhatsApp Business account ships with.
    pub const HELLO_WORLD: &'static str = "hello_world";

    /// Create a validated [`TemplateName`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let len = trimmed.chars().count();
        if len > Self::MAX_CHARS {
            return Err(ValidationError::InvalidLength {
                field: Self::FIELD,
                max: Self::MAX_CHARS,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The `hello_world` template.
    pub fn hello_world() -> Self {
        Self(Self::HELLO_WORLD.to_owned())
    }

    /// Borrow the validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Template language (`template.language.code`), e.g. `en_US`.
///
/// Invariant: non-empty after trimming.
pub struct LanguageCode(String);

impl LanguageCode {
    /// JSON field name used by the Graph API.
    pub const FIELD: &'static str = "template.language.code";

    /// Create a validated [`LanguageCode`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self("en_US".to_owned())
    }
}
