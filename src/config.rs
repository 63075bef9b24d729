//! Environment-driven configuration.
//!
//! Only the two credential variables are required; everything else has a default.

use std::time::Duration;

use phonenumber::country;

use crate::client::{
    Credentials, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_SEND_DELAY, WhatsAppClient,
    WhatsAppError,
};
use crate::domain::{AccessToken, PhoneNumberId, RecipientPhone, ValidationError};

pub const BASE_URL_VAR: &str = "WHATSAPP_API_BASE_URL";
pub const API_VERSION_VAR: &str = "WHATSAPP_API_VERSION";
pub const DEFAULT_REGION_VAR: &str = "WHATSAPP_DEFAULT_REGION";
pub const SEND_DELAY_VAR: &str = "WHATSAPP_SEND_DELAY_MS";
pub const HTTP_TIMEOUT_VAR: &str = "WHATSAPP_HTTP_TIMEOUT_SECS";

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not set")]
    Missing { var: &'static str },

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub base_url: String,
    pub api_version: String,
    /// Region used to complete numbers given without a calling code.
    pub default_region: Option<country::Id>,
    pub send_delay: Duration,
    pub http_timeout: Duration,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let token = get(AccessToken::FIELD).ok_or(ConfigError::Missing {
            var: AccessToken::FIELD,
        })?;
        let phone_number_id = get(PhoneNumberId::FIELD).ok_or(ConfigError::Missing {
            var: PhoneNumberId::FIELD,
        })?;
        let credentials = Credentials::new(token, phone_number_id).map_err(|err| {
            ConfigError::Invalid {
                var: credential_var(&err),
                reason: err.to_string(),
            }
        })?;

        let default_region = get(DEFAULT_REGION_VAR)
            .map(|value| {
                value
                    .trim()
                    .to_uppercase()
                    .parse::<country::Id>()
                    .map_err(|_| ConfigError::Invalid {
                        var: DEFAULT_REGION_VAR,
                        reason: format!("unknown region {value:?}"),
                    })
            })
            .transpose()?;

        let send_delay = get(SEND_DELAY_VAR)
            .map(|value| parse_u64(SEND_DELAY_VAR, &value).map(Duration::from_millis))
            .transpose()?
            .unwrap_or(DEFAULT_SEND_DELAY);

        let http_timeout = get(HTTP_TIMEOUT_VAR)
            .map(|value| parse_u64(HTTP_TIMEOUT_VAR, &value).map(Duration::from_secs))
            .transpose()?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT);

        Ok(Self {
            credentials,
            base_url: get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            api_version: get(API_VERSION_VAR).unwrap_or_else(|| DEFAULT_API_VERSION.to_owned()),
            default_region,
            send_delay,
            http_timeout,
        })
    }

    /// Build the client these settings describe.
    pub fn client(&self) -> Result<WhatsAppClient, WhatsAppError> {
        WhatsAppClient::builder(self.credentials.clone())
            .base_url(&self.base_url)
            .api_version(&self.api_version)
            .send_delay(self.send_delay)
            .timeout(self.http_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    /// Normalize a recipient number according to the configured region.
    pub fn recipient(&self, input: &str) -> Result<RecipientPhone, ValidationError> {
        match self.default_region {
            Some(region) => RecipientPhone::parse(Some(region), input),
            None => RecipientPhone::new(input),
        }
    }
}

fn credential_var(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::Empty { field } | ValidationError::NotNumeric { field, .. } => *field,
        _ => AccessToken::FIELD,
    }
}

fn parse_u64(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        reason: format!("expected a non-negative integer, got {value:?}"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<HashMap<_, _>>();
        move |var: &str| map.get(var).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("FACEBOOK_WHATSAPP_TOKEN", "EAAG-token"),
        ("FACEBOOK_WHATSAPP_PHONE_NUMBER_ID", "106540352242922"),
    ];

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.credentials.access_token().as_str(), "EAAG-token");
        assert_eq!(
            config.credentials.phone_number_id().as_str(),
            "106540352242922"
        );
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_version, "v22.0");
        assert_eq!(config.send_delay, Duration::from_secs(1));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.default_region.is_none());

        let client = config.client().unwrap();
        assert_eq!(
            client.messages_url(),
            "https://graph.facebook.com/v22.0/106540352242922/messages"
        );
    }

    #[test]
    fn missing_token_is_a_configuration_error() {
        let err = Config::from_lookup(lookup(&[REQUIRED[1]])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                var: "FACEBOOK_WHATSAPP_TOKEN"
            }
        ));
    }

    #[test]
    fn blank_phone_number_id_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[
            REQUIRED[0],
            ("FACEBOOK_WHATSAPP_PHONE_NUMBER_ID", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                var: "FACEBOOK_WHATSAPP_PHONE_NUMBER_ID"
            }
        ));
    }

    #[test]
    fn non_numeric_phone_number_id_is_invalid() {
        let err = Config::from_lookup(lookup(&[
            REQUIRED[0],
            ("FACEBOOK_WHATSAPP_PHONE_NUMBER_ID", "abc"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "FACEBOOK_WHATSAPP_PHONE_NUMBER_ID",
                ..
            }
        ));
    }

    #[test]
    fn optional_settings_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            REQUIRED[0],
            REQUIRED[1],
            (BASE_URL_VAR, "http://127.0.0.1:8080"),
            (API_VERSION_VAR, "v21.0"),
            (DEFAULT_REGION_VAR, "us"),
            (SEND_DELAY_VAR, "250"),
            (HTTP_TIMEOUT_VAR, "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.api_version, "v21.0");
        assert_eq!(config.default_region, Some(country::Id::US));
        assert_eq!(config.send_delay, Duration::from_millis(250));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.recipient("415 555 2671").unwrap().as_str(), "14155552671");
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[REQUIRED[0], REQUIRED[1], (SEND_DELAY_VAR, "-1")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: SEND_DELAY_VAR,
                ..
            }
        ));
    }

    #[test]
    fn recipient_without_region_strips_plus() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.recipient("+1234567890").unwrap().as_str(), "1234567890");
    }

    #[test]
    fn recipient_with_region_rejects_letters() {
        let config =
            Config::from_lookup(lookup(&[REQUIRED[0], REQUIRED[1], (DEFAULT_REGION_VAR, "US")]))
                .unwrap();
        assert!(matches!(
            config.recipient("1-800-FLOWERS"),
            Err(ValidationError::InvalidPhoneNumber { .. })
        ));
        assert_eq!(config.recipient("1-800-356-9377").unwrap().as_str(), "18003569377");
    }
}
