//! Domain layer: strong types with validation and invariants (no I/O).

mod digest;
mod request;
mod response;
mod validation;
mod value;

pub use digest::{
    BookPick, MonthPlan, RecommendationDigest, SPLIT_PART_CHARS, Score, SeriesRecommendation,
};
pub use request::{DeliveryMode, OutgoingMessage, SendTemplate};
pub use response::{ProviderError, SentMessage};
pub use validation::ValidationError;
pub use value::{
    AccessToken, LanguageCode, MessageBody, PhoneNumberId, RecipientPhone, TemplateName,
    truncate_chars,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_rejects_empty() {
        assert!(matches!(
            AccessToken::new("   "),
            Err(ValidationError::Empty {
                field: AccessToken::FIELD
            })
        ));
    }

    #[test]
    fn phone_number_id_rejects_empty() {
        assert!(matches!(
            PhoneNumberId::new(""),
            Err(ValidationError::Empty {
                field: PhoneNumberId::FIELD
            })
        ));
    }

    #[test]
    fn outgoing_message_from_raw_normalizes_and_truncates() {
        let text = "b".repeat(MessageBody::MAX_CHARS * 2);
        let msg = OutgoingMessage::from_raw("+1234567890", text.clone()).unwrap();
        assert_eq!(msg.to().as_str(), "1234567890");
        assert_eq!(msg.body().char_len(), MessageBody::MAX_CHARS);
        assert!(text.starts_with(msg.body().as_str()));
    }

    #[test]
    fn outgoing_message_rejects_invalid_phone_before_sending() {
        let err = OutgoingMessage::from_raw("call me maybe", "hi").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPhoneNumber { .. }));
    }

    #[test]
    fn hello_world_template_defaults() {
        let to = RecipientPhone::new("14155552671").unwrap();
        let template = SendTemplate::hello_world(to);
        assert_eq!(template.name().as_str(), "hello_world");
        assert_eq!(template.language().as_str(), "en_US");
    }

    #[test]
    fn rendered_digest_fits_a_single_body() {
        let picks = (0..300)
            .map(|idx| BookPick {
                title: Some(format!("Book {idx}")),
                author: Some("Someone".to_owned()),
                ..Default::default()
            })
            .collect();
        let digest = RecommendationDigest::new("Ada", vec![], picks, vec![]);
        let rendered = digest.render();
        assert!(rendered.chars().count() > MessageBody::MAX_CHARS);

        let body = MessageBody::new(rendered.clone()).unwrap();
        assert_eq!(body.char_len(), MessageBody::MAX_CHARS);
        assert!(rendered.starts_with(body.as_str()));
    }
}
