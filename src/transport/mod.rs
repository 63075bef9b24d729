//! Transport layer: Graph API wire format (JSON encoding/decoding).

mod send_message;

pub use send_message::{
    decode_error_response, decode_send_response, encode_template_message, encode_text_message,
};
