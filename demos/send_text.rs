use std::io;

use whatsapp_recs::{Config, OutgoingMessage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let phone_raw = std::env::var("WHATSAPP_TO").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "WHATSAPP_TO environment variable is required",
        )
    })?;
    let message = std::env::var("WHATSAPP_MESSAGE")
        .unwrap_or_else(|_| "Hello from the whatsapp-recs demo.".to_owned());

    let client = config.client()?;
    let to = config.recipient(&phone_raw)?;
    let message = OutgoingMessage::new(to, whatsapp_recs::MessageBody::new(message)?);

    let sent = client.send_text(&message).await?;
    println!(
        "message_id: {:?}, wa_id: {:?}, status: {:?}",
        sent.message_id, sent.wa_id, sent.message_status
    );

    Ok(())
}
