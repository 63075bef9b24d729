use std::io;

use whatsapp_recs::{Config, SendTemplate};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let phone_raw = std::env::var("WHATSAPP_TO").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "WHATSAPP_TO environment variable is required",
        )
    })?;

    let client = config.client()?;
    let to = config.recipient(&phone_raw)?;
    let sent = client.send_template(&SendTemplate::hello_world(to)).await?;
    println!("hello_world accepted as {:?}", sent.message_id);

    Ok(())
}
