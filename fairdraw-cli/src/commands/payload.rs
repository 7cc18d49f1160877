use clap::Subcommand;
use fairdraw_core::{decrypt, encrypt, generate_encryption_key, Result};

#[derive(Subcommand)]
pub enum PayloadCommands {
    /// Generate a 256-bit payload key (hex)
    Keygen,
    /// Encrypt bet details
    Encrypt {
        /// Text to encrypt
        plaintext: String,
        /// Payload key (hex)
        #[arg(short, long, env = "FAIRDRAW_PAYLOAD_KEY", hide_env_values = true)]
        key: String,
    },
    /// Decrypt bet details
    Decrypt {
        /// Ciphertext (hex)
        ciphertext: String,
        /// Initialization vector (hex)
        #[arg(long)]
        iv: String,
        /// Authentication tag (hex)
        #[arg(long)]
        tag: String,
        /// Payload key (hex)
        #[arg(short, long, env = "FAIRDRAW_PAYLOAD_KEY", hide_env_values = true)]
        key: String,
    },
}

pub fn handle_payload_command(cmd: PayloadCommands) -> Result<()> {
    match cmd {
        PayloadCommands::Keygen => {
            println!("{}", generate_encryption_key()?);
        }

        PayloadCommands::Encrypt { plaintext, key } => {
            let payload = encrypt(&plaintext, &key)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }

        PayloadCommands::Decrypt {
            ciphertext,
            iv,
            tag,
            key,
        } => {
            println!("{}", decrypt(&ciphertext, &key, &iv, &tag)?);
        }
    }

    Ok(())
}
