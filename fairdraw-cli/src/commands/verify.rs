use crate::commands::parse_numbers;
use clap::Subcommand;
use fairdraw_core::{verify_seed, verify_signature, Result};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum VerifyCommands {
    /// Check a revealed seed against its commitment
    Seed {
        /// Revealed seed (hex)
        seed: String,
        /// Published commitment (hex)
        commitment: String,
    },
    /// Check a signature over draw numbers
    Signature {
        /// Numbers as published, e.g. "8,2,4,9"
        numbers: String,
        /// Signature (hex)
        signature: String,
        /// Public key PEM file
        #[arg(short, long)]
        public_key: PathBuf,
    },
}

pub async fn handle_verify_command(cmd: VerifyCommands) -> Result<()> {
    let valid = match cmd {
        VerifyCommands::Seed { seed, commitment } => verify_seed(&seed, &commitment),
        VerifyCommands::Signature {
            numbers,
            signature,
            public_key,
        } => {
            let numbers = parse_numbers(&numbers)?;
            let public_key = tokio::fs::read_to_string(&public_key).await?;
            verify_signature(&numbers, &signature, &public_key)
        }
    };

    if valid {
        println!("VALID");
        Ok(())
    } else {
        println!("INVALID");
        std::process::exit(2);
    }
}
