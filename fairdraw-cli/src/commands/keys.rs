use crate::commands::{key_store, missing_key, open_engine, read_passphrase};
use crate::config::CliConfig;
use clap::Subcommand;
use dialoguer::Confirm;
use fairdraw_core::signing::public_key_fingerprint;
use fairdraw_core::{FairDrawError, Result, SigningKeys};

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Generate and store the signing key
    Init {
        /// Replace an existing key without asking
        #[arg(short, long)]
        force: bool,
    },
    /// Print the published public key
    Show,
    /// Replace the signing key; older draws stay verifiable with their own key
    Rotate {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn handle_key_command(cmd: KeyCommands, config: &CliConfig) -> Result<()> {
    match cmd {
        KeyCommands::Init { force } => {
            let engine_config = config.engine_config()?;
            let store = key_store(config, engine_config.kdf_iterations);

            if store.exists().await? && !force {
                return Err(FairDrawError::config(format!(
                    "A signing key already exists in {}. Use 'fairdraw keys rotate' to replace it",
                    store.dir().display()
                )));
            }

            let passphrase = read_passphrase(true)?;

            println!("Generating {}-bit RSA signing key...", engine_config.rsa_key_bits);
            let keys = SigningKeys::generate(engine_config.rsa_key_bits)?;
            store.save(&keys, &passphrase).await?;

            println!("Signing key created successfully!");
            println!("  Fingerprint: {}", keys.fingerprint());
            println!("  Public key:  {}", store.public_key_path().display());
            println!();
            println!("Keep your passphrase safe - the key cannot be recovered without it!");
        }

        KeyCommands::Show => {
            let engine_config = config.engine_config()?;
            let store = key_store(config, engine_config.kdf_iterations);
            if !tokio::fs::try_exists(store.public_key_path()).await? {
                return Err(missing_key(&store));
            }
            let pem = store.read_public_key().await?;

            println!("Fingerprint: {}", public_key_fingerprint(&pem));
            println!();
            print!("{}", pem);
        }

        KeyCommands::Rotate { force } => {
            if !force {
                let confirm = Confirm::new()
                    .with_prompt("Replace the signing key? New draws will use a new public key")
                    .default(false)
                    .interact()?;

                if !confirm {
                    println!("Rotation cancelled.");
                    return Ok(());
                }
            }

            let (engine, store, passphrase) = open_engine(config).await?;
            let previous = engine.fingerprint();
            let fingerprint = engine.rotate_keys(Some((&store, &passphrase))).await?;

            println!("Signing key rotated.");
            println!("  Previous: {}", previous);
            println!("  Current:  {}", fingerprint);
        }
    }

    Ok(())
}
