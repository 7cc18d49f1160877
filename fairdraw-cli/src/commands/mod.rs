pub mod draw;
pub mod keys;
pub mod numbers;
pub mod payload;
pub mod verify;

pub use draw::{handle_draw_command, DrawCommands};
pub use keys::{handle_key_command, KeyCommands};
pub use numbers::{handle_number_command, NumberCommands};
pub use payload::{handle_payload_command, PayloadCommands};
pub use verify::{handle_verify_command, VerifyCommands};

use crate::config::{CliConfig, PASSPHRASE_ENV};
use dialoguer::Password;
use fairdraw_core::{DrawEngine, FairDrawError, KeyStore, Result};

pub fn print_transaction_ids(config: &CliConfig, count: usize) -> Result<()> {
    let engine_config = config.engine_config()?;
    for _ in 0..count {
        println!(
            "{}",
            fairdraw_core::random::generate_transaction_id_with(
                &engine_config.transaction_id_prefix,
                engine_config.transaction_id_random_bytes,
            )?
        );
    }
    Ok(())
}

/// Key store passphrase from the environment, else an interactive prompt
pub(crate) fn read_passphrase(confirm: bool) -> Result<String> {
    if let Ok(passphrase) = std::env::var(PASSPHRASE_ENV) {
        if !passphrase.is_empty() {
            return Ok(passphrase);
        }
    }

    let prompt = Password::new().with_prompt("Enter signing key passphrase");
    let prompt = if confirm {
        prompt.with_confirmation("Confirm passphrase", "Passphrases don't match")
    } else {
        prompt
    };
    Ok(prompt.interact()?)
}

pub(crate) fn key_store(config: &CliConfig, kdf_iterations: u32) -> KeyStore {
    KeyStore::new(config.keys_dir()).with_kdf_iterations(kdf_iterations)
}

/// Engine backed by the stored signing key, which must already exist
pub(crate) async fn open_engine(config: &CliConfig) -> Result<(DrawEngine, KeyStore, String)> {
    let engine_config = config.engine_config()?;
    let store = key_store(config, engine_config.kdf_iterations);

    if !store.exists().await? {
        return Err(missing_key(&store));
    }

    tracing::debug!("Opening signing key at {}", store.key_path().display());
    let passphrase = read_passphrase(false)?;
    let keys = store.load(&passphrase).await?;
    let engine = DrawEngine::new(engine_config, keys)?;
    Ok((engine, store, passphrase))
}

/// The only not-found error that points the user at `keys init`
pub(crate) fn missing_key(store: &KeyStore) -> FairDrawError {
    FairDrawError::config(format!(
        "No signing key in {}. Use 'fairdraw keys init' to create one",
        store.dir().display()
    ))
}

/// Parse `"8,2,4,9"` or `"8 2 4 9"` into digits
pub(crate) fn parse_numbers(input: &str) -> Result<Vec<u32>> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>().map_err(|_| {
                FairDrawError::invalid_parameter(format!("'{}' is not a number", part))
            })
        })
        .collect()
}
