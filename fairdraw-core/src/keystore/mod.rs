//! On-disk storage for the draw signing key.
//!
//! Signatures must stay verifiable across restarts, so the key is generated
//! once and loaded afterwards. The private key is kept encrypted under an
//! operator passphrase; the public key is also written as plain PEM for
//! publishing.

mod encryption;

use crate::error::{FairDrawError, Result};
use crate::signing::{public_key_fingerprint, SigningKeys};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const KEY_FILE: &str = "signing_key.json";
const PUBLIC_KEY_FILE: &str = "signing_key.pub.pem";
const KEY_FILE_VERSION: u32 = 1;
const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedKeyFile {
    pub version: u32,
    pub encryption_method: String,
    pub kdf: String,
    pub kdf_iterations: u32,
    pub salt: String,
    pub nonce: String,
    pub encrypted_key: String,
    pub checksum: String,
    pub public_key_pem: String,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
    kdf_iterations: u32,
}

impl KeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
        }
    }

    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key_path(&self) -> PathBuf {
        self.dir.join(KEY_FILE)
    }

    pub fn public_key_path(&self) -> PathBuf {
        self.dir.join(PUBLIC_KEY_FILE)
    }

    pub async fn exists(&self) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.key_path()).await?)
    }

    /// Encrypt and write `keys`, replacing any stored key
    pub async fn save(&self, keys: &SigningKeys, passphrase: &str) -> Result<()> {
        let private_pem = keys.private_key_pem()?;
        let sealed = encryption::seal(private_pem.as_bytes(), passphrase, self.kdf_iterations)?;

        let file = EncryptedKeyFile {
            version: KEY_FILE_VERSION,
            encryption_method: "ChaCha20Poly1305".to_string(),
            kdf: "pbkdf2-sha256".to_string(),
            kdf_iterations: self.kdf_iterations,
            salt: general_purpose::STANDARD.encode(&sealed.salt),
            nonce: general_purpose::STANDARD.encode(&sealed.nonce),
            encrypted_key: general_purpose::STANDARD.encode(&sealed.ciphertext),
            checksum: sealed.checksum,
            public_key_pem: keys.public_key_pem().to_string(),
            fingerprint: keys.fingerprint(),
            created_at: Utc::now(),
        };

        tokio::fs::create_dir_all(&self.dir).await?;

        let json = serde_json::to_string_pretty(&file)?;
        let key_path = self.key_path();
        write_private(&key_path, json.as_bytes()).await?;

        tokio::fs::write(self.public_key_path(), keys.public_key_pem()).await?;

        tracing::info!(
            "Stored signing key {} in {}",
            file.fingerprint,
            self.dir.display()
        );
        Ok(())
    }

    pub async fn load(&self, passphrase: &str) -> Result<SigningKeys> {
        let json = tokio::fs::read_to_string(self.key_path()).await?;
        let file: EncryptedKeyFile = serde_json::from_str(&json)?;

        if file.version != KEY_FILE_VERSION {
            return Err(FairDrawError::keystore(format!(
                "Unsupported key file version: {}",
                file.version
            )));
        }

        let sealed = encryption::SealedKey {
            salt: decode_base64("salt", &file.salt)?,
            nonce: decode_base64("nonce", &file.nonce)?,
            ciphertext: decode_base64("encrypted_key", &file.encrypted_key)?,
            checksum: file.checksum.clone(),
        };

        let private_pem = encryption::open(&sealed, passphrase, file.kdf_iterations)?;
        let private_pem = String::from_utf8(private_pem)
            .map_err(|_| FairDrawError::keystore("Decrypted key is not valid PEM text"))?;

        let keys = SigningKeys::from_private_pem(&private_pem)?;
        if keys.public_key_pem().trim() != file.public_key_pem.trim() {
            return Err(FairDrawError::keystore(
                "Stored public key does not match the private key",
            ));
        }

        tracing::info!("Loaded signing key {}", keys.fingerprint());
        Ok(keys)
    }

    /// Load the stored key, or generate and store one on first use.
    ///
    /// The flag is `true` when a new key was created.
    pub async fn load_or_generate(&self, passphrase: &str, bits: usize) -> Result<(SigningKeys, bool)> {
        if self.exists().await? {
            return Ok((self.load(passphrase).await?, false));
        }

        tracing::info!("No signing key in {}, generating one", self.dir.display());
        let keys = SigningKeys::generate(bits)?;
        self.save(&keys, passphrase).await?;
        Ok((keys, true))
    }

    /// Published public key, readable without the passphrase
    pub async fn read_public_key(&self) -> Result<String> {
        let pem = tokio::fs::read_to_string(self.public_key_path()).await?;
        tracing::debug!("Read public key {}", public_key_fingerprint(&pem));
        Ok(pem)
    }
}

fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(value)
        .map_err(|e| FairDrawError::keystore(format!("Invalid {} encoding: {}", field, e)))
}

/// Write `data` to a fresh owner-only staging file, then rename it over `path`
async fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    let staging = path.with_extension("json.tmp");
    match tokio::fs::remove_file(&staging).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(&staging).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&staging, path).await?;
    Ok(())
}
