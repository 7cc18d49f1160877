//! AES-256-GCM sealing for bet details held before the public reveal.

use crate::error::{FairDrawError, Result};
use crate::random::fill_secure;
use crate::types::EncryptedPayload;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};

const KEY_SIZE: usize = 32;
const IV_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

/// Binds every ciphertext to this application
const ASSOCIATED_DATA: &[u8] = b"fairdraw:bet-payload:v1";

/// Fresh 256-bit key, hex encoded
pub fn generate_encryption_key() -> Result<String> {
    let mut key = [0u8; KEY_SIZE];
    fill_secure(&mut key)?;
    Ok(hex::encode(key))
}

/// Encrypt `plaintext` under a hex encoded 32-byte key with a random IV
pub fn encrypt(plaintext: &str, key_hex: &str) -> Result<EncryptedPayload> {
    let cipher = cipher_from_hex(key_hex)?;

    let mut iv = [0u8; IV_SIZE];
    fill_secure(&mut iv)?;

    let mut sealed = cipher
        .encrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: plaintext.as_bytes(),
                aad: ASSOCIATED_DATA,
            },
        )
        .map_err(|e| FairDrawError::internal(format!("Encryption failed: {}", e)))?;

    // aes-gcm appends the tag to the ciphertext
    let tag = sealed.split_off(sealed.len() - TAG_SIZE);

    Ok(EncryptedPayload {
        ciphertext: hex::encode(&sealed),
        iv: hex::encode(iv),
        tag: hex::encode(tag),
    })
}

/// Decrypt and authenticate. Any mismatch fails without returning plaintext.
pub fn decrypt(ciphertext: &str, key_hex: &str, iv: &str, tag: &str) -> Result<String> {
    let cipher = cipher_from_hex(key_hex)?;

    let iv = decode_field("iv", iv)?;
    if iv.len() != IV_SIZE {
        return Err(FairDrawError::invalid_parameter(format!(
            "IV must be {} bytes, got {}",
            IV_SIZE,
            iv.len()
        )));
    }

    let tag = decode_field("tag", tag)?;
    if tag.len() != TAG_SIZE {
        return Err(FairDrawError::DecryptionIntegrity);
    }

    let mut sealed = decode_field("ciphertext", ciphertext)?;
    sealed.extend_from_slice(&tag);

    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: &sealed,
                aad: ASSOCIATED_DATA,
            },
        )
        .map_err(|_| FairDrawError::DecryptionIntegrity)?;

    String::from_utf8(plaintext).map_err(|_| FairDrawError::DecryptionIntegrity)
}

pub fn decrypt_payload(payload: &EncryptedPayload, key_hex: &str) -> Result<String> {
    decrypt(&payload.ciphertext, key_hex, &payload.iv, &payload.tag)
}

fn cipher_from_hex(key_hex: &str) -> Result<Aes256Gcm> {
    let key = hex::decode(key_hex.trim())
        .map_err(|e| FairDrawError::invalid_parameter(format!("Key is not hex: {}", e)))?;
    if key.len() != KEY_SIZE {
        return Err(FairDrawError::invalid_parameter(format!(
            "Key must be {} bytes, got {}",
            KEY_SIZE,
            key.len()
        )));
    }

    Aes256Gcm::new_from_slice(&key)
        .map_err(|e| FairDrawError::invalid_parameter(format!("Invalid key: {}", e)))
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value.trim())
        .map_err(|e| FairDrawError::invalid_parameter(format!("{} is not hex: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let key = generate_encryption_key().unwrap();
        let plaintext = r#"{"bet_type":"4D","numbers":[1,9,8,4],"stake":5000}"#;

        let payload = encrypt(plaintext, &key).unwrap();
        assert_eq!(payload.iv.len(), IV_SIZE * 2);
        assert_eq!(payload.tag.len(), TAG_SIZE * 2);
        assert_eq!(payload.ciphertext.len(), plaintext.len() * 2);

        assert_eq!(decrypt_payload(&payload, &key).unwrap(), plaintext);
    }

    #[test]
    fn test_unicode_and_empty_plaintext() {
        let key = generate_encryption_key().unwrap();

        for plaintext in ["", "taruhan 🎲 ke-4 • ñ", "a"] {
            let payload = encrypt(plaintext, &key).unwrap();
            assert_eq!(decrypt_payload(&payload, &key).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let key = generate_encryption_key().unwrap();
        let a = encrypt("same", &key).unwrap();
        let b = encrypt("same", &key).unwrap();

        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_wrong_key() {
        let key = generate_encryption_key().unwrap();
        let other = generate_encryption_key().unwrap();
        let payload = encrypt("secret numbers", &key).unwrap();

        assert!(matches!(
            decrypt_payload(&payload, &other),
            Err(FairDrawError::DecryptionIntegrity)
        ));
    }

    #[test]
    fn test_tampered_ciphertext_and_tag() {
        let key = generate_encryption_key().unwrap();
        let payload = encrypt("secret numbers", &key).unwrap();

        let flip_first = |hex_str: &str| {
            let mut bytes = hex::decode(hex_str).unwrap();
            bytes[0] ^= 0x01;
            hex::encode(bytes)
        };

        let mut tampered = payload.clone();
        tampered.ciphertext = flip_first(&payload.ciphertext);
        assert!(matches!(
            decrypt_payload(&tampered, &key),
            Err(FairDrawError::DecryptionIntegrity)
        ));

        let mut tampered = payload.clone();
        tampered.tag = flip_first(&payload.tag);
        assert!(matches!(
            decrypt_payload(&tampered, &key),
            Err(FairDrawError::DecryptionIntegrity)
        ));

        let mut tampered = payload.clone();
        tampered.iv = flip_first(&payload.iv);
        assert!(decrypt_payload(&tampered, &key).is_err());

        let mut truncated = payload;
        truncated.tag.truncate(8);
        assert!(matches!(
            decrypt_payload(&truncated, &key),
            Err(FairDrawError::DecryptionIntegrity)
        ));
    }

    #[test]
    fn test_key_must_be_32_bytes() {
        assert!(matches!(
            encrypt("x", &"ab".repeat(16)),
            Err(FairDrawError::InvalidParameter(_))
        ));
        assert!(matches!(
            encrypt("x", "not hex"),
            Err(FairDrawError::InvalidParameter(_))
        ));
    }
}
