//! Commit-then-reveal seeds for provably fair draws.
//!
//! A draw starts from a fresh random seed. Its SHA-256 hash is published
//! immediately, the seed itself only once the draw is final. Anyone holding
//! both can then recompute the hash and the draw numbers.

pub mod derive;

pub use derive::{derive_digits, derive_numbers};

use crate::config::MIN_SEED_BYTES;
use crate::error::{FairDrawError, Result};
use crate::random::fill_secure;
use crate::types::SeedCommitment;
use chrono::Utc;
use sha2::{Digest, Sha256};

/// Generate a 64-byte seed and its commitment
pub fn generate_provably_fair_seed() -> Result<SeedCommitment> {
    generate_seed_with_len(MIN_SEED_BYTES)
}

/// Generate a seed of `seed_bytes` random bytes (at least 64) and its commitment
pub fn generate_seed_with_len(seed_bytes: usize) -> Result<SeedCommitment> {
    if seed_bytes < MIN_SEED_BYTES {
        return Err(FairDrawError::invalid_parameter(format!(
            "Seed must be at least {} bytes, got {}",
            MIN_SEED_BYTES, seed_bytes
        )));
    }

    let mut seed = vec![0u8; seed_bytes];
    fill_secure(&mut seed)?;

    let commitment = hash_seed_bytes(&seed);

    Ok(SeedCommitment {
        seed: hex::encode(&seed),
        commitment,
        timestamp_ms: Utc::now().timestamp_millis(),
    })
}

/// Check a revealed seed against its published commitment.
///
/// Malformed hex on either side is a mismatch, not an error. The seed must be
/// spelled exactly as generated (lowercase hex, no padding) since numbers
/// derive from its text.
pub fn verify_seed(seed: &str, commitment: &str) -> bool {
    if !is_canonical_seed(seed) {
        return false;
    }
    let seed_bytes = match hex::decode(seed) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let expected = match hex::decode(commitment) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let computed = Sha256::digest(&seed_bytes);
    constant_time_eq(computed.as_slice(), &expected)
}

/// Non-empty, even-length lowercase hex with nothing around it
pub fn is_canonical_seed(seed: &str) -> bool {
    !seed.is_empty()
        && seed.len() % 2 == 0
        && seed.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn hash_seed_bytes(seed: &[u8]) -> String {
    hex::encode(Sha256::digest(seed))
}

/// Byte comparison whose running time does not depend on where inputs differ
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
