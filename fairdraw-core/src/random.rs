//! Secure randomness outside the commit-reveal protocol: ad hoc draws and
//! transaction identifiers.

use crate::commitment::derive::{check_range, read_u32_be};
use crate::config::MIN_TRANSACTION_ID_RANDOM_BYTES;
use crate::error::{FairDrawError, Result};
use chrono::Utc;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use std::time::Instant;

const MIX_RANDOM_BYTES: usize = 32;
const DEFAULT_TRANSACTION_PREFIX: &str = "TXN";

static CLOCK_ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Fill `buf` from the operating system CSPRNG.
///
/// There is no fallback source: a failing OS generator aborts the caller.
pub fn fill_secure(buf: &mut [u8]) -> Result<()> {
    OsRng.try_fill_bytes(buf).map_err(|e| {
        tracing::error!("OS random source failed: {}", e);
        FairDrawError::entropy(e.to_string())
    })
}

/// Random numbers in `[min, max]` that are not tied to any seed.
///
/// Each number hashes fresh OS randomness together with the wall clock, the
/// process id and a monotonic clock reading. The result cannot be reproduced,
/// so never use it for draws that must be provably fair.
pub fn generate_secure_numbers(count: usize, min: u32, max: u32) -> Result<Vec<u32>> {
    check_range(count, min, max)?;

    let span = u64::from(max - min) + 1;
    let origin = CLOCK_ORIGIN.get_or_init(Instant::now);
    let pid = std::process::id();

    let mut numbers = Vec::with_capacity(count);
    for _ in 0..count {
        let mut random = [0u8; MIX_RANDOM_BYTES];
        fill_secure(&mut random)?;

        let mut hasher = Sha256::new();
        hasher.update(random);
        hasher.update(Utc::now().timestamp_millis().to_be_bytes());
        hasher.update(pid.to_be_bytes());
        hasher.update(origin.elapsed().as_nanos().to_be_bytes());
        let digest = hasher.finalize();

        let value = read_u32_be(&digest[..4]);
        numbers.push(min + (u64::from(value) % span) as u32);
    }

    Ok(numbers)
}

pub fn secure_digits(count: usize) -> Result<Vec<u32>> {
    generate_secure_numbers(count, 0, 9)
}

/// `TXN` + base-36 millisecond timestamp + 8 random bytes, all upper case
pub fn generate_transaction_id() -> Result<String> {
    generate_transaction_id_with(DEFAULT_TRANSACTION_PREFIX, MIN_TRANSACTION_ID_RANDOM_BYTES)
}

pub fn generate_transaction_id_with(prefix: &str, random_bytes: usize) -> Result<String> {
    if random_bytes < MIN_TRANSACTION_ID_RANDOM_BYTES {
        return Err(FairDrawError::invalid_parameter(format!(
            "Transaction ID needs at least {} random bytes",
            MIN_TRANSACTION_ID_RANDOM_BYTES
        )));
    }

    let mut suffix = vec![0u8; random_bytes];
    fill_secure(&mut suffix)?;

    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();

    Ok(format!(
        "{}{}{}",
        prefix,
        to_base36(millis),
        hex::encode_upper(&suffix)
    ))
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        // always < 36
        let digit = (value % 36) as u32;
        digits.push(char::from_digit(digit, 36).unwrap_or('0').to_ascii_uppercase());
        value /= 36;
    }
    digits.iter().rev().collect()
}
