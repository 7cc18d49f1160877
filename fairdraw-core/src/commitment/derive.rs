use crate::error::{FairDrawError, Result};
use sha2::{Digest, Sha512};

const WINDOW: usize = 4;
const DIGEST_LEN: usize = 64;

/// Derive `count` numbers in `[min, max]` from a revealed seed.
///
/// The seed text is hashed once with SHA-512. Number `i` reads the big-endian
/// u32 at offset `(i * 4) % 60`, so windows repeat from index 15 onwards.
/// Reduction is a plain modulo. Changing either would alter every
/// previously published draw.
pub fn derive_numbers(seed: &str, count: usize, min: u32, max: u32) -> Result<Vec<u32>> {
    check_range(count, min, max)?;

    let digest = Sha512::digest(seed.as_bytes());
    let span = u64::from(max - min) + 1;

    let numbers = (0..count)
        .map(|i| {
            let offset = (i * WINDOW) % (DIGEST_LEN - WINDOW);
            let value = read_u32_be(&digest[offset..offset + WINDOW]);
            // span <= 2^32, so the remainder fits back into u32
            min + (u64::from(value) % span) as u32
        })
        .collect();

    Ok(numbers)
}

/// Digits 0-9, the shape every bet type uses
pub fn derive_digits(seed: &str, count: usize) -> Result<Vec<u32>> {
    derive_numbers(seed, count, 0, 9)
}

pub(crate) fn check_range(count: usize, min: u32, max: u32) -> Result<()> {
    if count == 0 {
        return Err(FairDrawError::invalid_parameter(
            "count must be greater than 0",
        ));
    }
    if max < min {
        return Err(FairDrawError::invalid_parameter(format!(
            "max ({}) must not be less than min ({})",
            max, min
        )));
    }
    Ok(())
}

pub(crate) fn read_u32_be(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; WINDOW];
    buf.copy_from_slice(&bytes[..WINDOW]);
    u32::from_be_bytes(buf)
}
