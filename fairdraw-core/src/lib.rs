//! fairdraw - provably fair lottery draws
//!
//! The draw flow is commit, derive, sign, reveal:
//! a random seed is hashed and the hash published, the draw digits are
//! derived deterministically from the seed, and the digits are signed with
//! the operator's RSA key. Once the seed is revealed anyone can recompute
//! the hash and the digits and check the signature without trusting the
//! operator.

pub mod commitment;
pub mod config;
pub mod encryption;
pub mod engine;
pub mod error;
pub mod keystore;
pub mod random;
pub mod signing;
pub mod types;

pub use commitment::{derive_digits, derive_numbers, generate_provably_fair_seed, verify_seed};
pub use config::EngineConfig;
pub use encryption::{decrypt, decrypt_payload, encrypt, generate_encryption_key};
pub use engine::{audit_record, DrawEngine};
pub use error::{FairDrawError, Result};
pub use keystore::KeyStore;
pub use random::{generate_secure_numbers, generate_transaction_id, secure_digits};
pub use signing::{generate_keypair, sign_result, verify_signature, KeyPair, SigningKeys};
pub use types::{BetType, DrawAudit, DrawRecord, EncryptedPayload, SeedCommitment};
