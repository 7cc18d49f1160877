use crate::commitment::{derive_digits, generate_seed_with_len, verify_seed};
use crate::config::EngineConfig;
use crate::error::{FairDrawError, Result};
use crate::keystore::KeyStore;
use crate::random::generate_transaction_id_with;
use crate::signing::{verify_signature, SigningKeys};
use crate::types::{BetType, DrawAudit, DrawRecord, SeedCommitment};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Produces signed, committed draws with one active signing key.
///
/// The key can be swapped while draws are being created; each draw keeps the
/// public key it was signed with, so rotation never invalidates old records.
pub struct DrawEngine {
    config: EngineConfig,
    keys: RwLock<Arc<SigningKeys>>,
    // serializes persist + swap in rotate_keys
    rotation: tokio::sync::Mutex<()>,
}

impl DrawEngine {
    pub fn new(config: EngineConfig, keys: SigningKeys) -> Result<Self> {
        config.validate()?;

        tracing::info!("Draw engine ready with signing key {}", keys.fingerprint());
        Ok(Self {
            config,
            keys: RwLock::new(Arc::new(keys)),
            rotation: tokio::sync::Mutex::new(()),
        })
    }

    /// Engine with an in-memory key that is lost when the process exits
    pub fn ephemeral(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let keys = SigningKeys::generate(config.rsa_key_bits)?;

        tracing::warn!(
            "Using ephemeral signing key {}; its signatures cannot be reproduced after restart",
            keys.fingerprint()
        );
        Self::new(config, keys)
    }

    /// Engine backed by a persisted key, created on first start
    pub async fn open(config: EngineConfig, store: &KeyStore, passphrase: &str) -> Result<Self> {
        config.validate()?;
        let (keys, created) = store
            .load_or_generate(passphrase, config.rsa_key_bits)
            .await?;
        if created {
            tracing::info!("Generated new signing key {}", keys.fingerprint());
        }
        Self::new(config, keys)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn active_keys(&self) -> Arc<SigningKeys> {
        self.keys.read().clone()
    }

    pub fn public_key_pem(&self) -> String {
        self.active_keys().public_key_pem().to_string()
    }

    pub fn fingerprint(&self) -> String {
        self.active_keys().fingerprint()
    }

    pub fn commit_seed(&self) -> Result<SeedCommitment> {
        generate_seed_with_len(self.config.seed_bytes)
    }

    pub fn sign(&self, numbers: &[u32]) -> Result<String> {
        self.active_keys().sign(numbers)
    }

    pub fn transaction_id(&self) -> Result<String> {
        generate_transaction_id_with(
            &self.config.transaction_id_prefix,
            self.config.transaction_id_random_bytes,
        )
    }

    /// Commit to a seed, derive the numbers for `bet_type` and sign them
    pub fn create_draw(&self, bet_type: BetType) -> Result<DrawRecord> {
        let committed = self.commit_seed()?;
        let numbers = derive_digits(&committed.seed, bet_type.digit_count())?;

        // sign and publish under the same key even if a rotation lands meanwhile
        let keys = self.active_keys();
        let signature = keys.sign(&numbers)?;

        let record = DrawRecord {
            draw_id: Uuid::new_v4(),
            bet_type,
            numbers,
            seed: committed.seed,
            commitment: committed.commitment,
            signature,
            public_key: keys.public_key_pem().to_string(),
            created_at: DateTime::from_timestamp_millis(committed.timestamp_ms)
                .unwrap_or_else(Utc::now),
            completed: false,
            completed_at: None,
        };

        tracing::info!(
            "Created {} draw {} with commitment {} signed by {}",
            record.bet_type,
            record.draw_id,
            record.commitment,
            keys.fingerprint()
        );
        Ok(record)
    }

    pub fn audit_draw(&self, record: &DrawRecord) -> DrawAudit {
        audit_record(record)
    }

    /// Close a draw so its seed can be revealed. A record that fails its
    /// audit is left open.
    pub fn complete_draw(&self, record: &mut DrawRecord) -> Result<()> {
        if !audit_record(record).is_valid() {
            return Err(FairDrawError::invalid_parameter(format!(
                "Draw {} failed verification and cannot be completed",
                record.draw_id
            )));
        }
        if record.completed {
            tracing::debug!("Draw {} already completed", record.draw_id);
            return Ok(());
        }

        record.mark_completed();
        tracing::info!(
            "Completed {} draw {} with numbers {}",
            record.bet_type,
            record.draw_id,
            record.canonical_numbers()
        );
        Ok(())
    }

    /// Swap in a freshly generated key, persisting it first when a store is given.
    ///
    /// Returns the new key's fingerprint.
    pub async fn rotate_keys(&self, store: Option<(&KeyStore, &str)>) -> Result<String> {
        let keys = SigningKeys::generate(self.config.rsa_key_bits)?;

        let _rotating = self.rotation.lock().await;
        if let Some((store, passphrase)) = store {
            store.save(&keys, passphrase).await?;
        }
        let fingerprint = keys.fingerprint();
        let previous = self.replace_keys(keys);

        tracing::info!(
            "Rotated signing key {} -> {}",
            previous.fingerprint(),
            fingerprint
        );
        Ok(fingerprint)
    }

    /// Install `keys` as the active key, returning the one it replaced
    pub fn replace_keys(&self, keys: SigningKeys) -> Arc<SigningKeys> {
        let mut active = self.keys.write();
        std::mem::replace(&mut *active, Arc::new(keys))
    }
}

/// Re-check a revealed draw using only what the record itself contains
pub fn audit_record(record: &DrawRecord) -> DrawAudit {
    let commitment_valid = verify_seed(&record.seed, &record.commitment);

    let numbers_match = record.numbers.len() == record.bet_type.digit_count()
        && derive_digits(&record.seed, record.numbers.len())
            .map(|derived| derived == record.numbers)
            .unwrap_or(false);

    let signature_valid = verify_signature(&record.numbers, &record.signature, &record.public_key);

    let audit = DrawAudit {
        commitment_valid,
        numbers_match,
        signature_valid,
    };

    if audit.is_valid() {
        tracing::debug!("Draw {} verified", record.draw_id);
    } else {
        tracing::warn!(
            "Draw {} failed verification: commitment={} numbers={} signature={}",
            record.draw_id,
            commitment_valid,
            numbers_match,
            signature_valid
        );
    }
    audit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{other_keys, test_keys};
    use tempfile::tempdir;

    fn engine() -> DrawEngine {
        DrawEngine::new(EngineConfig::default(), test_keys()).unwrap()
    }

    #[test]
    fn test_create_draw_for_each_bet_type() {
        let engine = engine();

        for bet_type in BetType::ALL {
            let record = engine.create_draw(bet_type).unwrap();
            assert_eq!(record.numbers.len(), bet_type.digit_count());
            assert!(record.numbers.iter().all(|n| *n <= 9));
            assert_eq!(record.public_key, engine.public_key_pem());
            assert!(audit_record(&record).is_valid());
        }
    }

    #[test]
    fn test_derived_bet_types_settle_on_4d_digits() {
        let engine = engine();
        let record = engine.create_draw(BetType::TwoDMiddle).unwrap();

        assert_eq!(record.numbers.len(), 4);
        assert_eq!(record.winning_numbers(), &record.numbers[1..3]);
        assert!(audit_record(&record).is_valid());

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"bet_type\":\"2D-MIDDLE\""));
        let parsed: DrawRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.bet_type, BetType::TwoDMiddle);
    }

    #[test]
    fn test_complete_draw() {
        let engine = engine();
        let mut record = engine.create_draw(BetType::ThreeD).unwrap();
        assert!(!record.completed);
        assert!(record.completed_at.is_none());

        engine.complete_draw(&mut record).unwrap();
        assert!(record.completed);
        let completed_at = record.completed_at.unwrap();
        assert!(completed_at >= record.created_at);

        // the flag is not covered by the signature
        assert!(audit_record(&record).is_valid());

        engine.complete_draw(&mut record).unwrap();
        assert_eq!(record.completed_at, Some(completed_at));
    }

    #[test]
    fn test_complete_draw_refuses_tampered_record() {
        let engine = engine();
        let mut record = engine.create_draw(BetType::FourD).unwrap();
        record.numbers[3] = (record.numbers[3] + 1) % 10;

        assert!(matches!(
            engine.complete_draw(&mut record),
            Err(FairDrawError::InvalidParameter(_))
        ));
        assert!(!record.completed);
    }

    #[test]
    fn test_audit_flags_each_failure() {
        let engine = engine();
        let record = engine.create_draw(BetType::FourD).unwrap();

        let mut altered = record.clone();
        altered.numbers[0] = (altered.numbers[0] + 1) % 10;
        let audit = engine.audit_draw(&altered);
        assert!(audit.commitment_valid);
        assert!(!audit.numbers_match);
        assert!(!audit.signature_valid);

        let mut swapped_seed = record.clone();
        swapped_seed.seed = engine.commit_seed().unwrap().seed;
        let audit = engine.audit_draw(&swapped_seed);
        assert!(!audit.commitment_valid);
        assert!(audit.signature_valid);

        let mut foreign_key = record.clone();
        foreign_key.public_key = other_keys().public_key_pem().to_string();
        let audit = engine.audit_draw(&foreign_key);
        assert!(audit.commitment_valid && audit.numbers_match);
        assert!(!audit.signature_valid);
        assert!(!audit.is_valid());
    }

    #[test]
    fn test_audit_rejects_respelled_seed() {
        let engine = engine();
        let record = engine.create_draw(BetType::FourD).unwrap();

        // re-derive and re-sign under another spelling of the committed bytes
        for seed in [
            record.seed.to_uppercase(),
            format!("{} ", record.seed),
            format!("\t{}", record.seed),
        ] {
            let mut forged = record.clone();
            forged.numbers = derive_digits(&seed, forged.numbers.len()).unwrap();
            forged.signature = engine.sign(&forged.numbers).unwrap();
            forged.seed = seed;

            let audit = audit_record(&forged);
            assert!(!audit.commitment_valid);
            assert!(audit.signature_valid);
            assert!(!audit.is_valid());
        }
    }

    #[test]
    fn test_audit_rejects_wrong_length() {
        let engine = engine();
        let mut record = engine.create_draw(BetType::FourD).unwrap();
        record.bet_type = BetType::ThreeD;

        assert!(!audit_record(&record).numbers_match);
    }

    #[test]
    fn test_record_survives_json() {
        let engine = engine();
        let record = engine.create_draw(BetType::TwoD).unwrap();

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"bet_type\":\"2D\""));
        let parsed: DrawRecord = serde_json::from_str(&json).unwrap();
        assert!(audit_record(&parsed).is_valid());
    }

    #[test]
    fn test_replace_keys_keeps_old_draws_valid() {
        let engine = engine();
        let before = engine.create_draw(BetType::FourD).unwrap();

        let previous = engine.replace_keys(other_keys());
        assert_eq!(previous.public_key_pem(), before.public_key);

        let after = engine.create_draw(BetType::FourD).unwrap();
        assert_ne!(before.public_key, after.public_key);
        assert!(audit_record(&before).is_valid());
        assert!(audit_record(&after).is_valid());
    }

    #[test]
    fn test_transaction_id_uses_config_prefix() {
        let mut config = EngineConfig::default();
        config.transaction_id_prefix = "BET".to_string();
        let engine = DrawEngine::new(config, test_keys()).unwrap();

        assert!(engine.transaction_id().unwrap().starts_with("BET"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.seed_bytes = 16;
        assert!(DrawEngine::new(config, test_keys()).is_err());
    }

    #[tokio::test]
    async fn test_open_reuses_persisted_key() {
        let temp_dir = tempdir().unwrap();
        let store = KeyStore::new(temp_dir.path()).with_kdf_iterations(1_000);
        store.save(&test_keys(), "pass").await.unwrap();

        let first = DrawEngine::open(EngineConfig::default(), &store, "pass").await.unwrap();
        let record = first.create_draw(BetType::FourD).unwrap();
        drop(first);

        // a restarted process signs with the same key
        let second = DrawEngine::open(EngineConfig::default(), &store, "pass").await.unwrap();
        assert_eq!(second.public_key_pem(), record.public_key);
        assert_eq!(second.sign(&record.numbers).unwrap(), record.signature);
    }

    #[tokio::test]
    async fn test_rotate_keys_persists() {
        let temp_dir = tempdir().unwrap();
        let store = KeyStore::new(temp_dir.path()).with_kdf_iterations(1_000);
        let engine = engine();
        let old_fingerprint = engine.fingerprint();

        let fingerprint = engine.rotate_keys(Some((&store, "pass"))).await.unwrap();
        assert_ne!(fingerprint, old_fingerprint);
        assert_eq!(engine.fingerprint(), fingerprint);

        let stored = store.load("pass").await.unwrap();
        assert_eq!(stored.fingerprint(), fingerprint);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_rotations_leave_stored_key_active() {
        let temp_dir = tempdir().unwrap();
        let store = KeyStore::new(temp_dir.path()).with_kdf_iterations(1_000);
        let engine = Arc::new(engine());

        let rotate = |engine: Arc<DrawEngine>, store: KeyStore| {
            tokio::spawn(async move { engine.rotate_keys(Some((&store, "pass"))).await })
        };
        let first = rotate(engine.clone(), store.clone());
        let second = rotate(engine.clone(), store.clone());

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert_ne!(first, second);

        let active = engine.fingerprint();
        assert!(active == first || active == second);
        assert_eq!(store.load("pass").await.unwrap().fingerprint(), active);
    }
}
