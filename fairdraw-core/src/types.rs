use crate::error::{FairDrawError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use uuid::Uuid;

/// Bet catalog entry.
///
/// The base types reveal 2, 3 or 4 digits. The positional 2D types are
/// settled against a 4D draw: front takes its first two digits, middle the
/// second and third, back the last two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetType {
    #[serde(rename = "2D")]
    TwoD,
    #[serde(rename = "3D")]
    ThreeD,
    #[serde(rename = "4D")]
    FourD,
    #[serde(rename = "2D-FRONT")]
    TwoDFront,
    #[serde(rename = "2D-MIDDLE")]
    TwoDMiddle,
    #[serde(rename = "2D-BACK")]
    TwoDBack,
}

impl BetType {
    pub const ALL: [BetType; 6] = [
        BetType::TwoD,
        BetType::ThreeD,
        BetType::FourD,
        BetType::TwoDFront,
        BetType::TwoDMiddle,
        BetType::TwoDBack,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BetType::TwoD => "2D",
            BetType::ThreeD => "3D",
            BetType::FourD => "4D",
            BetType::TwoDFront => "2D-FRONT",
            BetType::TwoDMiddle => "2D-MIDDLE",
            BetType::TwoDBack => "2D-BACK",
        }
    }

    /// The base type whose draw this bet is settled against
    pub fn base(&self) -> BetType {
        match self {
            BetType::TwoDFront | BetType::TwoDMiddle | BetType::TwoDBack => BetType::FourD,
            other => *other,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.base() != *self
    }

    /// Digits drawn for this bet type, i.e. the length of its base draw
    pub fn digit_count(&self) -> usize {
        match self.base() {
            BetType::TwoD => 2,
            BetType::ThreeD => 3,
            _ => 4,
        }
    }

    /// Positions of the drawn digits this bet is settled on
    pub fn winning_positions(&self) -> Range<usize> {
        match self {
            BetType::TwoDFront => 0..2,
            BetType::TwoDMiddle => 1..3,
            BetType::TwoDBack => 2..4,
            base => 0..base.digit_count(),
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BetType {
    type Err = FairDrawError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace(['_', ' '], "-");
        BetType::ALL
            .into_iter()
            .find(|bet_type| bet_type.name() == normalized)
            .ok_or_else(|| {
                FairDrawError::invalid_parameter(format!(
                    "Unknown bet type '{}', expected one of {}",
                    s.trim(),
                    BetType::ALL.map(|b| b.name()).join(", ")
                ))
            })
    }
}

/// Seed and its published hash, produced before any number is revealed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCommitment {
    pub seed: String,
    pub commitment: String,
    pub timestamp_ms: i64,
}

/// AES-256-GCM output, every field hex encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub ciphertext: String,
    pub iv: String,
    pub tag: String,
}

/// Everything a caller persists and later reveals for one draw.
///
/// A record starts open; `completed` is set once the draw is closed and its
/// seed may be published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawRecord {
    pub draw_id: Uuid,
    pub bet_type: BetType,
    pub numbers: Vec<u32>,
    pub seed: String,
    pub commitment: String,
    pub signature: String,
    pub public_key: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl DrawRecord {
    pub fn canonical_numbers(&self) -> String {
        canonical_numbers(&self.numbers)
    }

    /// The drawn digits this record's bet type is settled on
    pub fn winning_numbers(&self) -> &[u32] {
        self.numbers
            .get(self.bet_type.winning_positions())
            .unwrap_or(&[])
    }

    /// Close the draw. Completing twice keeps the first completion time.
    pub fn mark_completed(&mut self) {
        if !self.completed {
            self.completed = true;
            self.completed_at = Some(Utc::now());
        }
    }
}

/// Result of re-checking a revealed draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawAudit {
    pub commitment_valid: bool,
    pub numbers_match: bool,
    pub signature_valid: bool,
}

impl DrawAudit {
    pub fn is_valid(&self) -> bool {
        self.commitment_valid && self.numbers_match && self.signature_valid
    }
}

/// The exact byte string that gets signed: `[8, 2, 4, 9]` becomes `"8,2,4,9"`
pub fn canonical_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
