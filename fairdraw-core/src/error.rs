use thiserror::Error;

pub type Result<T> = std::result::Result<T, FairDrawError>;

#[derive(Error, Debug)]
pub enum FairDrawError {
    #[error("Secure random source failed: {0}")]
    Entropy(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Decryption failed: ciphertext, tag or key did not authenticate")]
    DecryptionIntegrity,

    #[error("Key error: {0}")]
    Key(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Key store error: {0}")]
    Keystore(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dialog error: {0}")]
    Dialog(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FairDrawError {
    pub fn entropy(msg: impl Into<String>) -> Self {
        Self::Entropy(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn key(msg: impl Into<String>) -> Self {
        Self::Key(msg.into())
    }

    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    pub fn keystore(msg: impl Into<String>) -> Self {
        Self::Keystore(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn dialog(msg: impl Into<String>) -> Self {
        Self::Dialog(msg.into())
    }
}

// conversion from dialoguer::Error
impl From<dialoguer::Error> for FairDrawError {
    fn from(err: dialoguer::Error) -> Self {
        FairDrawError::Dialog(err.to_string())
    }
}
