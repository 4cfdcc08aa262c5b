use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Key too large for RSA modulus: at most {max} bytes can be wrapped, got {got}")]
    KeyTooLarge { max: usize, got: usize },

    #[error("RSA key wrap failed: {0}")]
    WrapFailed(String),

    #[error("RSA key unwrap failed: {0}")]
    UnwrapFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Key material could not be loaded: {0}")]
    KeyLoad(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}
