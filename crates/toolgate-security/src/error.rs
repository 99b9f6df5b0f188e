//! Errors for token management, encryption, validation, and threat blocking.

use toolgate_core::GatewayError;

/// Errors raised by the security components.
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    /// No active token matched the supplied value.
    #[error("token not found")]
    TokenNotFound,
    /// The token was found but is inactive or past its expiry.
    #[error("token expired or inactive")]
    TokenInactive,
    /// A field failed validation.
    #[error("validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },
    /// A known injection substring was found in a string field.
    #[error("possible injection attempt in field '{field}'")]
    InjectionAttempt { field: String },
    /// Ciphertext named a key version not present in the rotation history.
    #[error("unknown key version {version}")]
    UnknownKeyVersion { version: u8 },
    /// AEAD open/seal failed (corrupt ciphertext or wrong key).
    #[error("encryption operation failed")]
    CryptoFailure,
    /// The threat detector has marked this user as blocked.
    #[error("user '{user_id}' is blocked by the threat detector")]
    Blocked { user_id: String },
}

impl From<SecurityError> for GatewayError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::TokenNotFound | SecurityError::TokenInactive => {
                GatewayError::AuthenticationFailed(err.to_string())
            }
            SecurityError::ValidationFailed { .. } | SecurityError::InjectionAttempt { .. } => {
                GatewayError::InvalidInput(err.to_string())
            }
            SecurityError::UnknownKeyVersion { .. } | SecurityError::CryptoFailure => {
                GatewayError::InvalidInput(err.to_string())
            }
            SecurityError::Blocked { user_id } => GatewayError::Forbidden(format!(
                "user '{user_id}' is blocked by the threat detector"
            )),
        }
    }
}
