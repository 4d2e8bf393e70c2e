//! Error types for SMTP operations.

use std::io;
use std::time::Duration;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Server returned error response.
    #[error("SMTP error {code}: {message}")]
    SmtpError {
        /// Reply code (e.g., 550).
        code: u16,
        /// Error message from server.
        message: String,
    },

    /// Protocol error (unexpected or malformed response).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid email address.
    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress {
        /// The rejected input.
        address: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Message exceeds the size the server advertised.
    #[error("Message exceeds size limit: {size} bytes (server accepts {limit})")]
    MessageTooLarge {
        /// Rendered message size.
        size: usize,
        /// Limit advertised through the SIZE extension.
        limit: usize,
    },

    /// The envelope has nobody to deliver to.
    #[error("Message has no recipients")]
    NoRecipients,

    /// Feature not supported by server.
    #[error("Server does not support {0}")]
    NotSupported(String),

    /// The exchange did not finish within the configured bound.
    #[error("SMTP exchange timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Creates an SMTP error from a reply code and message.
    #[must_use]
    pub fn smtp_error(code: u16, message: impl Into<String>) -> Self {
        Self::SmtpError {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_address(address: &str, reason: &'static str) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smtp_error_shows_code_and_text() {
        let err = Error::smtp_error(550, "no such user");
        assert!(matches!(err, Error::SmtpError { code: 550, .. }));
        assert_eq!(err.to_string(), "SMTP error 550: no such user");
    }

    #[test]
    fn invalid_address_names_input() {
        let err = Error::invalid_address("nobody", "address must contain exactly one @");
        assert_eq!(
            err.to_string(),
            "Invalid email address 'nobody': address must contain exactly one @"
        );
    }
}
