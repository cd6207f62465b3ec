//! Client-specific error types

use tagwire_codec::CodecError;
use thiserror::Error;

/// Client-specific errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected to server
    #[error("Not connected")]
    NotConnected,

    /// Send operation failed
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Receive operation failed
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// Timeout
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The server answered with an error header
    #[error("Remote error from {method} (seq {seq}): {message}")]
    Remote {
        method: String,
        seq: u64,
        message: String,
    },

    /// Encoding or decoding failed
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Whether the connection is unusable after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionFailed(_)
                | ClientError::NotConnected
                | ClientError::SendFailed(_)
                | ClientError::ReceiveFailed(_)
                | ClientError::Timeout(_)
        )
    }
}

/// Client result type
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::ConnectionFailed("test".to_string());
        assert_eq!(err.to_string(), "Connection failed: test");

        let err = ClientError::Remote {
            method: "Arith.Div".to_string(),
            seq: 3,
            message: "divide by zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Remote error from Arith.Div (seq 3): divide by zero"
        );
    }

    #[test]
    fn test_codec_conversion() {
        let err: ClientError = CodecError::RequiredFieldNotSet("name".to_string()).into();
        assert!(matches!(err, ClientError::Codec(_)));
        assert!(!err.is_fatal());
        assert!(ClientError::Timeout("read".to_string()).is_fatal());
    }
}
