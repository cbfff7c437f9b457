//! Communication error types and handling

use std::fmt;
use std::io;

/// Errors surfaced by the fallible driver queries and the channel adapters
#[derive(Debug, Clone, PartialEq)]
pub enum CommError {
    /// Underlying channel I/O failed
    Io { kind: io::ErrorKind, message: String },
    /// Fewer bytes arrived than the decoded fields need
    ShortResponse { expected: usize, received: usize },
    /// Version handshake sentinels did not match
    NotConnected { version_marker: u8, version_tag: u8 },
    /// Configuration error
    ConfigurationError { parameter: String, value: String },
    /// Configuration (de)serialization failed
    SerializationError { message: String },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommError::Io { kind, message } => {
                write!(f, "Channel I/O error ({:?}): {}", kind, message)
            }
            CommError::ShortResponse { expected, received } => {
                write!(f, "Short response: expected {} bytes, received {}", expected, received)
            }
            CommError::NotConnected { version_marker, version_tag } => {
                write!(
                    f,
                    "Module not responding: version sentinels 0x{:02X}/0x{:02X}",
                    version_marker, version_tag
                )
            }
            CommError::ConfigurationError { parameter, value } => {
                write!(f, "Configuration error: invalid {} = {}", parameter, value)
            }
            CommError::SerializationError { message } => {
                write!(f, "Configuration serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for CommError {}

impl From<io::Error> for CommError {
    fn from(error: io::Error) -> Self {
        CommError::Io {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for CommError {
    fn from(error: serde_json::Error) -> Self {
        CommError::SerializationError {
            message: error.to_string(),
        }
    }
}

/// Result type for communication operations
pub type CommResult<T> = Result<T, CommError>;

/// What a caller should do about a failed query.
///
/// The driver never retries on its own; this is advice for the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecoveryStrategy {
    /// Wait and then re-issue the whole query
    RetryWithDelay { delay_ms: u32 },
    /// Reopen or reconfigure the channel, then retry
    ResetAndRetry,
    /// Fail permanently
    Fail,
}

impl CommError {
    /// Get the recommended recovery strategy for this error
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            CommError::Io { .. } => RecoveryStrategy::ResetAndRetry,
            CommError::ShortResponse { .. } => RecoveryStrategy::RetryWithDelay { delay_ms: 20 },
            CommError::NotConnected { .. } => RecoveryStrategy::RetryWithDelay { delay_ms: 100 },
            CommError::ConfigurationError { .. } => RecoveryStrategy::Fail,
            CommError::SerializationError { .. } => RecoveryStrategy::Fail,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.recovery_strategy(), RecoveryStrategy::Fail)
    }
}
