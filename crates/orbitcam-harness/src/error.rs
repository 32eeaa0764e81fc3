use orbitcam_core::{PhaseError, SettingsError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Exit code reported when a replay digest differs from the expected one.
pub const EXIT_CHECKSUM_MISMATCH: i32 = 3;

/// Exit code for malformed traces and bad arguments.
pub const EXIT_INVALID_INPUT: i32 = 2;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("trace error: {0}")]
    Phase(#[from] PhaseError),

    #[error("invalid trace: {reason}")]
    InvalidTrace { reason: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

impl HarnessError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ChecksumMismatch { .. } => EXIT_CHECKSUM_MISMATCH,
            Self::InvalidTrace { .. } | Self::InvalidArgument { .. } | Self::Phase(_) => {
                EXIT_INVALID_INPUT
            }
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid_trace(reason: impl Into<String>) -> Self {
        Self::InvalidTrace {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HarnessError;

    #[test]
    fn checksum_mismatch_has_dedicated_exit_code() {
        let error = HarnessError::ChecksumMismatch {
            expected: "aa".into(),
            actual: "bb".into(),
        };
        assert_eq!(error.exit_code(), 3);
        assert_eq!(error.to_string(), "checksum mismatch: expected aa, got bb");
    }

    #[test]
    fn malformed_input_maps_to_exit_two() {
        assert_eq!(HarnessError::invalid_trace("no header").exit_code(), 2);
        assert_eq!(HarnessError::invalid("bad").exit_code(), 2);
        assert_eq!(
            HarnessError::from(orbitcam_core::PhaseError(9)).exit_code(),
            2
        );
    }

    #[test]
    fn io_errors_exit_one() {
        let error = HarnessError::from(std::io::Error::other("disk"));
        assert_eq!(error.exit_code(), 1);
        assert_eq!(error.to_string(), "I/O error: disk");
    }
}
