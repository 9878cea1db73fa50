//! Error types for the relayctl CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific
//! variants.

use relayctl_core::error::{CoreError, RegistryError, StorageError};
use thiserror::Error;

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const DEVICE_ERROR: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
    pub const PARTIAL_FAILURE: i32 = 5;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No device matches '{0}'")]
    UnknownDevice(String),

    #[error("Device did not respond: {0}")]
    ExchangeFailed(String),

    #[error("Partial failure: {succeeded} succeeded, {failed} failed")]
    PartialFailure { succeeded: usize, failed: usize },

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => match e {
                CoreError::Registry(RegistryError::NotFound(_)) => exit_codes::DEVICE_ERROR,
                CoreError::Registry(_) => exit_codes::INVALID_ARGS,
                CoreError::Exchange(_) => exit_codes::NETWORK_ERROR,
                CoreError::Storage(_) => exit_codes::GENERAL_ERROR,
                CoreError::Other(_) => exit_codes::GENERAL_ERROR,
            },
            CliError::Io(_) => exit_codes::GENERAL_ERROR,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::UnknownDevice(_) => exit_codes::DEVICE_ERROR,
            CliError::ExchangeFailed(_) => exit_codes::NETWORK_ERROR,
            CliError::PartialFailure { .. } => exit_codes::PARTIAL_FAILURE,
            CliError::Other(_) => exit_codes::GENERAL_ERROR,
        }
    }
}

// Conversions from core error subtypes to CliError
impl From<RegistryError> for CliError {
    fn from(e: RegistryError) -> Self {
        CliError::Core(CoreError::Registry(e))
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        CliError::Core(CoreError::Storage(e))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use relayctl_core::error::ExchangeError;

    #[test]
    fn test_exit_code_mapping() {
        let err = CliError::Core(CoreError::Registry(RegistryError::NotFound(3)));
        assert_eq!(err.exit_code(), exit_codes::DEVICE_ERROR);

        let err = CliError::Core(CoreError::Registry(RegistryError::InvalidAddress(
            "999.1.1.1".to_string(),
        )));
        assert_eq!(err.exit_code(), exit_codes::INVALID_ARGS);

        let err = CliError::Core(CoreError::Exchange(ExchangeError::Timeout(8000)));
        assert_eq!(err.exit_code(), exit_codes::NETWORK_ERROR);

        let err = CliError::PartialFailure {
            succeeded: 2,
            failed: 1,
        };
        assert_eq!(err.exit_code(), exit_codes::PARTIAL_FAILURE);
    }

    #[test]
    fn test_unknown_device_display() {
        let err = CliError::UnknownDevice("garage".to_string());
        assert_eq!(format!("{}", err), "No device matches 'garage'");
    }
}
