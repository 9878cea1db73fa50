//! Error types for the relayctl core.

use thiserror::Error;

/// Core error type for panel operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Other(String),
}

/// Device registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid device name: {0}")]
    InvalidName(String),

    #[error("Invalid device address: {0}")]
    InvalidAddress(String),

    #[error("Address already registered: {0}")]
    DuplicateAddress(String),

    #[error("Device not found: {0}")]
    NotFound(u64),
}

/// Errors from a single HTTP exchange with a device
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Device returned HTTP {0}")]
    Http(u16),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Roster persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::DuplicateAddress("192.168.4.2".to_string());
        assert_eq!(
            format!("{}", err),
            "Address already registered: 192.168.4.2"
        );
    }

    #[test]
    fn test_exchange_error_display() {
        let err = ExchangeError::Timeout(8000);
        assert_eq!(format!("{}", err), "Request timed out after 8000 ms");
        let err = ExchangeError::Http(503);
        assert_eq!(format!("{}", err), "Device returned HTTP 503");
    }

    #[test]
    fn test_core_error_from_registry_error() {
        let err = CoreError::from(RegistryError::NotFound(7));
        assert!(format!("{}", err).contains("Device not found: 7"));
    }

    #[test]
    fn test_core_error_from_exchange_error() {
        let err = CoreError::from(ExchangeError::Transport("connection refused".to_string()));
        assert!(format!("{}", err).contains("connection refused"));
    }
}
