//! Error types and handling for the Culex forecast service

use thiserror::Error;

/// Main error type for the Culex service
#[derive(Error, Debug)]
pub enum CulexError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The forwarded call to the forecast provider did not complete
    #[error("Forwarding error: {message}")]
    Forwarding { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl CulexError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new forwarding error
    pub fn forwarding<S: Into<String>>(message: S) -> Self {
        Self::Forwarding {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CulexError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            CulexError::Forwarding { .. } => {
                "The forecast provider is currently unavailable.".to_string()
            }
            CulexError::Io { .. } => {
                "I/O operation failed. Is the port already in use?".to_string()
            }
        }
    }
}
