//! Error types for the quantum-teleport ecosystem

use std::path::PathBuf;
use thiserror::Error;

use qt_protocol::{Role, Step};

/// Failures of the five session operations.
///
/// Every variant is surfaced synchronously on the request/response
/// surface; the gateway reports them as a terminal `error` frame instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Unknown session id
    #[error("session not found")]
    NotFound,

    /// Another client already holds the role
    #[error("role already taken: {0}")]
    RoleTaken(Role),

    /// Expired, already-left, or forged token
    #[error("unknown participant token")]
    InvalidToken,

    /// The role gate denies this role at the current step
    #[error("role {role} is not permitted to perform step {step}")]
    NotAllowed { role: Role, step: Step },

    /// The session is parked at the terminal step
    #[error("session already complete")]
    AlreadyComplete,
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_messages_are_human_readable() {
        assert_eq!(SessionError::NotFound.to_string(), "session not found");
        assert_eq!(
            SessionError::RoleTaken(Role::Alice).to_string(),
            "role already taken: alice"
        );
        assert_eq!(
            SessionError::NotAllowed {
                role: Role::Bob,
                step: Step::Measure,
            }
            .to_string(),
            "role bob is not permitted to perform step measure"
        );
    }
}
