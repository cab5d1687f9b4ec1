//! Configuration validation.
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;

use crate::config::schema::LoggerConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("server.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("logging.diagnostics_level `{0}` is not one of trace, debug, info, warn, error")]
    DiagnosticsLevel(String),
}

pub fn validate_config(config: &LoggerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.server.bind_address.clone(),
        ));
    }

    if config
        .logging
        .diagnostics_level
        .parse::<tracing::Level>()
        .is_err()
    {
        errors.push(ValidationError::DiagnosticsLevel(
            config.logging.diagnostics_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&LoggerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = LoggerConfig::default();
        config.server.bind_address = "nowhere".into();
        config.logging.diagnostics_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("nowhere".into()),
                ValidationError::DiagnosticsLevel("loud".into()),
            ]
        );
    }
}
