//! Startup checks.
//!
//! # Responsibilities
//! - Refuse to start on a host platform the agent does not support
//! - Classify startup failures for the process entry point
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and not retried

use thiserror::Error;

use crate::config::{ConfigError, PlatformConfig};

/// The host platform cannot run this agent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CapabilityError {
    message: String,
}

impl CapabilityError {
    /// Diagnose from the host OS name.
    pub fn new() -> Self {
        Self::with_message(format!(
            "{} is not a supported platform for this adaptor.",
            std::env::consts::OS
        ))
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for CapabilityError {
    fn default() -> Self {
        Self::new()
    }
}

/// Any failure that aborts startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    UnsupportedPlatform(#[from] CapabilityError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check the host OS against the supported list.
pub fn check_platform(config: &PlatformConfig) -> Result<(), CapabilityError> {
    check_os(config, std::env::consts::OS)
}

fn check_os(config: &PlatformConfig, os: &str) -> Result<(), CapabilityError> {
    if config.supported.iter().any(|p| p.eq_ignore_ascii_case(os)) {
        tracing::debug!(os = %os, "Platform supported");
        Ok(())
    } else {
        Err(CapabilityError::with_message(format!(
            "{os} is not a supported platform for this adaptor."
        )))
    }
}
