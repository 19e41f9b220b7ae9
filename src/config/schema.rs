//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the agent.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the agent's HTTP layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AgentConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Feed archival settings.
    pub archive: ArchiveConfig,

    /// Diagnostic handler settings.
    pub diagnostic: DiagnosticConfig,

    /// Host platforms the agent may start on.
    pub platform: PlatformConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5678").
    pub bind_address: String,

    /// Largest request body read into an exchange, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5678".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log request line and headers for every exchange.
    pub trace_requests: bool,

    /// Log response headers for every exchange.
    pub trace_responses: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            trace_requests: false,
            trace_responses: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Feed archive configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Directory receiving archived feeds. Unset disables archival.
    pub directory: Option<PathBuf>,

    /// Capacity of the background archive queue.
    pub queue_capacity: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            directory: None,
            queue_capacity: 64,
        }
    }
}

/// Diagnostic handler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiagnosticConfig {
    /// Mount the diagnostic handler.
    pub enabled: bool,

    /// Path the handler is mounted on; requests must match it exactly.
    pub mount_path: String,

    /// Blocking wait before answering, in milliseconds.
    pub delay_ms: u64,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mount_path: "/delay".to_string(),
            delay_ms: 0,
        }
    }
}

/// Supported host platforms, by `std::env::consts::OS` name.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub supported: Vec<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            supported: vec!["linux".to_string(), "macos".to_string(), "windows".to_string()],
        }
    }
}
