//! Remote Config Service
//!
//! The dashboard config is loaded and saved wholesale through a
//! [`ConfigBackend`]. [`HttpConfigBackend`] talks to the Oko backend over
//! HTTP; tests plug in in-memory implementations.

mod client;

pub use client::{resolve_error_message, HttpConfigBackend};

use crate::tree::DashboardConfig;
use async_trait::async_trait;
use thiserror::Error;

/// Result of a successful config update
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    /// Config as stored by the service, when it echoed one back
    pub config: Option<DashboardConfig>,
}

/// Source and sink of the dashboard config document
#[async_trait]
pub trait ConfigBackend: Send + Sync {
    /// Fetch the current config
    async fn fetch_config(&self) -> Result<DashboardConfig, RemoteError>;

    /// Replace the stored config
    async fn update_config(&self, config: &DashboardConfig) -> Result<ConfigUpdate, RemoteError>;
}

/// Errors that can occur when talking to the config service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The service could not be reached
    #[error("Backend unreachable: {message}")]
    Network { message: String },

    /// The service answered with a non-success status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The response body could not be decoded
    #[error("Failed to read backend response: {message}")]
    Parse { message: String },
}

impl RemoteError {
    /// Short error category: network, http or parse
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteError::Network { .. } => "network",
            RemoteError::Http { .. } => "http",
            RemoteError::Parse { .. } => "parse",
        }
    }

    /// HTTP status, 0 when no response was received
    pub fn status(&self) -> u16 {
        match self {
            RemoteError::Http { status, .. } => *status,
            _ => 0,
        }
    }
}
