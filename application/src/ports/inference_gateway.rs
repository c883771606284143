//! Inference gateway port
//!
//! Defines the interface for communicating with the text-generation backend.

use async_trait::async_trait;
use divebar_domain::{GenerationRequest, GenerationResult};
use thiserror::Error;

/// Errors that can occur during inference gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for text generation
///
/// This port defines how the application layer talks to the backend.
/// Implementations (adapters) live in the infrastructure layer. Callers
/// serialize access themselves; adapters need not support concurrent calls.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Verify the backend is usable before a session starts.
    async fn initialize(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    /// Generate one completion for the request
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, GatewayError>;

    /// Model used when a request carries no override
    fn model_name(&self) -> &str;
}
