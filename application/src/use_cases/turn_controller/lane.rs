//! Exclusive inference lane
//!
//! The backend is not assumed safe for concurrent use, so every call goes
//! through one async mutex: at most one generation is in flight at a time.

use crate::ports::inference_gateway::{GatewayError, InferenceGateway};
use divebar_domain::{GenerationRequest, GenerationResult};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Serialized access to an [`InferenceGateway`]
#[derive(Clone)]
pub struct InferenceLane {
    gateway: Arc<dyn InferenceGateway>,
    gate: Arc<Mutex<()>>,
}

impl InferenceLane {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self {
            gateway,
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub async fn initialize(&self) -> Result<(), GatewayError> {
        let _guard = self.gate.lock().await;
        self.gateway.initialize().await
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, GatewayError> {
        let _guard = self.gate.lock().await;
        debug!(
            messages = request.messages.len(),
            stops = request.stop.len(),
            "Dispatching generation"
        );
        self.gateway.generate(request).await
    }

    pub fn model_name(&self) -> &str {
        self.gateway.model_name()
    }
}
