pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::error::TransportError;

/// One text-generation call, minus the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: String,
    pub prompt: String,
}

/// Transport to a hosted text-generation endpoint.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<String, TransportError>;
}
