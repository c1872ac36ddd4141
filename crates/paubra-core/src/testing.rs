//! Scripted backend for exercising rotation and session flow in tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::ai::{CompletionBackend, GenerationRequest};
use crate::error::TransportError;

pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, TransportError>>>,
    calls: Mutex<Vec<(String, GenerationRequest)>>,
    delay: Option<Duration>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<String, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Credential and request of every call, in order.
    pub fn calls(&self) -> Vec<(String, GenerationRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<String, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((credential.to_string(), request.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".to_string())))
    }
}
