//! Turns the conversation into a prompt and fetches the assistant's next turn,
//! rotating through the credential pool when keys run out of quota.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::ai::gemini::DEFAULT_MODEL;
use crate::ai::{CompletionBackend, GenerationRequest};
use crate::credentials::CredentialPool;
use crate::error::TransportError;
use crate::persona::{GENERIC_FAILURE_MESSAGE, QUOTA_EXHAUSTED_MESSAGE, SYSTEM_INSTRUCTION};
use crate::state::ChatTurn;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How a completion attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Generated text, verbatim.
    Reply(String),
    /// Every credential was rate limited.
    Exhausted,
    /// Any other failure. Not retried.
    Failed,
}

impl CompletionOutcome {
    /// Text of the assistant turn to append.
    pub fn into_text(self) -> String {
        match self {
            CompletionOutcome::Reply(text) => text,
            CompletionOutcome::Exhausted => QUOTA_EXHAUSTED_MESSAGE.to_string(),
            CompletionOutcome::Failed => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Flatten prior turns plus the new user text into the prompt body.
pub fn build_transcript(history: &[ChatTurn], new_text: &str) -> String {
    let mut prompt = String::new();
    for turn in history {
        prompt.push_str(turn.role.label());
        prompt.push_str(": ");
        prompt.push_str(&turn.text);
        prompt.push('\n');
    }
    prompt.push_str("User: ");
    prompt.push_str(new_text);
    prompt.push_str("\nAssistant:");
    prompt
}

pub struct CompletionClient {
    backend: Arc<dyn CompletionBackend>,
    credentials: Arc<CredentialPool>,
    model: String,
    system_instruction: String,
    timeout: Duration,
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn CompletionBackend>, credentials: Arc<CredentialPool>) -> Self {
        Self {
            backend,
            credentials,
            model: DEFAULT_MODEL.to_string(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Upper bound for a single network call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn credentials(&self) -> &Arc<CredentialPool> {
        &self.credentials
    }

    /// Produce the next assistant turn. Never returns an error; failures come back as
    /// [`CompletionOutcome::Exhausted`] or [`CompletionOutcome::Failed`].
    pub async fn complete(&self, history: &[ChatTurn], new_text: &str) -> CompletionOutcome {
        let request = GenerationRequest {
            model: self.model.clone(),
            system_instruction: self.system_instruction.clone(),
            prompt: build_transcript(history, new_text),
        };

        loop {
            let slot = self.credentials.cursor();
            let Some(credential) = self.credentials.current() else {
                warn!("no API keys configured");
                return CompletionOutcome::Failed;
            };

            debug!(slot, model = %self.model, "sending completion request");
            match self.attempt(credential, &request).await {
                Ok(text) => {
                    debug!(slot, chars = text.len(), "completion succeeded");
                    return CompletionOutcome::Reply(text);
                }
                Err(e) if e.is_quota_exceeded() => {
                    if self.credentials.advance() {
                        info!(slot, next = self.credentials.cursor(), "API key over quota, rotating");
                    } else {
                        warn!(slot, "all API keys over quota");
                        return CompletionOutcome::Exhausted;
                    }
                }
                Err(e @ TransportError::Timeout(_)) => {
                    warn!(slot, error = %e, "completion request timed out");
                    return CompletionOutcome::Failed;
                }
                Err(e) => {
                    error!(slot, error = %e, "completion request failed");
                    return CompletionOutcome::Failed;
                }
            }
        }
    }

    /// One call on one credential, bounded by the client timeout.
    async fn attempt(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<String, TransportError> {
        tokio::time::timeout(self.timeout, self.backend.generate(credential, request))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;

    fn quota() -> Result<String, TransportError> {
        Err(TransportError::Status {
            code: 429,
            body: "RESOURCE_EXHAUSTED".to_string(),
        })
    }

    fn client(backend: &Arc<ScriptedBackend>, keys: &[&str]) -> CompletionClient {
        CompletionClient::new(backend.clone(), Arc::new(CredentialPool::new(keys.to_vec())))
    }

    #[test]
    fn test_transcript_format() {
        let history = vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")];
        assert_eq!(
            build_transcript(&history, "bye"),
            "User: hi\nAssistant: hello\nUser: bye\nAssistant:"
        );
    }

    #[test]
    fn test_transcript_without_history() {
        assert_eq!(build_transcript(&[], "hi"), "User: hi\nAssistant:");
    }

    #[tokio::test]
    async fn test_success_returns_text_verbatim() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("  Kumusta! ".to_string())]));
        let client = client(&backend, &["k0", "k1"]);

        let outcome = client.complete(&[ChatTurn::assistant("hey")], "hi").await;
        assert_eq!(outcome, CompletionOutcome::Reply("  Kumusta! ".to_string()));
        assert_eq!(client.credentials().cursor(), 0);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "k0");
        assert_eq!(calls[0].1.prompt, "Assistant: hey\nUser: hi\nAssistant:");
        assert_eq!(calls[0].1.model, DEFAULT_MODEL);
        assert_eq!(calls[0].1.system_instruction, SYSTEM_INSTRUCTION);
    }

    #[tokio::test]
    async fn test_quota_on_every_key_exhausts_pool() {
        let keys = ["k0", "k1", "k2", "k3", "k4"];
        let backend = Arc::new(ScriptedBackend::new(keys.iter().map(|_| quota()).collect()));
        let client = client(&backend, &keys);

        let outcome = client.complete(&[], "hi").await;
        assert_eq!(outcome, CompletionOutcome::Exhausted);
        assert_eq!(backend.calls().len(), keys.len());
        assert_eq!(client.credentials().cursor(), keys.len() - 1);
        assert_eq!(outcome.into_text(), QUOTA_EXHAUSTED_MESSAGE);
    }

    #[tokio::test]
    async fn test_rotation_then_success_keeps_cursor() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            quota(),
            quota(),
            Ok("answer".to_string()),
            Ok("second answer".to_string()),
        ]));
        let client = client(&backend, &["k0", "k1", "k2", "k3"]);

        let outcome = client.complete(&[], "hi").await;
        assert_eq!(outcome, CompletionOutcome::Reply("answer".to_string()));
        assert_eq!(client.credentials().cursor(), 2);

        // the same prompt is resent on each key
        let calls = backend.calls();
        let keys: Vec<&str> = calls.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["k0", "k1", "k2"]);
        assert!(calls.iter().all(|(_, r)| r.prompt == calls[0].1.prompt));

        // later sends start from the rotated key
        client.complete(&[], "again").await;
        assert_eq!(backend.calls()[3].0, "k2");
        assert_eq!(client.credentials().cursor(), 2);
    }

    #[tokio::test]
    async fn test_other_errors_do_not_rotate() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(TransportError::Status {
                code: 500,
                body: "boom".to_string(),
            }),
            Err(TransportError::Network("connection reset".to_string())),
        ]));
        let client = client(&backend, &["k0", "k1"]);

        for _ in 0..2 {
            let outcome = client.complete(&[], "hi").await;
            assert_eq!(outcome, CompletionOutcome::Failed);
            assert_eq!(outcome.into_text(), GENERIC_FAILURE_MESSAGE);
            assert_eq!(client.credentials().cursor(), 0);
        }
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_pool_stays_on_last_key() {
        let backend = Arc::new(ScriptedBackend::new(vec![quota(), quota(), quota()]));
        let client = client(&backend, &["k0", "k1"]);

        assert_eq!(client.complete(&[], "a").await, CompletionOutcome::Exhausted);
        assert_eq!(client.complete(&[], "b").await, CompletionOutcome::Exhausted);
        assert_eq!(backend.calls()[2].0, "k1");
        assert_eq!(client.credentials().cursor(), 1);
    }

    #[tokio::test]
    async fn test_empty_pool_fails_without_calling() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("never".to_string())]));
        let client = client(&backend, &[]);

        assert_eq!(client.complete(&[], "hi").await, CompletionOutcome::Failed);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_generic_failure() {
        let backend = Arc::new(
            ScriptedBackend::new(vec![Ok("late".to_string())])
                .with_delay(Duration::from_secs(10)),
        );
        let client = client(&backend, &["k0", "k1"]).with_timeout(Duration::from_millis(20));

        assert_eq!(client.complete(&[], "hi").await, CompletionOutcome::Failed);
        assert_eq!(client.credentials().cursor(), 0);
    }

    #[tokio::test]
    async fn test_elapsed_call_reports_timeout_error() {
        let backend = Arc::new(
            ScriptedBackend::new(vec![Ok("late".to_string())])
                .with_delay(Duration::from_secs(10)),
        );
        let client = client(&backend, &["k0"]).with_timeout(Duration::from_millis(20));
        let request = GenerationRequest {
            model: DEFAULT_MODEL.to_string(),
            system_instruction: String::new(),
            prompt: "User: hi\nAssistant:".to_string(),
        };

        let err = client.attempt("k0", &request).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout(d) if d == Duration::from_millis(20)));
        assert!(!err.is_quota_exceeded());
        assert_eq!(err.to_string(), "request timed out after 20ms");
    }

    #[tokio::test]
    async fn test_custom_model_and_instruction() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("ok".to_string())]));
        let client = client(&backend, &["k0"])
            .with_model("gemini-2.0-flash")
            .with_system_instruction("short");

        client.complete(&[], "hi").await;
        let (_, request) = &backend.calls()[0];
        assert_eq!(request.model, "gemini-2.0-flash");
        assert_eq!(request.system_instruction, "short");
    }
}
