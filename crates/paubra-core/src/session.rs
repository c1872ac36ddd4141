//! One chat session: the conversation plus the single-flight send state.
//!
//! A send moves `Idle -> Sending -> Idle`. Rotation and failures happen inside the
//! completion client; whatever it returns becomes an assistant turn.

use thiserror::Error;
use tracing::debug;

use crate::completion::{CompletionClient, CompletionOutcome};
use crate::conversation::Conversation;
use crate::state::ChatTurn;
use crate::store::HistoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
}

/// Why a submission was refused. Nothing is appended in either case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendRejected {
    #[error("message is empty")]
    Empty,
    #[error("still waiting for the previous reply")]
    Busy,
}

/// A send that has been accepted and is waiting for the completion.
#[derive(Debug, Clone)]
pub struct PendingSend {
    /// Turns before the new user message.
    pub history: Vec<ChatTurn>,
    pub text: String,
}

impl PendingSend {
    pub async fn run(&self, client: &CompletionClient) -> CompletionOutcome {
        client.complete(&self.history, &self.text).await
    }
}

pub struct ChatSession {
    conversation: Conversation,
    state: SendState,
}

impl ChatSession {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            conversation,
            state: SendState::Idle,
        }
    }

    pub fn load(store: Box<dyn HistoryStore>) -> Self {
        Self::new(Conversation::load(store))
    }

    pub fn turns(&self) -> &[ChatTurn] {
        self.conversation.turns()
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        self.state == SendState::Sending
    }

    /// Accept `input` as the next user turn and enter `Sending`.
    pub fn begin_send(&mut self, input: &str) -> Result<PendingSend, SendRejected> {
        if self.is_sending() {
            return Err(SendRejected::Busy);
        }
        if input.trim().is_empty() {
            return Err(SendRejected::Empty);
        }

        let history = self.conversation.turns().to_vec();
        self.conversation.append(ChatTurn::user(input));
        self.state = SendState::Sending;
        debug!(turns = history.len(), "user turn accepted");

        Ok(PendingSend {
            history,
            text: input.to_string(),
        })
    }

    /// Append the outcome as the assistant turn and return to `Idle`.
    pub fn finish_send(&mut self, outcome: CompletionOutcome) -> &ChatTurn {
        self.conversation.append(ChatTurn::assistant(outcome.into_text()));
        self.state = SendState::Idle;
        self.conversation.last()
    }

    /// Full send for callers that can await in place.
    pub async fn send(
        &mut self,
        client: &CompletionClient,
        input: &str,
    ) -> Result<&ChatTurn, SendRejected> {
        let pending = self.begin_send(input)?;
        let outcome = pending.run(client).await;
        Ok(self.finish_send(outcome))
    }

    /// Clear the conversation. The credential cursor is deliberately left alone.
    pub fn reset(&mut self) {
        self.conversation.reset();
    }
}
