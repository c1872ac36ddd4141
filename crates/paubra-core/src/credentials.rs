//! Ordered API keys with a forward-only rotation cursor.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

/// Number of key slots the deployment provisions.
pub const MAX_CREDENTIALS: usize = 5;

/// Shared rotation state for the completion client.
///
/// The cursor only moves forward and lives as long as the pool. Conversation resets do
/// not touch it, so a process that burned through its keys keeps using the last one
/// until restart.
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl CredentialPool {
    /// Blank keys are skipped; anything past [`MAX_CREDENTIALS`] is ignored.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keys: Vec<String> = keys
            .into_iter()
            .map(Into::into)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keys.len() > MAX_CREDENTIALS {
            warn!(
                provided = keys.len(),
                "more API keys than slots, ignoring the extras"
            );
            keys.truncate(MAX_CREDENTIALS);
        }
        Self {
            keys,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Key at the cursor, `None` for an empty pool.
    pub fn current(&self) -> Option<&str> {
        self.keys.get(self.cursor()).map(String::as_str)
    }

    /// Move to the next key. Returns false, leaving the cursor alone, when already on
    /// the last one.
    pub fn advance(&self) -> bool {
        let last = self.keys.len().saturating_sub(1);
        self.cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
                (c < last).then_some(c + 1)
            })
            .is_ok()
    }
}

// Keys never end up in logs.
impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("len", &self.len())
            .field("cursor", &self.cursor())
            .finish()
    }
}
