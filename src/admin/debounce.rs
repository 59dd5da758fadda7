//! Search input debouncing
//!
//! Keystrokes are pushed into a channel; [`SearchDebouncer::next`] yields the
//! latest text once the input has been quiet for the configured delay.

use std::time::Duration;
use tokio::sync::mpsc;

/// Quiet period before a search is issued
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

pub struct SearchDebouncer {
    rx: mpsc::UnboundedReceiver<String>,
    delay: Duration,
    last_emitted: Option<String>,
}

impl SearchDebouncer {
    /// Create a debouncer and the sender that feeds it
    pub fn new(delay: Duration) -> (mpsc::UnboundedSender<String>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            rx,
            delay,
            last_emitted: None,
        };
        (tx, debouncer)
    }

    /// Wait for the next settled value.
    ///
    /// A value equal to the previously emitted one is swallowed. Pending input
    /// is flushed when the sender is dropped; after that `None` is returned.
    pub async fn next(&mut self) -> Option<String> {
        loop {
            let mut pending = self.rx.recv().await?;

            loop {
                match tokio::time::timeout(self.delay, self.rx.recv()).await {
                    Ok(Some(value)) => pending = value,
                    // Closed or quiet: settle on what we have
                    Ok(None) | Err(_) => break,
                }
            }

            if self.last_emitted.as_deref() != Some(pending.as_str()) {
                self.last_emitted = Some(pending.clone());
                return Some(pending);
            }
        }
    }
}
