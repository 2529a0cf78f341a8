//! Sending lists of messages.

use crate::backend::{DispatchOutcome, ResendBackend, MISSING_CREDENTIALS};
use crate::errors::{ConfigurationError, DeliveryError};
use crate::message::OutgoingMessage;
use crate::transport::Transport;

/// Outcome of one message in a [`BatchReport`].
#[derive(Debug)]
pub struct DeliveryResult {
    /// Position of the message in the input slice.
    pub index: usize,
    pub outcome: DispatchOutcome,
}

/// Per-message outcomes of [`ResendBackend::deliver_all`], in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<DeliveryResult>,
}

impl BatchReport {
    pub fn sent(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.sent()
    }

    pub fn errors(&self) -> impl Iterator<Item = (usize, &DeliveryError)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().err().map(|e| (r.index, e)))
    }
}

impl<T: Transport> ResendBackend<T> {
    /// Sends `messages` one after another and returns how many were sent.
    ///
    /// In strict mode the first failure is returned as-is and the remaining
    /// messages are not attempted; the number already sent is not reported.
    /// In silent mode failures are logged and skipped, and a degraded config
    /// simply yields `0`.
    pub fn send_messages(&self, messages: &[OutgoingMessage]) -> Result<usize, DeliveryError> {
        if messages.is_empty() {
            return Ok(0);
        }
        let fail_silently = self.config.fail_silently();
        if self.config.is_degraded() {
            if !fail_silently {
                return Err(ConfigurationError::new(MISSING_CREDENTIALS).into());
            }
            return Ok(0);
        }

        let mut num_sent = 0;
        for message in messages {
            match self.send_message(message) {
                Ok(_) => num_sent += 1,
                Err(err) if !fail_silently => return Err(err),
                Err(err) => {
                    self.logger
                        .error(&format!("Failed to send email via Resend: {}", err));
                }
            }
        }
        Ok(num_sent)
    }

    /// Attempts every message regardless of failures and reports each outcome.
    pub fn deliver_all(&self, messages: &[OutgoingMessage]) -> BatchReport {
        let results = messages
            .iter()
            .enumerate()
            .map(|(index, message)| DeliveryResult {
                index,
                outcome: self.send_message(message),
            })
            .collect();
        BatchReport { results }
    }
}
