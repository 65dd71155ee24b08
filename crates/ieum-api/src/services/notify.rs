//! Best-effort webhook fan-out for email notification.
//!
//! One webhook POST per recipient, paced by a fixed inter-request delay
//! and a concurrency cap. Individual failures never abort the batch.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, warn};

use ieum_core::{Error, NotifyConfig, Result};

/// Default webhook request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport-level outcome for one recipient.
///
/// `Sent` records the response status but still counts toward the
/// public `sent_count` even when it is not 2xx: the upstream workflow
/// acknowledges acceptance, not delivery, and the original service only
/// detected failures that surfaced as transport errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The request completed; the webhook answered with this status code.
    Sent(u16),
    /// The request never completed (connect/timeout/DNS failure).
    TransportError(String),
}

/// Per-recipient fan-out result.
#[derive(Debug, Clone)]
pub struct NotifyOutcome {
    pub recipient: String,
    pub status: DeliveryStatus,
}

impl NotifyOutcome {
    /// Whether this outcome counts toward `sent_count`.
    pub fn counts_as_sent(&self) -> bool {
        matches!(self.status, DeliveryStatus::Sent(_))
    }
}

/// Webhook fan-out sender.
pub struct WebhookNotifier {
    client: Client,
    config: NotifyConfig,
}

impl WebhookNotifier {
    /// Create a new notifier for the configured webhook and recipients.
    pub fn new(config: NotifyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Notify(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Number of configured recipients.
    pub fn recipient_count(&self) -> usize {
        self.config.recipients.len()
    }

    /// Send `subject`/`html_body` to every configured recipient.
    ///
    /// Request launches are spaced by the configured delay with at most
    /// `concurrency` requests in flight. Outcomes are returned in
    /// recipient order; nothing here ever fails the batch.
    pub async fn broadcast(&self, subject: &str, html_body: &str) -> Vec<NotifyOutcome> {
        let delay = Duration::from_millis(self.config.delay_ms);
        let concurrency = self.config.concurrency.max(1);

        let recipients: Vec<String> = self.config.recipients.clone();
        let outcomes: Vec<NotifyOutcome> = stream::iter(recipients.into_iter().enumerate())
            .then(|(index, recipient)| async move {
                if index > 0 {
                    tokio::time::sleep(delay).await;
                }
                recipient
            })
            .map(|recipient| async move { self.send_one(&recipient, subject, html_body).await })
            .buffered(concurrency)
            .collect()
            .await;

        let sent = outcomes.iter().filter(|o| o.counts_as_sent()).count();
        debug!(
            sent_count = sent,
            recipient_count = outcomes.len(),
            "Webhook fan-out complete"
        );
        outcomes
    }

    async fn send_one(&self, recipient: &str, subject: &str, html_body: &str) -> NotifyOutcome {
        let payload = serde_json::json!({
            "email": recipient,
            "subject": subject,
            "body": html_body,
        });

        match self
            .client
            .post(&self.config.webhook_url)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    warn!(recipient, %status, "Webhook answered with non-success status");
                }
                NotifyOutcome {
                    recipient: recipient.to_string(),
                    status: DeliveryStatus::Sent(status.as_u16()),
                }
            }
            Err(e) => {
                warn!(recipient, error = %e, "Webhook request failed");
                NotifyOutcome {
                    recipient: recipient.to_string(),
                    status: DeliveryStatus::TransportError(e.to_string()),
                }
            }
        }
    }
}
