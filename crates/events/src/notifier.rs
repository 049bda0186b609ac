//! Event-to-email notification routing.
//!
//! [`Notifier`] subscribes to the event bus and delivers a plain-text email
//! to the event's recipient. Delivery is strictly best-effort: a failed
//! send is logged and dropped, never retried into the workflow path — the
//! transition that produced the event has already committed.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use caselog_db::repositories::UserRepo;
use caselog_db::DbPool;

use crate::bus::{event_types, PlatformEvent};
use crate::delivery::email::EmailDelivery;

/// Routes workflow events to user notification emails.
pub struct Notifier {
    pool: DbPool,
    delivery: Option<EmailDelivery>,
}

impl Notifier {
    /// Create a new notifier.
    ///
    /// `delivery` is `None` when SMTP is not configured; events are then
    /// consumed and dropped, keeping bus backpressure behaviour identical
    /// in every environment.
    pub fn new(pool: DbPool, delivery: Option<EmailDelivery>) -> Self {
        Self { pool, delivery }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event
    /// until the bus closes or `cancel` fires.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notifier cancelled");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => {
                        if let Err(e) = self.route_event(&event).await {
                            tracing::warn!(
                                error = %e,
                                event_type = %event.event_type,
                                "Failed to deliver notification"
                            );
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Notifier lagged behind the event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, notifier shutting down");
                        break;
                    }
                },
            }
        }
    }

    /// Deliver a single event to its recipient, if it has one and email is
    /// configured.
    async fn route_event(
        &self,
        event: &PlatformEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(delivery) = &self.delivery else {
            return Ok(());
        };
        let Some(recipient_id) = event.recipient_user_id else {
            return Ok(());
        };

        let Some(email) = UserRepo::find_email(&self.pool, recipient_id).await? else {
            tracing::warn!(
                recipient_id,
                event_type = %event.event_type,
                "Notification recipient has no user row"
            );
            return Ok(());
        };

        let (subject, body) = render(event);
        delivery.deliver(&email, &subject, &body).await?;
        Ok(())
    }
}

/// Render an event into an email subject and plain-text body.
fn render(event: &PlatformEvent) -> (String, String) {
    let headline = match event.event_type.as_str() {
        event_types::REVIEW_SUBMITTED => "A note was submitted for review",
        event_types::REVIEW_ASSIGNED => "A review was assigned to you",
        event_types::REVIEW_VERDICT => "Your note received a review verdict",
        event_types::REVIEW_COMMENTED => "New comment on a review request",
        event_types::REVIEW_REVISION => "Revised content was submitted for review",
        event_types::REVIEW_REOPENED => "A review request was reopened",
        event_types::NOTE_PUBLISHED => "Your note was published",
        event_types::NOTE_ARCHIVED => "A note was archived",
        event_types::JOURNAL_GENERATED => "A journal draft was generated",
        event_types::JOURNAL_PUBLISHED => "A journal was published",
        other => other,
    };

    let subject = format!("[Caselog] {headline}");
    let body = format!(
        "{headline}.\n\nTime: {}\nDetails: {}\n",
        event.timestamp,
        serde_json::to_string_pretty(&event.payload).unwrap_or_default()
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::PlatformEvent;

    #[test]
    fn render_known_event_uses_headline() {
        let event = PlatformEvent::new(event_types::REVIEW_ASSIGNED, 1)
            .with_payload(serde_json::json!({ "request_id": 5 }));
        let (subject, body) = render(&event);
        assert_eq!(subject, "[Caselog] A review was assigned to you");
        assert!(body.contains("request_id"));
    }

    #[test]
    fn render_unknown_event_falls_back_to_type() {
        let event = PlatformEvent::new("something.else", 1);
        let (subject, _) = render(&event);
        assert_eq!(subject, "[Caselog] something.else");
    }
}
