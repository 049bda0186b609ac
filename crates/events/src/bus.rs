//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`PlatformEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use caselog_core::types::DbId;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Known event names published by the workflow handlers.
pub mod event_types {
    pub const REVIEW_SUBMITTED: &str = "review.submitted";
    pub const REVIEW_ASSIGNED: &str = "review.assigned";
    pub const REVIEW_VERDICT: &str = "review.verdict";
    pub const REVIEW_COMMENTED: &str = "review.commented";
    pub const REVIEW_REVISION: &str = "review.revision_submitted";
    pub const REVIEW_REOPENED: &str = "review.reopened";
    pub const NOTE_PUBLISHED: &str = "note.published";
    pub const NOTE_ARCHIVED: &str = "note.archived";
    pub const JOURNAL_GENERATED: &str = "journal.generated";
    pub const JOURNAL_PUBLISHED: &str = "journal.published";
}

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred in a workspace.
///
/// Constructed via [`PlatformEvent::new`] and enriched with the builder
/// methods [`with_source`](PlatformEvent::with_source),
/// [`with_actor`](PlatformEvent::with_actor),
/// [`with_recipient`](PlatformEvent::with_recipient), and
/// [`with_payload`](PlatformEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"review.assigned"`.
    pub event_type: String,

    /// The workspace the event belongs to.
    pub workspace_id: DbId,

    /// Optional source entity kind (e.g. `"note"`, `"review_request"`).
    pub source_entity_type: Option<String>,

    /// Optional source entity database id.
    pub source_entity_id: Option<DbId>,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Optional id of the user the event should be delivered to. Events
    /// without a recipient are observable on the bus but not emailed.
    pub recipient_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// Create a new event for a workspace with only the required fields.
    ///
    /// All optional fields default to `None` / empty object.
    pub fn new(event_type: impl Into<String>, workspace_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            workspace_id,
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            recipient_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach a source entity to the event.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Attach the user the event should be delivered to.
    pub fn with_recipient(mut self, user_id: DbId) -> Self {
        self.recipient_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`PlatformEvent`].
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// Fire-and-forget: a bus with no subscribers drops the event, which is
    /// fine — notifications are best-effort by contract.
    pub fn publish(&self, event: PlatformEvent) {
        let event_type = event.event_type.clone();
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(%event_type, receivers, "Event published");
            }
            Err(_) => {
                tracing::debug!(%event_type, "Event dropped (no subscribers)");
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
