//! Caselog event bus and notification infrastructure.
//!
//! Building blocks for the fire-and-forget notification side of the review
//! workflow:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Handlers publish after their transaction
//!   commits; nothing here can fail or roll back a workflow operation.
//! - [`PlatformEvent`] — the canonical domain event envelope.
//! - [`delivery`] — the SMTP email channel.
//! - [`Notifier`] — background task that turns workflow events into
//!   best-effort emails to the affected user.

pub mod bus;
pub mod delivery;
pub mod notifier;

pub use bus::{event_types, EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use notifier::Notifier;
