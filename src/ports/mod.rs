//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the trigger into the application
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod notifier;
pub mod outbound;

pub use inbound::ScanTrigger;
pub use notifier::NotificationSender;
pub use outbound::{DispatchObserver, EventStore, UserDirectory};
