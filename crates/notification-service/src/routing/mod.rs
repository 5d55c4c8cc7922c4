//! Notification routing.
//!
//! Criticality decision, preference consultation, channel invocation and
//! result aggregation for a single notification.

mod router;
mod types;

pub use router::NotificationRouter;
pub use types::{NotificationResult, SendNotificationParams};
