//! User-facing services.
//!
//! The produced interface of the engine besides routing itself: preference
//! get/update, device-token register/unregister and the in-app inbox.

mod device_service;
mod inbox_service;
mod preference_service;

pub use device_service::DeviceTokenService;
pub use inbox_service::{InboxService, ListParams};
pub use preference_service::{PreferenceService, UpdatePreferencesRequest};
