//! Domain model definitions.

mod device;
mod enums;
mod inapp;
mod preferences;
mod sms_log;

pub use device::DeviceToken;
pub use enums::{DeviceType, NotificationLevel, SmsStatus};
pub use inapp::{InAppNotification, METADATA_EVENT_ID, NewInAppNotification};
pub use preferences::FarmerPreferences;
pub use sms_log::{NewSmsDeliveryLog, SmsDeliveryLog};
