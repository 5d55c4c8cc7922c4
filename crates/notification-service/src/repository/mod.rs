//! Database repository layer.

mod device_token_repo;
mod inapp_repo;
mod preferences_repo;
mod sms_log_repo;
pub mod traits;

pub use device_token_repo::DeviceTokenRepository;
pub use inapp_repo::InAppRepository;
pub use preferences_repo::PreferencesRepository;
pub use sms_log_repo::SmsLogRepository;
pub use traits::{
    DeviceTokenRepositoryTrait, InAppRepositoryTrait, PreferencesRepositoryTrait,
    SmsLogRepositoryTrait,
};
