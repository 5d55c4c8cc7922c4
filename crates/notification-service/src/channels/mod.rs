//! Delivery channels.
//!
//! SMS and push delivery on top of provider capability interfaces supplied
//! at construction time, so real gateway integrations swap in without
//! touching routing logic.
//!
//! Responsibilities are deliberately asymmetric: SMS carries the retry and
//! quota machinery because SMS cost and deliverability matter most; push
//! carries the token fan-out and self-healing of the token registry.

mod provider;
mod push;
mod sms;

pub use provider::{
    PushMessage, PushProvider, PushProviderError, SmsProvider, SmsProviderError, StubPushProvider,
    StubSmsProvider,
};
#[cfg(test)]
pub use provider::{MockPushProvider, MockSmsProvider};
pub use push::{PushChannel, PushOutcome, PushRequest};
pub use sms::{SmsChannel, SmsOutcome, SmsRequest};
