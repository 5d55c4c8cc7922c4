//! Device token registration service.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{NotifyError, Result};
use crate::models::{DeviceToken, DeviceType};
use crate::repository::DeviceTokenRepositoryTrait;

/// Device token lifecycle: register on app start/login, unregister on logout
pub struct DeviceTokenService {
    repo: Arc<dyn DeviceTokenRepositoryTrait>,
}

impl DeviceTokenService {
    pub fn new(repo: Arc<dyn DeviceTokenRepositoryTrait>) -> Self {
        Self { repo }
    }

    /// Register or refresh a device token.
    ///
    /// Upsert keyed by (farmer_id, token): re-registration bumps the
    /// timestamp and reactivates the token.
    #[instrument(skip(self, token))]
    pub async fn register(
        &self,
        farmer_id: &str,
        token: &str,
        device_type: DeviceType,
    ) -> Result<DeviceToken> {
        if token.trim().is_empty() {
            return Err(NotifyError::Validation(
                "device token must not be empty".to_string(),
            ));
        }

        let registered = self.repo.upsert(farmer_id, token, device_type).await?;
        info!(farmer_id, device_token_id = registered.id, "device token registered");
        Ok(registered)
    }

    /// Deactivate a token on explicit unregister; false if it was not active
    #[instrument(skip(self, token))]
    pub async fn unregister(&self, farmer_id: &str, token: &str) -> Result<bool> {
        let removed = self.repo.deactivate(farmer_id, token).await?;
        info!(farmer_id, removed, "device token unregistered");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::repository::traits::MockDeviceTokenRepositoryTrait;

    #[tokio::test]
    async fn test_register_upserts() {
        let mut repo = MockDeviceTokenRepositoryTrait::new();
        repo.expect_upsert()
            .withf(|farmer_id, token, device_type| {
                farmer_id == "farmer-001"
                    && token == "token-abc"
                    && *device_type == DeviceType::Android
            })
            .times(1)
            .returning(|farmer_id, token, device_type| {
                Ok(DeviceToken {
                    id: 1,
                    farmer_id: farmer_id.to_string(),
                    token: token.to_string(),
                    device_type,
                    is_active: true,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
            });

        let service = DeviceTokenService::new(Arc::new(repo));
        let registered = service
            .register("farmer-001", "token-abc", DeviceType::Android)
            .await
            .unwrap();

        assert!(registered.is_active);
    }

    #[tokio::test]
    async fn test_register_rejects_empty_token() {
        let mut repo = MockDeviceTokenRepositoryTrait::new();
        repo.expect_upsert().times(0);

        let service = DeviceTokenService::new(Arc::new(repo));
        let result = service.register("farmer-001", "  ", DeviceType::Ios).await;

        assert!(matches!(result, Err(NotifyError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unregister_reports_whether_active() {
        let mut repo = MockDeviceTokenRepositoryTrait::new();
        repo.expect_deactivate().times(1).returning(|_, _| Ok(false));

        let service = DeviceTokenService::new(Arc::new(repo));
        let removed = service.unregister("farmer-001", "token-gone").await.unwrap();

        assert!(!removed);
    }
}
