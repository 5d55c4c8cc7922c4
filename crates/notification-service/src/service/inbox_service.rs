//! In-app inbox service.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{NotifyError, Result};
use crate::models::InAppNotification;
use crate::repository::InAppRepositoryTrait;

/// Page bounds for inbox listing
const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Listing parameters
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub unread_only: bool,
}

/// Inbox service: history, read-state transitions, deletion
pub struct InboxService {
    repo: Arc<dyn InAppRepositoryTrait>,
}

impl InboxService {
    pub fn new(repo: Arc<dyn InAppRepositoryTrait>) -> Self {
        Self { repo }
    }

    /// List a farmer's notifications, newest first
    #[instrument(skip(self, params))]
    pub async fn list(&self, farmer_id: &str, params: ListParams) -> Result<Vec<InAppNotification>> {
        let limit = params
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = params.offset.unwrap_or(0).max(0);

        self.repo
            .list(farmer_id, limit, offset, params.unread_only)
            .await
    }

    /// Unread badge count
    pub async fn unread_count(&self, farmer_id: &str) -> Result<i64> {
        self.repo.unread_count(farmer_id).await
    }

    /// Mark one notification read
    #[instrument(skip(self))]
    pub async fn mark_read(&self, farmer_id: &str, id: i64) -> Result<()> {
        if self.repo.mark_read(farmer_id, id).await? {
            Ok(())
        } else {
            // unknown id or someone else's notification
            Err(NotifyError::NotificationNotFound(id))
        }
    }

    /// Mark every unread notification read; returns how many changed
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, farmer_id: &str) -> Result<u64> {
        let changed = self.repo.mark_all_read(farmer_id).await?;
        info!(farmer_id, changed, "marked all notifications read");
        Ok(changed)
    }

    /// Delete one notification owned by the farmer
    #[instrument(skip(self))]
    pub async fn delete(&self, farmer_id: &str, id: i64) -> Result<()> {
        if self.repo.delete(farmer_id, id).await? {
            Ok(())
        } else {
            Err(NotifyError::NotificationNotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::traits::MockInAppRepositoryTrait;

    #[tokio::test]
    async fn test_list_clamps_page_size() {
        let mut repo = MockInAppRepositoryTrait::new();
        repo.expect_list()
            .withf(|farmer_id, limit, offset, unread_only| {
                farmer_id == "farmer-001" && *limit == 100 && *offset == 0 && !unread_only
            })
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));

        let service = InboxService::new(Arc::new(repo));
        let params = ListParams {
            limit: Some(5000),
            offset: Some(-3),
            unread_only: false,
        };

        service.list("farmer-001", params).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_defaults() {
        let mut repo = MockInAppRepositoryTrait::new();
        repo.expect_list()
            .withf(|_, limit, offset, unread_only| *limit == 20 && *offset == 0 && *unread_only)
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));

        let service = InboxService::new(Arc::new(repo));
        let params = ListParams {
            unread_only: true,
            ..Default::default()
        };

        service.list("farmer-001", params).await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_read_not_found() {
        let mut repo = MockInAppRepositoryTrait::new();
        repo.expect_mark_read().returning(|_, _| Ok(false));

        let service = InboxService::new(Arc::new(repo));
        let result = service.mark_read("farmer-001", 99).await;

        assert!(matches!(
            result,
            Err(NotifyError::NotificationNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_delete_scoped_to_owner() {
        let mut repo = MockInAppRepositoryTrait::new();
        repo.expect_delete()
            .withf(|farmer_id, id| farmer_id == "farmer-001" && *id == 7)
            .times(1)
            .returning(|_, _| Ok(true));

        let service = InboxService::new(Arc::new(repo));
        service.delete("farmer-001", 7).await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_all_read_returns_count() {
        let mut repo = MockInAppRepositoryTrait::new();
        repo.expect_mark_all_read().returning(|_| Ok(4));

        let service = InboxService::new(Arc::new(repo));
        let changed = service.mark_all_read("farmer-001").await.unwrap();

        assert_eq!(changed, 4);
    }
}
