//! Per-user notification inbox.

use sqlx::SqlitePool;
use tracing::debug;

use libris_database::{Notification, NotificationRepository};

use crate::types::{LibraryError, LibraryResult};
use crate::validation::Validator;

#[derive(Clone)]
pub struct NotificationService {
    notifications: NotificationRepository,
}

impl NotificationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            notifications: NotificationRepository::new(pool),
        }
    }

    pub async fn list(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> LibraryResult<Vec<Notification>> {
        let (limit, offset) = Validator::page(limit, offset);
        Ok(self
            .notifications
            .find_by_user_id(user_id, unread_only, limit, offset)
            .await?)
    }

    pub async fn unread_count(&self, user_id: i64) -> LibraryResult<i64> {
        Ok(self.notifications.get_unread_count(user_id).await?)
    }

    pub async fn mark_read(&self, user_id: i64, notification_id: i64) -> LibraryResult<()> {
        if self.notifications.mark_as_read(notification_id, user_id).await? {
            Ok(())
        } else {
            Err(LibraryError::not_found("notification"))
        }
    }

    /// Mark every notification the user owns as read. Returns how many changed.
    pub async fn mark_all_read(&self, user_id: i64) -> LibraryResult<u64> {
        let updated = self.notifications.mark_all_as_read(user_id).await?;
        debug!(user_id, updated, "marked notifications read");
        Ok(updated)
    }

    pub async fn delete(&self, user_id: i64, notification_id: i64) -> LibraryResult<()> {
        if self.notifications.delete(notification_id, user_id).await? {
            Ok(())
        } else {
            Err(LibraryError::not_found("notification"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_database::testing::{create_test_pool, insert_user};
    use libris_database::{CreateNotificationRequest, NotificationType};

    async fn seed(pool: &SqlitePool, user_id: i64, count: usize) {
        let requests: Vec<CreateNotificationRequest> = (0..count)
            .map(|index| CreateNotificationRequest {
                user_id,
                notification_type: NotificationType::System,
                title: format!("Notice {index}"),
                message: "Branch closed on Monday".to_string(),
            })
            .collect();
        NotificationRepository::new(pool.clone())
            .create_batch(&requests)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn mark_all_read_reports_changes_then_zero() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user = insert_user(&pool, "reader@example.com", "member").await;
        seed(&pool, user, 3).await;
        let service = NotificationService::new(pool);

        assert_eq!(service.mark_all_read(user).await.unwrap(), 3);
        assert_eq!(service.mark_all_read(user).await.unwrap(), 0);
        assert_eq!(service.unread_count(user).await.unwrap(), 0);
        assert_eq!(service.list(user, false, None, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn foreign_notifications_are_not_found() {
        let (pool, _temp_dir) = create_test_pool().await;
        let owner = insert_user(&pool, "owner@example.com", "member").await;
        let other = insert_user(&pool, "other@example.com", "member").await;
        seed(&pool, owner, 1).await;
        let service = NotificationService::new(pool);

        let id = service.list(owner, true, None, None).await.unwrap()[0].id;
        assert!(matches!(service.mark_read(other, id).await, Err(LibraryError::NotFound { .. })));
        assert!(matches!(service.delete(other, id).await, Err(LibraryError::NotFound { .. })));

        service.mark_read(owner, id).await.unwrap();
        assert!(service.list(owner, true, None, None).await.unwrap().is_empty());
        service.delete(owner, id).await.unwrap();
    }
}
