//! Notification repository for database operations.

use sqlx::{SqliteConnection, SqlitePool};

use crate::entities::{CreateNotificationRequest, Notification};
use crate::time::now_timestamp;
use crate::types::DatabaseResult;

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, type, title, message, is_read, created_at, updated_at";

/// Repository for notification database operations
#[derive(Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a batch of notifications in one transaction. Either every
    /// notification is stored or none is.
    pub async fn create_batch(
        &self,
        requests: &[CreateNotificationRequest],
    ) -> DatabaseResult<Vec<Notification>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(requests.len());
        for request in requests {
            created.push(insert_notification(&mut tx, request).await?);
        }
        tx.commit().await?;

        Ok(created)
    }

    /// Notifications for a user, newest first.
    pub async fn find_by_user_id(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Notification>> {
        let filter = if unread_only { "AND is_read = FALSE" } else { "" };
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = ? {filter}
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn get_unread_count(&self, user_id: i64) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Mark one notification as read. Returns `false` when the user owns no such notification.
    pub async fn mark_as_read(&self, id: i64, user_id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(now_timestamp())
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark every unread notification of a user as read, returning how many changed.
    pub async fn mark_all_as_read(&self, user_id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = ? WHERE user_id = ? AND is_read = FALSE",
        )
        .bind(now_timestamp())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Insert a notification on an existing connection so callers can include it in a transaction.
pub(crate) async fn insert_notification(
    conn: &mut SqliteConnection,
    request: &CreateNotificationRequest,
) -> DatabaseResult<Notification> {
    let now = now_timestamp();

    let id = sqlx::query(
        "INSERT INTO notifications (user_id, type, title, message, is_read, created_at, updated_at)
         VALUES (?, ?, ?, ?, FALSE, ?, ?)",
    )
    .bind(request.user_id)
    .bind(request.notification_type)
    .bind(&request.title)
    .bind(&request.message)
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    let notification = sqlx::query_as::<_, Notification>(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?"
    ))
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(notification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NotificationType;
    use crate::testing::{create_test_pool, insert_user};

    fn request(user_id: i64, title: &str) -> CreateNotificationRequest {
        CreateNotificationRequest {
            user_id,
            notification_type: NotificationType::Info,
            title: title.to_string(),
            message: "Library hours change next week".to_string(),
        }
    }

    #[tokio::test]
    async fn test_created_notification_is_listed() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user_id = insert_user(&pool, "reader@example.com", "member").await;
        let repo = NotificationRepository::new(pool);

        let created = repo.create_batch(&[request(user_id, "Hours")]).await.unwrap().remove(0);
        assert!(!created.is_read);
        assert_eq!(created.notification_type, NotificationType::Info);

        let listed = repo.find_by_user_id(user_id, false, 50, 0).await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user_id = insert_user(&pool, "reader@example.com", "member").await;
        let repo = NotificationRepository::new(pool);

        let stored = repo
            .create_batch(&[request(user_id, "One"), request(user_id, "Two")])
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored[0].id < stored[1].id);

        // The unknown user fails the foreign key and rolls back the whole batch.
        let result = repo
            .create_batch(&[request(user_id, "Three"), request(9_999, "Nobody")])
            .await;
        assert!(result.is_err());
        assert_eq!(repo.get_unread_count(user_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unread_only_filter_and_count() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user_id = insert_user(&pool, "reader@example.com", "member").await;
        let repo = NotificationRepository::new(pool);

        let first = repo.create_batch(&[request(user_id, "First")]).await.unwrap().remove(0);
        repo.create_batch(&[request(user_id, "Second")]).await.unwrap();

        assert!(repo.mark_as_read(first.id, user_id).await.unwrap());

        let unread = repo.find_by_user_id(user_id, true, 50, 0).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "Second");
        assert_eq!(repo.get_unread_count(user_id).await.unwrap(), 1);

        let all = repo.find_by_user_id(user_id, false, 50, 0).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_all_as_read_is_scoped_and_idempotent() {
        let (pool, _temp_dir) = create_test_pool().await;
        let owner = insert_user(&pool, "owner@example.com", "member").await;
        let other = insert_user(&pool, "other@example.com", "member").await;
        let repo = NotificationRepository::new(pool);

        repo.create_batch(&[request(owner, "One")]).await.unwrap();
        repo.create_batch(&[request(owner, "Two")]).await.unwrap();
        repo.create_batch(&[request(other, "Elsewhere")]).await.unwrap();

        assert_eq!(repo.mark_all_as_read(owner).await.unwrap(), 2);
        assert_eq!(repo.mark_all_as_read(owner).await.unwrap(), 0);

        assert_eq!(repo.get_unread_count(owner).await.unwrap(), 0);
        assert_eq!(repo.get_unread_count(other).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_and_delete_respect_ownership() {
        let (pool, _temp_dir) = create_test_pool().await;
        let owner = insert_user(&pool, "owner@example.com", "member").await;
        let other = insert_user(&pool, "other@example.com", "member").await;
        let repo = NotificationRepository::new(pool);

        let notification = repo.create_batch(&[request(owner, "Mine")]).await.unwrap().remove(0);

        assert!(!repo.mark_as_read(notification.id, other).await.unwrap());
        assert!(!repo.delete(notification.id, other).await.unwrap());
        assert!(repo.delete(notification.id, owner).await.unwrap());
        assert!(repo.find_by_user_id(owner, false, 50, 0).await.unwrap().is_empty());
    }
}
