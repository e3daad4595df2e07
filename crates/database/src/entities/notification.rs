//! Notification entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum NotificationType {
    Info,
    System,
    Overdue,
    ReservationReady,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Info => "info",
            NotificationType::System => "system",
            NotificationType::Overdue => "overdue",
            NotificationType::ReservationReady => "reservation_ready",
        }
    }
}

impl CreateNotificationRequest {
    pub fn reservation_ready(user_id: i64, book_title: &str) -> Self {
        Self {
            user_id,
            notification_type: NotificationType::ReservationReady,
            title: format!("\"{}\" is ready for pickup", book_title),
            message: format!(
                "A copy of \"{}\" is being held for you at the circulation desk.",
                book_title
            ),
        }
    }

    pub fn overdue(user_id: i64, book_title: &str, due_date: &str, days_overdue: i64) -> Self {
        let days = if days_overdue == 1 { "day" } else { "days" };
        Self {
            user_id,
            notification_type: NotificationType::Overdue,
            title: format!("\"{}\" is overdue", book_title),
            message: format!(
                "\"{}\" was due on {} and is {} {} overdue. Please return it as soon as possible.",
                book_title, due_date, days_overdue, days
            ),
        }
    }
}
