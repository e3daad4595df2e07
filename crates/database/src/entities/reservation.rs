//! Reservation (hold queue) entities

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Waiting in the queue for a copy.
    Pending,
    /// A returned copy is being held for this reservation.
    Ready,
    Fulfilled,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Ready => "ready",
            ReservationStatus::Fulfilled => "fulfilled",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub status: ReservationStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// A member's reservation with the book title and, while pending, its
/// 1-based position in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReservationSummary {
    pub id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub status: ReservationStatus,
    pub queue_position: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    Cancelled {
        reservation: Reservation,
        promoted: Option<Reservation>,
    },
    Inactive,
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_stored_values() {
        assert_eq!(ReservationStatus::Ready.as_str(), "ready");
        assert_eq!(ReservationStatus::Cancelled.as_str(), "cancelled");
    }
}
