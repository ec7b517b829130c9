//! Abstract repository interface for the booking ledger.
//!
//! The admission subsystem reads activities and a user's confirmed bookings
//! through these traits and writes exactly one row per approved booking.
//! Implementations must make `insert_booking` fail with
//! [`RepositoryError::ConstraintViolation`] when a competing commit already
//! holds a non-cancelled booking for the same `(user, activity)` pair; the
//! admission controller relies on this to resolve commit races.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::api::{
    Activity, ActivityId, Booking, BookingId, BookingStatus, ConfirmedSlot, UserId,
};
use crate::models::WeekWindow;

/// Read/write access to the activity catalog.
///
/// Activities are owned by activity management; admission only reads them.
/// `store_activity` exists for seeding and collaborator use.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Persist a new activity and return its assigned ID.
    async fn store_activity(&self, activity: &Activity) -> RepositoryResult<ActivityId>;

    /// Fetch an activity by ID. Returns `NotFound` if it does not exist.
    async fn get_activity(&self, activity_id: ActivityId) -> RepositoryResult<Activity>;

    /// List all activities.
    async fn list_activities(&self) -> RepositoryResult<Vec<Activity>>;
}

/// Read/write access to booking records.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Check that the ledger is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Insert a confirmed booking made at `booked_at`.
    ///
    /// Fails with `ConstraintViolation` if the user already holds a
    /// non-cancelled booking for this activity.
    async fn insert_booking(
        &self,
        user_id: UserId,
        activity_id: ActivityId,
        booked_at: DateTime<Utc>,
    ) -> RepositoryResult<BookingId>;

    /// Fetch a booking by ID. Returns `NotFound` if it does not exist.
    async fn get_booking(&self, booking_id: BookingId) -> RepositoryResult<Booking>;

    /// Transition a booking's status.
    ///
    /// Status transitions are driven by collaborators outside the admission
    /// subsystem (attendance tracking, cancellation flows).
    async fn set_booking_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> RepositoryResult<()>;

    /// The user's confirmed bookings joined to their activity time windows.
    async fn find_confirmed_slots(&self, user_id: UserId) -> RepositoryResult<Vec<ConfirmedSlot>>;

    /// Count the user's confirmed bookings whose `booked_at` falls in the
    /// given week window.
    async fn count_confirmed_in_window(
        &self,
        user_id: UserId,
        window: &WeekWindow,
    ) -> RepositoryResult<u64>;
}

/// Umbrella trait for a fully capable ledger backend.
pub trait FullRepository: ActivityRepository + BookingRepository {}

impl<T: ActivityRepository + BookingRepository> FullRepository for T {}
