//! In-memory ledger repository.
//!
//! Backs unit tests and local development. All state lives behind a single
//! `RwLock`, so every operation is atomic with respect to the whole store;
//! in particular `insert_booking` performs its uniqueness check and the
//! insert under one write lock, matching the transactional behavior of the
//! Postgres backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::api::{
    Activity, ActivityId, Booking, BookingId, BookingStatus, ConfirmedSlot, UserId,
};
use crate::db::repository::{
    ActivityRepository, BookingRepository, ErrorContext, RepositoryError, RepositoryResult,
};
use crate::models::WeekWindow;

#[derive(Default)]
struct LedgerState {
    activities: HashMap<i64, Activity>,
    bookings: HashMap<i64, Booking>,
}

/// In-memory implementation of the ledger repository traits.
pub struct LocalRepository {
    state: RwLock<LedgerState>,
    next_activity_id: AtomicI64,
    next_booking_id: AtomicI64,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            next_activity_id: AtomicI64::new(1),
            next_booking_id: AtomicI64::new(1),
        }
    }

    /// Number of bookings currently stored, regardless of status.
    pub fn booking_count(&self) -> usize {
        self.state.read().bookings.len()
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityRepository for LocalRepository {
    async fn store_activity(&self, activity: &Activity) -> RepositoryResult<ActivityId> {
        if activity.end_time <= activity.start_time {
            return Err(RepositoryError::validation(
                "Activity end_time must be strictly after start_time",
            ));
        }

        let id = self.next_activity_id.fetch_add(1, Ordering::SeqCst);
        let mut stored = activity.clone();
        stored.id = Some(ActivityId(id));
        self.state.write().activities.insert(id, stored);
        Ok(ActivityId(id))
    }

    async fn get_activity(&self, activity_id: ActivityId) -> RepositoryResult<Activity> {
        self.state
            .read()
            .activities
            .get(&activity_id.0)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "Activity not found",
                    ErrorContext::new("get_activity")
                        .with_entity("activity")
                        .with_entity_id(activity_id),
                )
            })
    }

    async fn list_activities(&self) -> RepositoryResult<Vec<Activity>> {
        let mut activities: Vec<Activity> =
            self.state.read().activities.values().cloned().collect();
        activities.sort_by_key(|a| a.id.map(|id| id.0));
        Ok(activities)
    }
}

#[async_trait]
impl BookingRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn insert_booking(
        &self,
        user_id: UserId,
        activity_id: ActivityId,
        booked_at: DateTime<Utc>,
    ) -> RepositoryResult<BookingId> {
        let mut state = self.state.write();

        if !state.activities.contains_key(&activity_id.0) {
            return Err(RepositoryError::not_found_with_context(
                "Activity not found",
                ErrorContext::new("insert_booking")
                    .with_entity("activity")
                    .with_entity_id(activity_id),
            ));
        }

        // Uniqueness rule: one non-cancelled booking per (user, activity).
        let duplicate = state.bookings.values().any(|b| {
            b.user_id == user_id
                && b.activity_id == activity_id
                && b.status != BookingStatus::Cancelled
        });
        if duplicate {
            return Err(RepositoryError::constraint_with_context(
                "User already holds a booking for this activity",
                ErrorContext::new("insert_booking")
                    .with_entity("booking")
                    .with_details(format!("user_id={}, activity_id={}", user_id, activity_id)),
            ));
        }

        let id = self.next_booking_id.fetch_add(1, Ordering::SeqCst);
        state.bookings.insert(
            id,
            Booking {
                id: Some(BookingId(id)),
                user_id,
                activity_id,
                status: BookingStatus::Confirmed,
                booked_at,
            },
        );
        Ok(BookingId(id))
    }

    async fn get_booking(&self, booking_id: BookingId) -> RepositoryResult<Booking> {
        self.state
            .read()
            .bookings
            .get(&booking_id.0)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    "Booking not found",
                    ErrorContext::new("get_booking")
                        .with_entity("booking")
                        .with_entity_id(booking_id),
                )
            })
    }

    async fn set_booking_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> RepositoryResult<()> {
        let mut state = self.state.write();
        match state.bookings.get_mut(&booking_id.0) {
            Some(booking) => {
                booking.status = status;
                Ok(())
            }
            None => Err(RepositoryError::not_found_with_context(
                "Booking not found",
                ErrorContext::new("set_booking_status")
                    .with_entity("booking")
                    .with_entity_id(booking_id),
            )),
        }
    }

    async fn find_confirmed_slots(&self, user_id: UserId) -> RepositoryResult<Vec<ConfirmedSlot>> {
        let state = self.state.read();
        let mut slots = Vec::new();
        for booking in state.bookings.values() {
            if booking.user_id != user_id || booking.status != BookingStatus::Confirmed {
                continue;
            }
            // Bookings reference activities by foreign key; a missing
            // activity would be a corrupted ledger.
            let activity = state.activities.get(&booking.activity_id.0).ok_or_else(|| {
                RepositoryError::internal_with_context(
                    "Booking references missing activity",
                    ErrorContext::new("find_confirmed_slots")
                        .with_entity("activity")
                        .with_entity_id(booking.activity_id),
                )
            })?;
            let booking_id = booking
                .id
                .ok_or_else(|| RepositoryError::internal("Stored booking missing id"))?;
            slots.push(ConfirmedSlot {
                booking_id,
                activity_id: booking.activity_id,
                window: activity.window(),
            });
        }
        slots.sort_by_key(|s| s.booking_id.0);
        Ok(slots)
    }

    async fn count_confirmed_in_window(
        &self,
        user_id: UserId,
        window: &WeekWindow,
    ) -> RepositoryResult<u64> {
        let state = self.state.read();
        let count = state
            .bookings
            .values()
            .filter(|b| {
                b.user_id == user_id
                    && b.status == BookingStatus::Confirmed
                    && window.contains(b.booked_at)
            })
            .count();
        Ok(count as u64)
    }
}
