use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{activities, bookings};
use crate::api::{
    Activity, ActivityId, Booking, BookingId, BookingStatus, MembershipTier, UserId,
};
use crate::db::repository::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Some fields used only for database operations
pub struct ActivityRow {
    pub activity_id: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub allowed_tiers: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activities)]
pub struct NewActivityRow {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub allowed_tiers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Some fields used only for database operations
pub struct BookingRow {
    pub booking_id: i64,
    pub user_id: i64,
    pub activity_id: i64,
    pub status: String,
    pub booked_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBookingRow {
    pub user_id: i64,
    pub activity_id: i64,
    pub status: String,
    pub booked_at: DateTime<Utc>,
}

impl ActivityRow {
    pub fn into_activity(self) -> Activity {
        Activity {
            id: Some(ActivityId(self.activity_id)),
            title: self.title,
            start_time: self.start_time,
            end_time: self.end_time,
            // Legacy rows may carry unrecognized tier strings; the lossy
            // parse applies the documented ad-hoc fallback.
            allowed_tiers: self
                .allowed_tiers
                .unwrap_or_default()
                .iter()
                .map(|s| MembershipTier::parse_lossy(s))
                .collect(),
        }
    }
}

impl BookingRow {
    pub fn into_booking(self) -> RepositoryResult<Booking> {
        let status: BookingStatus = self.status.parse().map_err(|e: String| {
            RepositoryError::internal(format!("Invalid booking status in ledger: {}", e))
        })?;
        Ok(Booking {
            id: Some(BookingId(self.booking_id)),
            user_id: UserId(self.user_id),
            activity_id: ActivityId(self.activity_id),
            status,
            booked_at: self.booked_at,
        })
    }
}

pub fn tiers_to_columns(tiers: &[MembershipTier]) -> Option<Vec<String>> {
    if tiers.is_empty() {
        None
    } else {
        Some(tiers.iter().map(|t| t.as_str().to_string()).collect())
    }
}
