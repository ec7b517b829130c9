//! Shared data models re-exported for database layer consumers.

pub use crate::api::{
    Activity, ActivityId, Booking, BookingId, BookingStatus, ConfirmedSlot, MembershipTier,
    TimeWindow, UserId,
};
pub use crate::models::WeekWindow;
