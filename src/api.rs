//! Public API surface for the Rust backend.
//!
//! This file consolidates the DTO types for the admission subsystem.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::services::quota::QuotaStatus;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User identifier (database primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Activity identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub i64);

/// Booking identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(pub i64);

impl UserId {
    pub fn new(value: i64) -> Self {
        UserId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl ActivityId {
    pub fn new(value: i64) -> Self {
        ActivityId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl BookingId {
    pub fn new(value: i64) -> Self {
        BookingId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BookingId> for i64 {
    fn from(id: BookingId) -> Self {
        id.0
    }
}

/// Membership tier determining a user's weekly booking quota and which
/// activities they may book.
///
/// The wire spellings (`ad-hoc`, `once-a-week`, ...) are the catalog keys
/// used by the rest of the platform and must not change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipTier {
    #[serde(rename = "ad-hoc")]
    AdHoc,
    /// Deprecated synonym kept for backward compatibility; accounted with
    /// the same policy as [`MembershipTier::AdHoc`].
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "once-a-week")]
    OnceAWeek,
    #[serde(rename = "twice-a-week")]
    TwiceAWeek,
    #[serde(rename = "three-plus-a-week")]
    ThreePlusAWeek,
}

impl MembershipTier {
    /// Canonical wire spelling of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipTier::AdHoc => "ad-hoc",
            MembershipTier::Weekly => "weekly",
            MembershipTier::OnceAWeek => "once-a-week",
            MembershipTier::TwiceAWeek => "twice-a-week",
            MembershipTier::ThreePlusAWeek => "three-plus-a-week",
        }
    }

    /// Parse a raw tier string, falling back to [`MembershipTier::AdHoc`]
    /// for unrecognized values.
    ///
    /// Legacy records may carry arbitrary tier strings; the fallback keeps
    /// them bookable under the unlimited policy. Prefer the strict
    /// [`FromStr`] parse at validated boundaries.
    pub fn parse_lossy(s: &str) -> Self {
        match s.parse() {
            Ok(tier) => tier,
            Err(_) => {
                log::warn!("Unknown membership tier '{}', falling back to ad-hoc", s);
                MembershipTier::AdHoc
            }
        }
    }
}

impl FromStr for MembershipTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ad-hoc" => Ok(MembershipTier::AdHoc),
            "weekly" => Ok(MembershipTier::Weekly),
            "once-a-week" => Ok(MembershipTier::OnceAWeek),
            "twice-a-week" => Ok(MembershipTier::TwiceAWeek),
            "three-plus-a-week" => Ok(MembershipTier::ThreePlusAWeek),
            _ => Err(format!("Unknown membership tier: {}", s)),
        }
    }
}

impl std::fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a booking.
///
/// Transitions to `Attended`/`Cancelled` are performed by collaborators
/// outside the admission subsystem; admission only ever creates `Confirmed`
/// bookings. Cancelled bookings never count toward quota or conflicts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Attended,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Attended => "attended",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "attended" => Ok(BookingStatus::Attended),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Unknown booking status: {}", s)),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Half-open UTC time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start instant
    pub start: DateTime<Utc>,
    /// Exclusive end instant
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Length of the interval.
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Check if a given instant lies inside this interval (inclusive start,
    /// exclusive end).
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }

    /// Check if this interval overlaps with another.
    ///
    /// Half-open semantics: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Activity offered on the platform.
///
/// Owned by activity management; the admission subsystem treats it as
/// read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Database ID (optional on input, server-assigned)
    #[serde(default)]
    pub id: Option<ActivityId>,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Tiers permitted to book this activity. Empty means open to all tiers.
    #[serde(default)]
    pub allowed_tiers: Vec<MembershipTier>,
}

impl Activity {
    pub fn new(
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        allowed_tiers: Vec<MembershipTier>,
    ) -> Result<Self, String> {
        if end_time <= start_time {
            return Err("Activity end_time must be strictly after start_time".to_string());
        }
        Ok(Self {
            id: None,
            title: title.into(),
            start_time,
            end_time,
            allowed_tiers,
        })
    }

    /// The activity's time window.
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// Whether any tier may book this activity.
    pub fn is_open_to_all(&self) -> bool {
        self.allowed_tiers.is_empty()
    }
}

/// Booking record linking a user to an activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(default)]
    pub id: Option<BookingId>,
    pub user_id: UserId,
    pub activity_id: ActivityId,
    pub status: BookingStatus,
    /// When the booking was made. Used for quota accounting; distinct from
    /// the activity's own time window used for conflict detection.
    pub booked_at: DateTime<Utc>,
}

/// A confirmed booking joined to its activity's time window.
///
/// Row shape returned by the ledger for conflict detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedSlot {
    pub booking_id: BookingId,
    pub activity_id: ActivityId,
    pub window: TimeWindow,
}

/// Final outcome of an admission request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdmissionOutcome {
    Approved,
    Rejected,
    ActivityNotFound,
}

/// Policy reason for a rejection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    TierNotAllowed,
    ScheduleConflict,
    QuotaExceeded,
}

/// Reason-specific context for user-facing messaging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdmissionDetail {
    /// Tiers permitted by the activity (populated for TIER_NOT_ALLOWED)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_tiers: Option<Vec<MembershipTier>>,
    /// Activity already occupying the slot (populated for SCHEDULE_CONFLICT)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts_with: Option<ActivityId>,
    /// Confirmed bookings in the current week window (QUOTA_EXCEEDED)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u32>,
    /// Weekly quota for the user's tier (QUOTA_EXCEEDED)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Remaining quota in the current week window (QUOTA_EXCEEDED)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
}

/// Result of evaluating (and possibly committing) an admission request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionResult {
    pub outcome: AdmissionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    /// Present iff the outcome is APPROVED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,
    #[serde(default, skip_serializing_if = "AdmissionDetail::is_empty")]
    pub detail: AdmissionDetail,
}

impl AdmissionDetail {
    pub fn is_empty(&self) -> bool {
        self.allowed_tiers.is_none()
            && self.conflicts_with.is_none()
            && self.used.is_none()
            && self.limit.is_none()
            && self.remaining.is_none()
    }
}

impl AdmissionResult {
    /// An approved, committed booking.
    pub fn approved(booking_id: BookingId) -> Self {
        Self {
            outcome: AdmissionOutcome::Approved,
            reason: None,
            booking_id: Some(booking_id),
            detail: AdmissionDetail::default(),
        }
    }

    /// A policy rejection with reason-specific detail.
    pub fn rejected(reason: RejectionReason, detail: AdmissionDetail) -> Self {
        Self {
            outcome: AdmissionOutcome::Rejected,
            reason: Some(reason),
            booking_id: None,
            detail,
        }
    }

    /// The requested activity does not exist.
    pub fn activity_not_found() -> Self {
        Self {
            outcome: AdmissionOutcome::ActivityNotFound,
            reason: None,
            booking_id: None,
            detail: AdmissionDetail::default(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.outcome == AdmissionOutcome::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_user_id_new() {
        let id = UserId::new(42);
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn test_booking_id_display() {
        let id = BookingId::new(7);
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn test_tier_wire_spellings_roundtrip() {
        for tier in [
            MembershipTier::AdHoc,
            MembershipTier::Weekly,
            MembershipTier::OnceAWeek,
            MembershipTier::TwiceAWeek,
            MembershipTier::ThreePlusAWeek,
        ] {
            let parsed: MembershipTier = tier.as_str().parse().unwrap();
            assert_eq!(parsed, tier);
        }
    }

    #[test]
    fn test_tier_strict_parse_rejects_unknown() {
        assert!("gold".parse::<MembershipTier>().is_err());
        assert!("".parse::<MembershipTier>().is_err());
    }

    #[test]
    fn test_tier_lossy_parse_falls_back_to_ad_hoc() {
        assert_eq!(MembershipTier::parse_lossy("gold"), MembershipTier::AdHoc);
        assert_eq!(
            MembershipTier::parse_lossy("twice-a-week"),
            MembershipTier::TwiceAWeek
        );
    }

    #[test]
    fn test_tier_serde_uses_wire_spelling() {
        let json = serde_json::to_string(&MembershipTier::ThreePlusAWeek).unwrap();
        assert_eq!(json, "\"three-plus-a-week\"");
        let tier: MembershipTier = serde_json::from_str("\"once-a-week\"").unwrap();
        assert_eq!(tier, MembershipTier::OnceAWeek);
    }

    #[test]
    fn test_booking_status_serde_lowercase() {
        let json = serde_json::to_string(&BookingStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
    }

    #[test]
    fn test_time_window_rejects_empty_interval() {
        let t = utc(2025, 3, 10, 10, 0);
        assert!(TimeWindow::new(t, t).is_none());
        assert!(TimeWindow::new(utc(2025, 3, 10, 11, 0), t).is_none());
    }

    #[test]
    fn test_time_window_overlap() {
        let a = TimeWindow::new(utc(2025, 3, 10, 10, 0), utc(2025, 3, 10, 12, 0)).unwrap();
        let b = TimeWindow::new(utc(2025, 3, 10, 11, 0), utc(2025, 3, 10, 13, 0)).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_time_window_touching_endpoints_do_not_overlap() {
        let a = TimeWindow::new(utc(2025, 3, 10, 10, 0), utc(2025, 3, 10, 12, 0)).unwrap();
        let b = TimeWindow::new(utc(2025, 3, 10, 12, 0), utc(2025, 3, 10, 14, 0)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_time_window_contains_half_open() {
        let w = TimeWindow::new(utc(2025, 3, 10, 10, 0), utc(2025, 3, 10, 12, 0)).unwrap();
        assert!(w.contains(utc(2025, 3, 10, 10, 0)));
        assert!(w.contains(utc(2025, 3, 10, 11, 59)));
        assert!(!w.contains(utc(2025, 3, 10, 12, 0)));
    }

    #[test]
    fn test_activity_rejects_inverted_window() {
        let result = Activity::new(
            "Yoga",
            utc(2025, 3, 10, 12, 0),
            utc(2025, 3, 10, 10, 0),
            vec![],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_activity_open_to_all_when_no_tiers() {
        let activity = Activity::new(
            "Yoga",
            utc(2025, 3, 10, 10, 0),
            utc(2025, 3, 10, 12, 0),
            vec![],
        )
        .unwrap();
        assert!(activity.is_open_to_all());
    }

    #[test]
    fn test_admission_result_approved_shape() {
        let result = AdmissionResult::approved(BookingId::new(5));
        assert!(result.is_approved());
        assert_eq!(result.booking_id, Some(BookingId::new(5)));
        assert!(result.reason.is_none());
    }

    #[test]
    fn test_admission_result_serialization_skips_empty_detail() {
        let result = AdmissionResult::approved(BookingId::new(5));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "APPROVED");
        assert!(json.get("detail").is_none());
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn test_admission_result_rejection_detail() {
        let result = AdmissionResult::rejected(
            RejectionReason::QuotaExceeded,
            AdmissionDetail {
                used: Some(1),
                limit: Some(1),
                remaining: Some(0),
                ..Default::default()
            },
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "REJECTED");
        assert_eq!(json["reason"], "QUOTA_EXCEEDED");
        assert_eq!(json["detail"]["used"], 1);
        assert_eq!(json["detail"]["limit"], 1);
    }
}
