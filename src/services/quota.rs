//! Weekly quota accounting for a user's confirmed bookings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{MembershipTier, UserId};
use crate::db::repository::{BookingRepository, RepositoryResult};
use crate::models::week_window;
use crate::services::tier::TierCatalog;

/// Snapshot of a user's quota standing in the current week window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    /// Weekly limit for the tier; `None` when unlimited
    pub limit: Option<u32>,
    /// Confirmed bookings made in the current week window
    pub used: u32,
    /// Remaining bookings this week; `None` when unlimited
    pub remaining: Option<u32>,
    pub unlimited: bool,
}

impl QuotaStatus {
    /// Whether another booking is permitted under this standing.
    pub fn permits(&self) -> bool {
        match self.remaining {
            None => self.unlimited,
            Some(remaining) => remaining > 0,
        }
    }
}

/// Evaluate the user's quota standing against the current week window.
///
/// Counts confirmed bookings whose booking timestamp falls in the calendar
/// week containing `now` and compares against the tier's catalog limit.
/// Unlimited tiers skip the count entirely.
pub async fn evaluate_quota(
    repo: &dyn BookingRepository,
    catalog: &TierCatalog,
    user_id: UserId,
    tier: MembershipTier,
    now: DateTime<Utc>,
) -> RepositoryResult<QuotaStatus> {
    let Some(limit) = catalog.quota_for(tier) else {
        return Ok(QuotaStatus {
            limit: None,
            used: 0,
            remaining: None,
            unlimited: true,
        });
    };

    let window = week_window(now);
    let used = repo.count_confirmed_in_window(user_id, &window).await? as u32;

    Ok(QuotaStatus {
        limit: Some(limit),
        used,
        remaining: Some(limit.saturating_sub(used)),
        unlimited: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Activity, ActivityId};
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::ActivityRepository;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    async fn seed_activity(repo: &LocalRepository, day: u32) -> ActivityId {
        repo.store_activity(
            &Activity::new(
                "Soup Kitchen",
                utc(2025, 3, day, 10),
                utc(2025, 3, day, 12),
                vec![],
            )
            .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_unlimited_tier_always_permits() {
        let repo = LocalRepository::new();
        let status = evaluate_quota(
            &repo,
            &TierCatalog::default(),
            UserId(1),
            MembershipTier::AdHoc,
            utc(2025, 3, 12, 9),
        )
        .await
        .unwrap();

        assert!(status.unlimited);
        assert!(status.permits());
        assert_eq!(status.limit, None);
        assert_eq!(status.remaining, None);
    }

    #[tokio::test]
    async fn test_quota_counts_current_week_only() {
        let repo = LocalRepository::new();
        let a1 = seed_activity(&repo, 12).await;
        let a2 = seed_activity(&repo, 13).await;

        let user = UserId(1);
        // One booking made last week, one this week
        repo.insert_booking(user, a1, utc(2025, 3, 5, 9))
            .await
            .unwrap();
        repo.insert_booking(user, a2, utc(2025, 3, 11, 9))
            .await
            .unwrap();

        let status = evaluate_quota(
            &repo,
            &TierCatalog::default(),
            user,
            MembershipTier::TwiceAWeek,
            utc(2025, 3, 12, 9),
        )
        .await
        .unwrap();

        assert_eq!(status.used, 1);
        assert_eq!(status.limit, Some(2));
        assert_eq!(status.remaining, Some(1));
        assert!(status.permits());
    }

    #[tokio::test]
    async fn test_exhausted_quota_denies() {
        let repo = LocalRepository::new();
        let a1 = seed_activity(&repo, 12).await;

        let user = UserId(1);
        repo.insert_booking(user, a1, utc(2025, 3, 11, 9))
            .await
            .unwrap();

        let status = evaluate_quota(
            &repo,
            &TierCatalog::default(),
            user,
            MembershipTier::OnceAWeek,
            utc(2025, 3, 12, 9),
        )
        .await
        .unwrap();

        assert_eq!(status.used, 1);
        assert_eq!(status.remaining, Some(0));
        assert!(!status.permits());
    }

    #[tokio::test]
    async fn test_zero_limit_never_permits() {
        let repo = LocalRepository::new();
        let catalog = TierCatalog::default().with_quota(MembershipTier::OnceAWeek, Some(0));

        let status = evaluate_quota(
            &repo,
            &catalog,
            UserId(1),
            MembershipTier::OnceAWeek,
            utc(2025, 3, 12, 9),
        )
        .await
        .unwrap();

        // A zero limit is a real limit, not falsy-unlimited
        assert!(!status.unlimited);
        assert_eq!(status.limit, Some(0));
        assert!(!status.permits());
    }

    #[tokio::test]
    async fn test_used_above_limit_saturates_remaining() {
        let repo = LocalRepository::new();
        let a1 = seed_activity(&repo, 12).await;
        let a2 = seed_activity(&repo, 13).await;

        let user = UserId(1);
        repo.insert_booking(user, a1, utc(2025, 3, 11, 9))
            .await
            .unwrap();
        repo.insert_booking(user, a2, utc(2025, 3, 11, 10))
            .await
            .unwrap();

        // Catalog tightened after the bookings were made
        let catalog = TierCatalog::default().with_quota(MembershipTier::TwiceAWeek, Some(1));
        let status = evaluate_quota(
            &repo,
            &catalog,
            user,
            MembershipTier::TwiceAWeek,
            utc(2025, 3, 12, 9),
        )
        .await
        .unwrap();

        assert_eq!(status.used, 2);
        assert_eq!(status.remaining, Some(0));
        assert!(!status.permits());
    }
}
