//! Tier eligibility check against an activity's allow-list.

use crate::api::MembershipTier;

/// Check whether a user's tier is permitted by an activity's tier allow-list.
///
/// An absent or empty allow-list means the activity is open to all tiers.
pub fn is_tier_allowed(user_tier: MembershipTier, allowed_tiers: &[MembershipTier]) -> bool {
    allowed_tiers.is_empty() || allowed_tiers.contains(&user_tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allow_list_permits_all_tiers() {
        for tier in [
            MembershipTier::AdHoc,
            MembershipTier::Weekly,
            MembershipTier::OnceAWeek,
            MembershipTier::TwiceAWeek,
            MembershipTier::ThreePlusAWeek,
        ] {
            assert!(is_tier_allowed(tier, &[]));
        }
    }

    #[test]
    fn test_member_of_allow_list_is_permitted() {
        let allowed = [MembershipTier::TwiceAWeek, MembershipTier::ThreePlusAWeek];
        assert!(is_tier_allowed(MembershipTier::TwiceAWeek, &allowed));
        assert!(is_tier_allowed(MembershipTier::ThreePlusAWeek, &allowed));
    }

    #[test]
    fn test_non_member_is_rejected() {
        let allowed = [MembershipTier::TwiceAWeek, MembershipTier::ThreePlusAWeek];
        assert!(!is_tier_allowed(MembershipTier::OnceAWeek, &allowed));
        assert!(!is_tier_allowed(MembershipTier::AdHoc, &allowed));
    }

    #[test]
    fn test_check_is_idempotent() {
        let allowed = [MembershipTier::OnceAWeek];
        let first = is_tier_allowed(MembershipTier::OnceAWeek, &allowed);
        let second = is_tier_allowed(MembershipTier::OnceAWeek, &allowed);
        assert_eq!(first, second);
    }
}
