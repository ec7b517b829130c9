//! Tier catalog: membership tier to weekly booking quota.
//!
//! Quotas are static configuration, never mutated at runtime. `None` means
//! unlimited.

use std::collections::HashMap;

use crate::api::MembershipTier;

/// Static mapping from membership tier to weekly booking quota.
///
/// # Default catalog
///
/// | Tier | Weekly quota |
/// |------|--------------|
/// | ad-hoc | Unlimited |
/// | weekly (legacy) | Unlimited (accounted as ad-hoc) |
/// | once-a-week | 1 |
/// | twice-a-week | 2 |
/// | three-plus-a-week | Unlimited |
#[derive(Debug, Clone)]
pub struct TierCatalog {
    quotas: HashMap<MembershipTier, Option<u32>>,
}

impl TierCatalog {
    /// Weekly quota for a tier. `None` means unlimited.
    ///
    /// Tiers absent from a custom catalog are treated as unlimited.
    pub fn quota_for(&self, tier: MembershipTier) -> Option<u32> {
        self.quotas.get(&tier).copied().flatten()
    }

    /// Override the quota for one tier. `None` means unlimited.
    pub fn with_quota(mut self, tier: MembershipTier, quota: Option<u32>) -> Self {
        self.quotas.insert(tier, quota);
        self
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        let quotas = HashMap::from([
            (MembershipTier::AdHoc, None),
            // Legacy tier, accounted with the ad-hoc policy
            (MembershipTier::Weekly, None),
            (MembershipTier::OnceAWeek, Some(1)),
            (MembershipTier::TwiceAWeek, Some(2)),
            (MembershipTier::ThreePlusAWeek, None),
        ]);
        Self { quotas }
    }
}
