//! Admission control: fixed-order policy evaluation and atomic commit.
//!
//! A booking request passes through four checks in a fixed order (activity
//! resolution, tier eligibility, schedule conflict, weekly quota) and, when
//! all pass, a single ledger insert commits the booking. Callers see exactly
//! one failure: the first check that rejects.
//!
//! The conflict-before-quota order is a product policy carried over from the
//! platform's existing behavior, not a domain requirement.
//!
//! # Concurrency
//!
//! Check-and-commit runs under a per-user async lock, so two concurrent
//! requests from one user are evaluated strictly in sequence and can never
//! both consume the last quota slot or book overlapping activities. The
//! ledger's uniqueness constraint backs this up across processes: a losing
//! writer gets a constraint violation, after which the controller re-runs
//! the full evaluation once and reports the resulting policy rejection
//! instead of a raw storage error.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::api::{
    ActivityId, AdmissionDetail, AdmissionOutcome, AdmissionResult, MembershipTier,
    RejectionReason, UserId,
};
use crate::db::repository::{FullRepository, RepositoryError};
use crate::services::conflict::find_conflict;
use crate::services::eligibility::is_tier_allowed;
use crate::services::quota::{evaluate_quota, QuotaStatus};
use crate::services::tier::TierCatalog;

/// A single booking request entering admission control.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionRequest {
    pub user_id: UserId,
    pub tier: MembershipTier,
    pub activity_id: ActivityId,
}

/// Infrastructure failure during admission.
///
/// Policy rejections are never errors; they come back as
/// [`AdmissionResult`] values. These variants are genuine faults and are
/// retryable by the caller.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    /// The ledger failed during the read-only checks.
    #[error("storage unavailable: {0}")]
    Storage(#[from] RepositoryError),

    /// The booking was approved but the commit failed.
    #[error("booking commit failed: {0}")]
    CommitFailed(RepositoryError),
}

/// Outcome of the read-only evaluation (steps 1-4).
enum Evaluation {
    /// Every check passed; the request may be committed.
    Cleared,
    /// A check rejected, or the activity does not exist.
    Settled(AdmissionResult),
}

/// Orchestrates admission checks and commits approved bookings.
pub struct AdmissionController {
    repo: Arc<dyn FullRepository>,
    catalog: TierCatalog,
    user_locks: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl AdmissionController {
    /// Create a controller over a ledger with the default tier catalog.
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self::with_catalog(repo, TierCatalog::default())
    }

    /// Create a controller with a custom tier catalog.
    pub fn with_catalog(repo: Arc<dyn FullRepository>, catalog: TierCatalog) -> Self {
        Self {
            repo,
            catalog,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The lock serializing admission for one user.
    ///
    /// Entries are a handful of bytes and are kept for the life of the
    /// controller.
    fn user_lock(&self, user_id: UserId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.user_locks.lock();
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Run the read-only checks (steps 1-4) without committing.
    ///
    /// Idempotent: safe to call repeatedly for "can I book this?" previews.
    /// An approved preview carries no booking ID since nothing is committed.
    pub async fn preview(
        &self,
        request: &AdmissionRequest,
        now: DateTime<Utc>,
    ) -> Result<AdmissionResult, AdmissionError> {
        match self.evaluate(request, now).await? {
            Evaluation::Settled(result) => Ok(result),
            Evaluation::Cleared => Ok(AdmissionResult {
                outcome: AdmissionOutcome::Approved,
                reason: None,
                booking_id: None,
                detail: AdmissionDetail::default(),
            }),
        }
    }

    /// Evaluate a booking request and, if approved, commit it.
    ///
    /// The whole check-and-commit sequence runs under the user's admission
    /// lock; concurrent requests for the same user are serialized.
    pub async fn admit(
        &self,
        request: &AdmissionRequest,
        now: DateTime<Utc>,
    ) -> Result<AdmissionResult, AdmissionError> {
        let lock = self.user_lock(request.user_id);
        let _guard = lock.lock().await;

        match self.evaluate(request, now).await? {
            Evaluation::Settled(result) => Ok(result),
            Evaluation::Cleared => self.commit(request, now).await,
        }
    }

    /// Current quota standing for a user, for UI display.
    pub async fn remaining_quota(
        &self,
        user_id: UserId,
        tier: MembershipTier,
        now: DateTime<Utc>,
    ) -> Result<QuotaStatus, AdmissionError> {
        let status =
            evaluate_quota(self.repo.as_ref(), &self.catalog, user_id, tier, now).await?;
        Ok(status)
    }

    /// Steps 1-4: resolve activity, eligibility, conflict, quota.
    ///
    /// Read-only; the fixed order determines which single failure the
    /// caller sees when several would apply.
    async fn evaluate(
        &self,
        request: &AdmissionRequest,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, AdmissionError> {
        // 1. Resolve the activity
        let activity = match self.repo.get_activity(request.activity_id).await {
            Ok(activity) => activity,
            Err(e) if e.is_not_found() => {
                return Ok(Evaluation::Settled(AdmissionResult::activity_not_found()))
            }
            Err(e) => return Err(AdmissionError::Storage(e)),
        };

        // 2. Tier eligibility
        if !is_tier_allowed(request.tier, &activity.allowed_tiers) {
            log::debug!(
                "admission rejected: user={} tier={} not in allow-list of activity={}",
                request.user_id,
                request.tier,
                request.activity_id
            );
            return Ok(Evaluation::Settled(AdmissionResult::rejected(
                RejectionReason::TierNotAllowed,
                AdmissionDetail {
                    allowed_tiers: Some(activity.allowed_tiers.clone()),
                    ..Default::default()
                },
            )));
        }

        // 3. Schedule conflict
        let held = self
            .repo
            .find_confirmed_slots(request.user_id)
            .await
            .map_err(AdmissionError::Storage)?;
        if let Some(slot) = find_conflict(&activity.window(), &held) {
            log::debug!(
                "admission rejected: user={} activity={} overlaps activity={}",
                request.user_id,
                request.activity_id,
                slot.activity_id
            );
            return Ok(Evaluation::Settled(AdmissionResult::rejected(
                RejectionReason::ScheduleConflict,
                AdmissionDetail {
                    conflicts_with: Some(slot.activity_id),
                    ..Default::default()
                },
            )));
        }

        // 4. Weekly quota
        let quota = evaluate_quota(
            self.repo.as_ref(),
            &self.catalog,
            request.user_id,
            request.tier,
            now,
        )
        .await
        .map_err(AdmissionError::Storage)?;
        if !quota.permits() {
            log::debug!(
                "admission rejected: user={} quota exhausted ({}/{:?})",
                request.user_id,
                quota.used,
                quota.limit
            );
            return Ok(Evaluation::Settled(AdmissionResult::rejected(
                RejectionReason::QuotaExceeded,
                AdmissionDetail {
                    used: Some(quota.used),
                    limit: quota.limit,
                    remaining: quota.remaining,
                    ..Default::default()
                },
            )));
        }

        Ok(Evaluation::Cleared)
    }

    /// Step 5: insert the confirmed booking.
    ///
    /// A constraint violation means a competing commit won the race between
    /// our read and our write. The evaluation is re-run once so the caller
    /// sees the policy rejection the new ledger state implies; only a second
    /// consecutive constraint failure surfaces as a commit fault.
    async fn commit(
        &self,
        request: &AdmissionRequest,
        now: DateTime<Utc>,
    ) -> Result<AdmissionResult, AdmissionError> {
        match self
            .repo
            .insert_booking(request.user_id, request.activity_id, now)
            .await
        {
            Ok(booking_id) => {
                log::info!(
                    "booking committed: user={} activity={} booking={}",
                    request.user_id,
                    request.activity_id,
                    booking_id
                );
                Ok(AdmissionResult::approved(booking_id))
            }
            Err(e) if e.is_constraint_violation() => {
                log::warn!(
                    "commit race for user={} activity={}; re-evaluating",
                    request.user_id,
                    request.activity_id
                );
                match self.evaluate(request, now).await? {
                    Evaluation::Settled(result) => Ok(result),
                    Evaluation::Cleared => {
                        match self
                            .repo
                            .insert_booking(request.user_id, request.activity_id, now)
                            .await
                        {
                            Ok(booking_id) => Ok(AdmissionResult::approved(booking_id)),
                            Err(e) => Err(AdmissionError::CommitFailed(e)),
                        }
                    }
                }
            }
            Err(e) => Err(AdmissionError::CommitFailed(e)),
        }
    }
}
