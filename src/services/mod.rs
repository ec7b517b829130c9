//! Service layer for admission business logic and orchestration.
//!
//! This module contains the service layer that sits between the ledger
//! repositories and callers. Services orchestrate ledger calls and implement
//! the admission policy: tier eligibility, quota accounting, conflict
//! detection, and the atomic commit of approved bookings.

pub mod admission;

pub mod conflict;

pub mod eligibility;

pub mod quota;

pub mod tier;

pub use admission::{AdmissionController, AdmissionError, AdmissionRequest};
pub use conflict::{find_conflict, has_conflict};
pub use eligibility::is_tier_allowed;
pub use quota::{evaluate_quota, QuotaStatus};
pub use tier::TierCatalog;
