//! # ABP Rust Backend
//!
//! Booking admission control engine for the Activity Booking Platform (ABP).
//!
//! This crate decides, for a given user and requested activity time-slot,
//! whether a booking may be created, and commits approved bookings
//! consistently under concurrent requests. It covers tier eligibility,
//! weekly quota accounting, schedule conflict detection, and the atomic
//! commit against the booking ledger.
//!
//! ## Features
//!
//! - **Tier Catalog**: static membership-tier to weekly-quota mapping
//! - **Week Windows**: Monday-anchored half-open calendar weeks
//! - **Quota Accounting**: confirmed bookings counted per week window
//! - **Conflict Detection**: half-open interval overlap over a user's schedule
//! - **Admission Control**: fixed-order policy evaluation and atomic commit
//! - **Booking Ledger**: repository pattern with in-memory and Postgres backends
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Data Transfer Objects (DTOs) shared with callers
//! - [`db`]: Booking ledger operations, repository pattern, persistence layer
//! - [`models`]: Time handling (week window computation)
//! - [`services`]: Admission business logic (tier, quota, conflict, controller)

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod services;
