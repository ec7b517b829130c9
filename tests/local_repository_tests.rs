//! Expanded tests for LocalRepository.
//!
//! These tests cover concurrent access patterns, edge cases, and error
//! conditions for the in-memory ledger implementation.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use abp_rust::api::{Activity, ActivityId, BookingStatus, MembershipTier, UserId};
use abp_rust::db::repositories::LocalRepository;
use abp_rust::db::repository::{ActivityRepository, BookingRepository};
use abp_rust::models::week_window;

fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
}

fn test_activity(index: i64) -> Activity {
    let start = utc(2025, 3, 10, 8) + Duration::hours(index * 3);
    Activity::new(
        format!("activity_{}", index),
        start,
        start + Duration::hours(2),
        vec![],
    )
    .unwrap()
}

// =========================================================
// Concurrent Access Tests
// =========================================================

#[tokio::test]
async fn test_concurrent_activity_writes() {
    let repo = Arc::new(LocalRepository::new());

    // Spawn multiple tasks writing different activities
    let mut handles = vec![];
    for i in 0..10 {
        let repo_clone = Arc::clone(&repo);
        let handle = tokio::spawn(async move {
            repo_clone.store_activity(&test_activity(i)).await
        });
        handles.push(handle);
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    let activities = repo.list_activities().await.unwrap();
    assert_eq!(activities.len(), 10);

    // Assigned IDs are unique
    let mut ids: Vec<i64> = activities.iter().map(|a| a.id.unwrap().0).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 10);
}

#[tokio::test]
async fn test_concurrent_duplicate_inserts_admit_one() {
    // Many tasks race to book the same (user, activity); the uniqueness
    // rule lets exactly one through.
    let repo = Arc::new(LocalRepository::new());
    let activity = repo.store_activity(&test_activity(0)).await.unwrap();

    let mut handles = vec![];
    for _ in 0..8 {
        let repo_clone = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo_clone
                .insert_booking(UserId(1), activity, utc(2025, 3, 11, 9))
                .await
        }));
    }

    let mut successes = 0;
    let mut violations = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) if e.is_constraint_violation() => violations += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(violations, 7);
    assert_eq!(repo.booking_count(), 1);
}

#[tokio::test]
async fn test_concurrent_reads_during_writes() {
    let repo = Arc::new(LocalRepository::new());
    let activity = repo.store_activity(&test_activity(0)).await.unwrap();
    repo.insert_booking(UserId(1), activity, utc(2025, 3, 11, 9))
        .await
        .unwrap();

    let mut handles = vec![];
    for i in 0..10 {
        let repo_clone = Arc::clone(&repo);
        if i % 2 == 0 {
            handles.push(tokio::spawn(async move {
                repo_clone.find_confirmed_slots(UserId(1)).await.map(|_| ())
            }));
        } else {
            handles.push(tokio::spawn(async move {
                let a = repo_clone.store_activity(&test_activity(i)).await?;
                repo_clone
                    .insert_booking(UserId(2), a, utc(2025, 3, 11, 10))
                    .await
                    .map(|_| ())
            }));
        }
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}

// =========================================================
// Edge Cases and Error Conditions
// =========================================================

#[tokio::test]
async fn test_booking_nonexistent_activity_fails() {
    let repo = LocalRepository::new();
    let err = repo
        .insert_booking(UserId(1), ActivityId(999), utc(2025, 3, 11, 9))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_status_transition_roundtrip() {
    let repo = LocalRepository::new();
    let activity = repo.store_activity(&test_activity(0)).await.unwrap();
    let booking = repo
        .insert_booking(UserId(1), activity, utc(2025, 3, 11, 9))
        .await
        .unwrap();

    repo.set_booking_status(booking, BookingStatus::Attended)
        .await
        .unwrap();
    assert_eq!(
        repo.get_booking(booking).await.unwrap().status,
        BookingStatus::Attended
    );

    repo.set_booking_status(booking, BookingStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(
        repo.get_booking(booking).await.unwrap().status,
        BookingStatus::Cancelled
    );
}

#[tokio::test]
async fn test_attended_bookings_still_count_as_confirmed_history() {
    // Attended bookings are past confirmed bookings whose status moved on;
    // only cancelled bookings drop out of quota and conflict accounting.
    let repo = LocalRepository::new();
    let activity = repo.store_activity(&test_activity(0)).await.unwrap();
    let booking = repo
        .insert_booking(UserId(1), activity, utc(2025, 3, 11, 9))
        .await
        .unwrap();
    repo.set_booking_status(booking, BookingStatus::Attended)
        .await
        .unwrap();

    let window = week_window(utc(2025, 3, 11, 9));
    // An attended booking is no longer "confirmed" and is excluded from the
    // confirmed set either way
    assert_eq!(
        repo.count_confirmed_in_window(UserId(1), &window)
            .await
            .unwrap(),
        0
    );
    assert!(repo.find_confirmed_slots(UserId(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stored_activity_preserves_allow_list() {
    let repo = LocalRepository::new();
    let allowed = vec![MembershipTier::OnceAWeek, MembershipTier::TwiceAWeek];
    let mut activity = test_activity(0);
    activity.allowed_tiers = allowed.clone();

    let id = repo.store_activity(&activity).await.unwrap();
    let fetched = repo.get_activity(id).await.unwrap();
    assert_eq!(fetched.allowed_tiers, allowed);
    assert!(!fetched.is_open_to_all());
}

#[tokio::test]
async fn test_invalid_activity_window_rejected() {
    let repo = LocalRepository::new();
    let activity = Activity {
        id: None,
        title: "Inverted".to_string(),
        start_time: utc(2025, 3, 12, 12),
        end_time: utc(2025, 3, 12, 10),
        allowed_tiers: vec![],
    };
    assert!(repo.store_activity(&activity).await.is_err());
}
