//! Postgres ledger implementation using Diesel.
//!
//! This module implements the ledger repository traits against a Postgres
//! database.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task;

use crate::api::{
    Activity, ActivityId, Booking, BookingId, BookingStatus, ConfirmedSlot, TimeWindow, UserId,
};
use crate::db::repository::{
    ActivityRepository, BookingRepository, ErrorContext, RepositoryError, RepositoryResult,
};
use crate::models::WeekWindow;

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
    /// - `PG_POOL_MAX`: Maximum pool size (default: 10)
    /// - `PG_POOL_MIN`: Minimum pool size (default: 1)
    /// - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
    /// - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
    /// - `PG_MAX_RETRIES`: Maximum retry attempts (default: 3)
    /// - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let max_retries = std::env::var("PG_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("PG_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed ledger repository for Postgres.
///
/// This repository implementation provides:
/// - Connection pooling with configurable limits
/// - Automatic retry for transient failures
/// - Health monitoring and statistics
/// - Automatic schema migrations
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: std::sync::Arc<AtomicU64>,
    failed_queries: std::sync::Arc<AtomicU64>,
    retried_operations: std::sync::Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Arguments
    /// * `config` - Database configuration
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true) // Validate connections before use
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: std::sync::Arc::new(AtomicU64::new(0)),
            failed_queries: std::sync::Arc::new(AtomicU64::new(0)),
            retried_operations: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// This method will retry the operation up to `max_retries` times if a
    /// retryable error occurs (connection errors, timeouts, serialization
    /// failures). Constraint violations are never retried here; the admission
    /// controller owns that recovery path.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2; // Exponential backoff
                }

                // Get connection
                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                // Execute the operation
                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    ///
    /// Returns current pool state and query statistics for monitoring.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    /// Check if the database connection is healthy.
    ///
    /// Performs a simple query to verify connectivity.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }

    /// Get detailed health information.
    ///
    /// Returns a tuple of (is_healthy, latency_ms, error_message).
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        match self.health_check().await {
            Ok(true) => (true, Some(start.elapsed().as_millis() as u64), None),
            Ok(false) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some("Health check returned false".to_string()),
            ),
            Err(e) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some(e.to_string()),
            ),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

#[async_trait]
impl ActivityRepository for PostgresRepository {
    async fn store_activity(&self, activity: &Activity) -> RepositoryResult<ActivityId> {
        if activity.end_time <= activity.start_time {
            return Err(RepositoryError::validation(
                "Activity end_time must be strictly after start_time",
            ));
        }

        let row = NewActivityRow {
            title: activity.title.clone(),
            start_time: activity.start_time,
            end_time: activity.end_time,
            allowed_tiers: tiers_to_columns(&activity.allowed_tiers),
        };

        self.with_conn(move |conn| {
            let id: i64 = diesel::insert_into(activities::table)
                .values(&row)
                .returning(activities::activity_id)
                .get_result(conn)
                .map_err(map_diesel_error)?;
            Ok(ActivityId(id))
        })
        .await
    }

    async fn get_activity(&self, activity_id: ActivityId) -> RepositoryResult<Activity> {
        self.with_conn(move |conn| {
            let row = activities::table
                .filter(activities::activity_id.eq(activity_id.0))
                .select(ActivityRow::as_select())
                .first::<ActivityRow>(conn)
                .map_err(map_diesel_error)
                .map_err(|e| e.with_operation("get_activity"))?;
            Ok(row.into_activity())
        })
        .await
    }

    async fn list_activities(&self) -> RepositoryResult<Vec<Activity>> {
        self.with_conn(|conn| {
            let rows = activities::table
                .select(ActivityRow::as_select())
                .order(activities::activity_id.asc())
                .load::<ActivityRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(ActivityRow::into_activity).collect())
        })
        .await
    }
}

#[async_trait]
impl BookingRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn insert_booking(
        &self,
        user_id: UserId,
        activity_id: ActivityId,
        booked_at: DateTime<Utc>,
    ) -> RepositoryResult<BookingId> {
        let row = NewBookingRow {
            user_id: user_id.0,
            activity_id: activity_id.0,
            status: BookingStatus::Confirmed.as_str().to_string(),
            booked_at,
        };

        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let id: i64 = diesel::insert_into(bookings::table)
                    .values(&row)
                    .returning(bookings::booking_id)
                    .get_result(tx)
                    .map_err(map_diesel_error)
                    .map_err(|e| e.with_operation("insert_booking"))?;
                Ok(BookingId(id))
            })
        })
        .await
    }

    async fn get_booking(&self, booking_id: BookingId) -> RepositoryResult<Booking> {
        self.with_conn(move |conn| {
            let row = bookings::table
                .filter(bookings::booking_id.eq(booking_id.0))
                .select(BookingRow::as_select())
                .first::<BookingRow>(conn)
                .map_err(map_diesel_error)
                .map_err(|e| e.with_operation("get_booking"))?;
            row.into_booking()
        })
        .await
    }

    async fn set_booking_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let updated = diesel::update(
                bookings::table.filter(bookings::booking_id.eq(booking_id.0)),
            )
            .set(bookings::status.eq(status.as_str()))
            .execute(conn)
            .map_err(map_diesel_error)?;

            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "Booking not found",
                    ErrorContext::new("set_booking_status")
                        .with_entity("booking")
                        .with_entity_id(booking_id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn find_confirmed_slots(&self, user_id: UserId) -> RepositoryResult<Vec<ConfirmedSlot>> {
        self.with_conn(move |conn| {
            let rows: Vec<(i64, i64, DateTime<Utc>, DateTime<Utc>)> = bookings::table
                .inner_join(activities::table)
                .filter(bookings::user_id.eq(user_id.0))
                .filter(bookings::status.eq(BookingStatus::Confirmed.as_str()))
                .select((
                    bookings::booking_id,
                    bookings::activity_id,
                    activities::start_time,
                    activities::end_time,
                ))
                .order(bookings::booking_id.asc())
                .load(conn)
                .map_err(map_diesel_error)?;

            Ok(rows
                .into_iter()
                .map(|(booking_id, activity_id, start, end)| ConfirmedSlot {
                    booking_id: BookingId(booking_id),
                    activity_id: ActivityId(activity_id),
                    window: TimeWindow { start, end },
                })
                .collect())
        })
        .await
    }

    async fn count_confirmed_in_window(
        &self,
        user_id: UserId,
        window: &WeekWindow,
    ) -> RepositoryResult<u64> {
        let (start, end) = (window.start, window.end);
        self.with_conn(move |conn| {
            let count: i64 = bookings::table
                .filter(bookings::user_id.eq(user_id.0))
                .filter(bookings::status.eq(BookingStatus::Confirmed.as_str()))
                .filter(bookings::booked_at.ge(start))
                .filter(bookings::booked_at.lt(end))
                .count()
                .get_result(conn)
                .map_err(map_diesel_error)?;
            Ok(count as u64)
        })
        .await
    }
}
