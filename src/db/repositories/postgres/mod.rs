//! Postgres repository implementation using Diesel.
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
use chrono::{NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task;
use uuid::Uuid;

use crate::api::{BookingFilter, ContractFilter, PaymentFilter, RefreshOutcome};
use crate::db::repository::{
    ContractRepository, ErrorContext, FullRepository, LaundryRepository, PaymentRepository,
    PropertyRepository, RepositoryError, RepositoryResult, UserRepository,
};
use crate::models::payment::generate_schedule;
use crate::models::{
    Building, BuildingId, BookingId, BookingStatus, Contract, ContractId, LaundryBooking,
    NewBooking, NewBuilding, NewContract, NewRoom, NewUser, PaymentId, PaymentMonth, RentPayment,
    RentPaymentStatus, RentPaymentUpdate, Room, RoomId, User, UserId, UserUpdate,
};

mod models;
mod schema;

use models::*;

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

/// Diesel-backed repository for Postgres.
///
/// Provides connection pooling with configurable limits, automatic retry for
/// transient failures, health monitoring and automatic schema migrations.
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
    /// Retries the operation up to `max_retries` times if a retryable error
    /// occurs (connection errors, timeouts, serialization failures).
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
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.is_ok()
    }

    /// Get detailed health information.
    ///
    /// Returns a tuple of (is_healthy, latency_ms, error_message).
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        match self.health_check().await {
            Ok(()) => (true, Some(start.elapsed().as_millis() as u64), None),
            Err(e) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some(e.to_string()),
            ),
        }
    }
}

/// Room ids with a contract active on `today`.
fn occupied_room_ids(conn: &mut PgConnection, today: NaiveDate) -> RepositoryResult<HashSet<Uuid>> {
    use schema::contracts::dsl as c;
    let ids: Vec<Uuid> = c::contracts
        .filter(c::start_date.le(today))
        .filter(c::end_date.ge(today))
        .select(c::room_id)
        .load(conn)?;
    Ok(ids.into_iter().collect())
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn create_user(&self, new_user: NewUser) -> RepositoryResult<User> {
        self.with_conn(move |conn| {
            use schema::users::dsl as u;
            let row = NewUserRow {
                id: Uuid::new_v4(),
                email: new_user.email.trim().to_ascii_lowercase(),
                first_name: new_user.first_name.clone(),
                last_name: new_user.last_name.clone(),
                phone_number: new_user.phone_number.clone(),
                role: new_user.role.as_str().to_string(),
                is_active: true,
                is_verified: false,
            };
            let inserted: UserRow = diesel::insert_into(u::users)
                .values(&row)
                .returning(UserRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("create_user"))?;
            inserted.try_into()
        })
        .await
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        self.with_conn(move |conn| {
            use schema::users::dsl as u;
            let row: UserRow = u::users
                .find(id.as_uuid())
                .select(UserRow::as_select())
                .first(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("get_user"))?;
            row.try_into()
        })
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> RepositoryResult<User> {
        let email = email.trim().to_ascii_lowercase();
        self.with_conn(move |conn| {
            use schema::users::dsl as u;
            let row: UserRow = u::users
                .filter(u::email.eq(email.clone()))
                .select(UserRow::as_select())
                .first(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("get_user_by_email"))?;
            row.try_into()
        })
        .await
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        self.with_conn(|conn| {
            use schema::users::dsl as u;
            let rows: Vec<UserRow> = u::users
                .order(u::created_at.asc())
                .select(UserRow::as_select())
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("list_users"))?;
            rows.into_iter().map(User::try_from).collect()
        })
        .await
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> RepositoryResult<User> {
        self.with_conn(move |conn| {
            use schema::users::dsl as u;
            conn.transaction(|conn| {
                let row: UserRow = u::users
                    .find(id.as_uuid())
                    .select(UserRow::as_select())
                    .first(conn)?;

                let email = update
                    .email
                    .as_ref()
                    .map(|e| e.trim().to_ascii_lowercase())
                    .unwrap_or(row.email);
                let role = update
                    .role
                    .map(|r| r.as_str().to_string())
                    .unwrap_or(row.role);

                let updated: UserRow = diesel::update(u::users.find(id.as_uuid()))
                    .set((
                        u::email.eq(email),
                        u::first_name.eq(update.first_name.clone().unwrap_or(row.first_name)),
                        u::last_name.eq(update.last_name.clone().unwrap_or(row.last_name)),
                        u::phone_number
                            .eq(update.phone_number.clone().unwrap_or(row.phone_number)),
                        u::role.eq(role),
                        u::is_active.eq(update.is_active.unwrap_or(row.is_active)),
                        u::is_verified.eq(update.is_verified.unwrap_or(row.is_verified)),
                    ))
                    .returning(UserRow::as_returning())
                    .get_result(conn)?;
                Ok::<UserRow, RepositoryError>(updated)
            })
            .map_err(|e: RepositoryError| e.with_operation("update_user"))?
            .try_into()
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            use schema::users::dsl as u;
            let deleted = diesel::delete(u::users.find(id.as_uuid()))
                .execute(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("delete_user"))?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "user not found",
                    ErrorContext::new("delete_user").with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl PropertyRepository for PostgresRepository {
    async fn create_building(&self, new_building: NewBuilding) -> RepositoryResult<Building> {
        self.with_conn(move |conn| {
            use schema::buildings::dsl as b;
            let row = NewBuildingRow {
                id: Uuid::new_v4(),
                name: new_building.name.clone(),
                address: new_building.address.clone(),
            };
            let inserted: BuildingRow = diesel::insert_into(b::buildings)
                .values(&row)
                .returning(BuildingRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("create_building"))?;
            Ok(inserted.into())
        })
        .await
    }

    async fn get_building(&self, id: BuildingId) -> RepositoryResult<Building> {
        self.with_conn(move |conn| {
            use schema::buildings::dsl as b;
            let row: BuildingRow = b::buildings
                .find(id.as_uuid())
                .select(BuildingRow::as_select())
                .first(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("get_building"))?;
            Ok(row.into())
        })
        .await
    }

    async fn list_buildings(&self) -> RepositoryResult<Vec<Building>> {
        self.with_conn(|conn| {
            use schema::buildings::dsl as b;
            let rows: Vec<BuildingRow> = b::buildings
                .order(b::name.asc())
                .select(BuildingRow::as_select())
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("list_buildings"))?;
            Ok(rows.into_iter().map(Building::from).collect())
        })
        .await
    }

    async fn delete_building(&self, id: BuildingId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            use schema::buildings::dsl as b;
            // A foreign key violation from remaining rooms maps to Conflict.
            let deleted = diesel::delete(b::buildings.find(id.as_uuid()))
                .execute(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("delete_building"))?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "building not found",
                    ErrorContext::new("delete_building").with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn create_room(&self, new_room: NewRoom) -> RepositoryResult<Room> {
        self.with_conn(move |conn| {
            use schema::rooms::dsl as r;
            let row = NewRoomRow {
                id: Uuid::new_v4(),
                building_id: new_room.building_id.as_uuid(),
                room_number: new_room.room_number,
            };
            let inserted: RoomRow = diesel::insert_into(r::rooms)
                .values(&row)
                .returning(RoomRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("create_room"))?;
            Ok(inserted.into_room(false))
        })
        .await
    }

    async fn get_room(&self, id: RoomId) -> RepositoryResult<Room> {
        self.with_conn(move |conn| {
            use schema::rooms::dsl as r;
            let row: RoomRow = r::rooms
                .find(id.as_uuid())
                .select(RoomRow::as_select())
                .first(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("get_room"))?;
            let occupied = occupied_room_ids(conn, Utc::now().date_naive())?;
            let is_occupied = occupied.contains(&row.id);
            Ok(row.into_room(is_occupied))
        })
        .await
    }

    async fn list_rooms(&self, building_id: Option<BuildingId>) -> RepositoryResult<Vec<Room>> {
        self.with_conn(move |conn| {
            use schema::rooms::dsl as r;
            let mut query = r::rooms.into_boxed();
            if let Some(building_id) = building_id {
                query = query.filter(r::building_id.eq(building_id.as_uuid()));
            }
            let rows: Vec<RoomRow> = query
                .order((r::building_id.asc(), r::room_number.asc()))
                .select(RoomRow::as_select())
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("list_rooms"))?;
            let occupied = occupied_room_ids(conn, Utc::now().date_naive())?;
            Ok(rows
                .into_iter()
                .map(|row| {
                    let is_occupied = occupied.contains(&row.id);
                    row.into_room(is_occupied)
                })
                .collect())
        })
        .await
    }

    async fn delete_room(&self, id: RoomId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            use schema::rooms::dsl as r;
            let deleted = diesel::delete(r::rooms.find(id.as_uuid()))
                .execute(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("delete_room"))?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "room not found",
                    ErrorContext::new("delete_room").with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ContractRepository for PostgresRepository {
    async fn create_contract(
        &self,
        new_contract: NewContract,
        today: NaiveDate,
    ) -> RepositoryResult<(Contract, Vec<RentPayment>)> {
        self.with_conn(move |conn| {
            use schema::contracts::dsl as c;
            use schema::rent_payments::dsl as p;
            use schema::rooms::dsl as r;

            conn.transaction(|conn| {
                // Row lock on the room serializes concurrent creations, so the
                // overlap check below cannot race.
                let _room: RoomRow = r::rooms
                    .find(new_contract.room_id.as_uuid())
                    .for_update()
                    .select(RoomRow::as_select())
                    .first(conn)
                    .map_err(RepositoryError::from)?;

                let overlapping: i64 = c::contracts
                    .filter(c::room_id.eq(new_contract.room_id.as_uuid()))
                    .filter(c::start_date.le(new_contract.end_date))
                    .filter(c::end_date.ge(new_contract.start_date))
                    .count()
                    .get_result(conn)
                    .map_err(RepositoryError::from)?;
                if overlapping > 0 {
                    return Err(RepositoryError::conflict_with_context(
                        "room already has a contract in this period",
                        ErrorContext::new("create_contract")
                            .with_entity("contract")
                            .with_details(format!(
                                "room_id={} start={} end={}",
                                new_contract.room_id,
                                new_contract.start_date,
                                new_contract.end_date
                            )),
                    ));
                }

                let contract_row = NewContractRow {
                    id: Uuid::new_v4(),
                    user_id: new_contract.user_id.as_uuid(),
                    room_id: new_contract.room_id.as_uuid(),
                    start_date: new_contract.start_date,
                    end_date: new_contract.end_date,
                    rent_cents: new_contract.rent_cents,
                    deposit_cents: new_contract.deposit_cents,
                };
                let inserted: ContractRow = diesel::insert_into(c::contracts)
                    .values(&contract_row)
                    .returning(ContractRow::as_returning())
                    .get_result(conn)
                    .map_err(RepositoryError::from)?;
                let contract = Contract::from(inserted);

                let schedule: Vec<NewRentPaymentRow> = generate_schedule(
                    contract.id,
                    contract.start_date,
                    contract.end_date,
                    today,
                )
                .into_iter()
                .map(|row| NewRentPaymentRow {
                    id: Uuid::new_v4(),
                    contract_id: row.contract_id.as_uuid(),
                    month: row.month.to_string(),
                    status: row.status.as_str().to_string(),
                })
                .collect();
                let payment_rows: Vec<RentPaymentRow> = diesel::insert_into(p::rent_payments)
                    .values(&schedule)
                    .returning(RentPaymentRow::as_returning())
                    .get_results(conn)
                    .map_err(RepositoryError::from)?;
                let mut payments = payment_rows
                    .into_iter()
                    .map(RentPayment::try_from)
                    .collect::<RepositoryResult<Vec<_>>>()?;
                payments.sort_by_key(|p| p.month);

                Ok((contract, payments))
            })
            .map_err(|e: RepositoryError| e.with_operation("create_contract"))
        })
        .await
    }

    async fn get_contract(&self, id: ContractId) -> RepositoryResult<Contract> {
        self.with_conn(move |conn| {
            use schema::contracts::dsl as c;
            let row: ContractRow = c::contracts
                .find(id.as_uuid())
                .select(ContractRow::as_select())
                .first(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("get_contract"))?;
            Ok(row.into())
        })
        .await
    }

    async fn list_contracts(&self, filter: ContractFilter) -> RepositoryResult<Vec<Contract>> {
        self.with_conn(move |conn| {
            use schema::contracts::dsl as c;
            let mut query = c::contracts.into_boxed();
            if let Some(user_id) = filter.user_id {
                query = query.filter(c::user_id.eq(user_id.as_uuid()));
            }
            if let Some(room_id) = filter.room_id {
                query = query.filter(c::room_id.eq(room_id.as_uuid()));
            }
            if let Some(active_on) = filter.active_on {
                query = query
                    .filter(c::start_date.le(active_on))
                    .filter(c::end_date.ge(active_on));
            }
            let rows: Vec<ContractRow> = query
                .order(c::start_date.asc())
                .select(ContractRow::as_select())
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("list_contracts"))?;
            Ok(rows.into_iter().map(Contract::from).collect())
        })
        .await
    }

    async fn delete_contract(&self, id: ContractId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            use schema::contracts::dsl as c;
            // Payment rows go with the contract via ON DELETE CASCADE.
            let deleted = diesel::delete(c::contracts.find(id.as_uuid()))
                .execute(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("delete_contract"))?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "contract not found",
                    ErrorContext::new("delete_contract").with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl PaymentRepository for PostgresRepository {
    async fn get_payment(&self, id: PaymentId) -> RepositoryResult<RentPayment> {
        self.with_conn(move |conn| {
            use schema::rent_payments::dsl as p;
            let row: RentPaymentRow = p::rent_payments
                .find(id.as_uuid())
                .select(RentPaymentRow::as_select())
                .first(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("get_payment"))?;
            row.try_into()
        })
        .await
    }

    async fn list_payments(&self, filter: PaymentFilter) -> RepositoryResult<Vec<RentPayment>> {
        self.with_conn(move |conn| {
            use schema::contracts::dsl as c;
            use schema::rent_payments::dsl as p;
            let mut query = p::rent_payments
                .inner_join(c::contracts)
                .into_boxed();
            if let Some(user_id) = filter.user_id {
                query = query.filter(c::user_id.eq(user_id.as_uuid()));
            }
            if let Some(contract_id) = filter.contract_id {
                query = query.filter(p::contract_id.eq(contract_id.as_uuid()));
            }
            if let Some(status) = filter.status {
                query = query.filter(p::status.eq(status.as_str()));
            }
            // "YYYY-MM" strings order chronologically, so month bounds are
            // plain text comparisons.
            if let Some(from) = filter.from_month {
                query = query.filter(p::month.ge(from.to_string()));
            }
            if let Some(to) = filter.to_month {
                query = query.filter(p::month.le(to.to_string()));
            }
            let rows: Vec<RentPaymentRow> = query
                .order((p::contract_id.asc(), p::month.asc()))
                .select(RentPaymentRow::as_select())
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("list_payments"))?;
            rows.into_iter().map(RentPayment::try_from).collect()
        })
        .await
    }

    async fn update_payment(
        &self,
        id: PaymentId,
        update: RentPaymentUpdate,
    ) -> RepositoryResult<RentPayment> {
        self.with_conn(move |conn| {
            use schema::rent_payments::dsl as p;
            conn.transaction(|conn| {
                let row: RentPaymentRow = p::rent_payments
                    .find(id.as_uuid())
                    .select(RentPaymentRow::as_select())
                    .first(conn)?;

                let status = update
                    .status
                    .map(|s| s.as_str().to_string())
                    .unwrap_or(row.status);
                let payment_date = update.payment_date.unwrap_or(row.payment_date);
                let receipt_path = update.receipt_path.clone().unwrap_or(row.receipt_path);
                let admin_comment = update.admin_comment.clone().unwrap_or(row.admin_comment);
                let user_comment = update.user_comment.clone().unwrap_or(row.user_comment);

                let updated: RentPaymentRow =
                    diesel::update(p::rent_payments.find(id.as_uuid()))
                        .set((
                            p::status.eq(status),
                            p::payment_date.eq(payment_date),
                            p::receipt_path.eq(receipt_path),
                            p::admin_comment.eq(admin_comment),
                            p::user_comment.eq(user_comment),
                        ))
                        .returning(RentPaymentRow::as_returning())
                        .get_result(conn)?;
                Ok::<RentPaymentRow, RepositoryError>(updated)
            })
            .map_err(|e: RepositoryError| e.with_operation("update_payment"))?
            .try_into()
        })
        .await
    }

    async fn refresh_payment_statuses(
        &self,
        today: NaiveDate,
    ) -> RepositoryResult<RefreshOutcome> {
        self.with_conn(move |conn| {
            use schema::rent_payments::dsl as p;
            let current = PaymentMonth::from_date(today).to_string();
            conn.transaction(|conn| {
                let marked_overdue = diesel::update(
                    p::rent_payments
                        .filter(p::status.eq(RentPaymentStatus::Upcoming.as_str()))
                        .filter(p::month.lt(current.clone())),
                )
                .set(p::status.eq(RentPaymentStatus::Overdue.as_str()))
                .execute(conn)?;

                let reverted_rejected = diesel::update(
                    p::rent_payments.filter(p::status.eq(RentPaymentStatus::Rejected.as_str())),
                )
                .set(p::status.eq(RentPaymentStatus::Overdue.as_str()))
                .execute(conn)?;

                Ok::<RefreshOutcome, RepositoryError>(RefreshOutcome {
                    marked_overdue,
                    reverted_rejected,
                })
            })
            .map_err(|e: RepositoryError| e.with_operation("refresh_payment_statuses"))
        })
        .await
    }
}

#[async_trait]
impl LaundryRepository for PostgresRepository {
    async fn create_booking(&self, new_booking: NewBooking) -> RepositoryResult<LaundryBooking> {
        self.with_conn(move |conn| {
            use schema::laundry_bookings::dsl as l;
            let row = NewLaundryBookingRow {
                id: Uuid::new_v4(),
                user_id: new_booking.user_id.as_uuid(),
                booking_date: new_booking.booking_date,
                time_slot: new_booking.time_slot.clone(),
                status: BookingStatus::Pending.as_str().to_string(),
            };
            let inserted: LaundryBookingRow = diesel::insert_into(l::laundry_bookings)
                .values(&row)
                .returning(LaundryBookingRow::as_returning())
                .get_result(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("create_booking"))?;
            inserted.try_into()
        })
        .await
    }

    async fn get_booking(&self, id: BookingId) -> RepositoryResult<LaundryBooking> {
        self.with_conn(move |conn| {
            use schema::laundry_bookings::dsl as l;
            let row: LaundryBookingRow = l::laundry_bookings
                .find(id.as_uuid())
                .select(LaundryBookingRow::as_select())
                .first(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("get_booking"))?;
            row.try_into()
        })
        .await
    }

    async fn list_bookings(&self, filter: BookingFilter) -> RepositoryResult<Vec<LaundryBooking>> {
        self.with_conn(move |conn| {
            use schema::laundry_bookings::dsl as l;
            let mut query = l::laundry_bookings.into_boxed();
            if let Some(user_id) = filter.user_id {
                query = query.filter(l::user_id.eq(user_id.as_uuid()));
            }
            if let Some(status) = filter.status {
                query = query.filter(l::status.eq(status.as_str()));
            }
            let rows: Vec<LaundryBookingRow> = query
                .order((l::booking_date.asc(), l::created_at.asc()))
                .select(LaundryBookingRow::as_select())
                .load(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("list_bookings"))?;
            rows.into_iter().map(LaundryBooking::try_from).collect()
        })
        .await
    }

    async fn save_booking(&self, booking: LaundryBooking) -> RepositoryResult<LaundryBooking> {
        self.with_conn(move |conn| {
            use schema::laundry_bookings::dsl as l;
            let updated: LaundryBookingRow =
                diesel::update(l::laundry_bookings.find(booking.id.as_uuid()))
                    .set((
                        l::booking_date.eq(booking.booking_date),
                        l::time_slot.eq(booking.time_slot.clone()),
                        l::status.eq(booking.status.as_str()),
                        l::proposed_date.eq(booking.proposed_date),
                        l::proposed_time_slot.eq(booking.proposed_time_slot.clone()),
                        l::last_action_by
                            .eq(booking.last_action_by.map(|a| a.to_string())),
                        l::admin_comment.eq(booking.admin_comment.clone()),
                    ))
                    .returning(LaundryBookingRow::as_returning())
                    .get_result(conn)
                    .map_err(|e| RepositoryError::from(e).with_operation("save_booking"))?;
            updated.try_into()
        })
        .await
    }

    async fn delete_booking(&self, id: BookingId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            use schema::laundry_bookings::dsl as l;
            let deleted = diesel::delete(l::laundry_bookings.find(id.as_uuid()))
                .execute(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("delete_booking"))?;
            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    "booking not found",
                    ErrorContext::new("delete_booking").with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<()> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map_err(|e| RepositoryError::from(e).with_operation("health_check"))?;
            Ok(())
        })
        .await
    }
}
