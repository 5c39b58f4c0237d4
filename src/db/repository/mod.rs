//! Repository abstraction for the rental backend.
//!
//! Defines the storage traits every backend (in-memory, Postgres) must
//! implement. The service layer depends only on these traits, so backends
//! can be swapped through the factory without touching business logic.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::api::{BookingFilter, ContractFilter, PaymentFilter, RefreshOutcome};
use crate::models::{
    Building, BuildingId, Contract, ContractId, LaundryBooking, BookingId, NewBooking,
    NewBuilding, NewContract, NewRoom, NewUser, RentPayment, PaymentId, RentPaymentUpdate,
    Room, RoomId, User, UserId, UserUpdate,
};

/// User account storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, new_user: NewUser) -> RepositoryResult<User>;
    async fn get_user(&self, id: UserId) -> RepositoryResult<User>;
    async fn get_user_by_email(&self, email: &str) -> RepositoryResult<User>;
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;
    async fn update_user(&self, id: UserId, update: UserUpdate) -> RepositoryResult<User>;
    async fn delete_user(&self, id: UserId) -> RepositoryResult<()>;
}

/// Building and room inventory storage.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn create_building(&self, new_building: NewBuilding) -> RepositoryResult<Building>;
    async fn get_building(&self, id: BuildingId) -> RepositoryResult<Building>;
    async fn list_buildings(&self) -> RepositoryResult<Vec<Building>>;
    async fn delete_building(&self, id: BuildingId) -> RepositoryResult<()>;

    async fn create_room(&self, new_room: NewRoom) -> RepositoryResult<Room>;
    async fn get_room(&self, id: RoomId) -> RepositoryResult<Room>;
    /// List rooms, optionally restricted to one building.
    async fn list_rooms(&self, building_id: Option<BuildingId>) -> RepositoryResult<Vec<Room>>;
    async fn delete_room(&self, id: RoomId) -> RepositoryResult<()>;
}

/// Lease contract storage.
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Create a contract and its full payment schedule atomically.
    ///
    /// The implementation must serialize creation per room (row lock or
    /// equivalent), reject date ranges overlapping an existing contract on
    /// the same room with [`RepositoryError::Conflict`], and insert one
    /// payment row per month of the term.
    async fn create_contract(
        &self,
        new_contract: NewContract,
        today: NaiveDate,
    ) -> RepositoryResult<(Contract, Vec<RentPayment>)>;

    async fn get_contract(&self, id: ContractId) -> RepositoryResult<Contract>;
    async fn list_contracts(&self, filter: ContractFilter) -> RepositoryResult<Vec<Contract>>;
    /// Delete a contract and its payment rows.
    async fn delete_contract(&self, id: ContractId) -> RepositoryResult<()>;
}

/// Rent payment storage.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn get_payment(&self, id: PaymentId) -> RepositoryResult<RentPayment>;
    async fn list_payments(&self, filter: PaymentFilter) -> RepositoryResult<Vec<RentPayment>>;
    async fn update_payment(
        &self,
        id: PaymentId,
        update: RentPaymentUpdate,
    ) -> RepositoryResult<RentPayment>;

    /// Status sweep: upcoming rows whose month has passed become overdue,
    /// rejected rows revert to overdue for re-submission.
    async fn refresh_payment_statuses(&self, today: NaiveDate) -> RepositoryResult<RefreshOutcome>;
}

/// Laundry booking storage.
#[async_trait]
pub trait LaundryRepository: Send + Sync {
    async fn create_booking(&self, new_booking: NewBooking) -> RepositoryResult<LaundryBooking>;
    async fn get_booking(&self, id: BookingId) -> RepositoryResult<LaundryBooking>;
    async fn list_bookings(&self, filter: BookingFilter) -> RepositoryResult<Vec<LaundryBooking>>;
    /// Persist a booking updated by the negotiation state machine.
    async fn save_booking(&self, booking: LaundryBooking) -> RepositoryResult<LaundryBooking>;
    async fn delete_booking(&self, id: BookingId) -> RepositoryResult<()>;
}

/// Combined repository interface used by the service layer.
#[async_trait]
pub trait FullRepository:
    UserRepository + PropertyRepository + ContractRepository + PaymentRepository + LaundryRepository
{
    /// Verify the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<()>;
}
