//! In-memory repository backend.
//!
//! Backs the default `local-repo` feature: a single `RwLock` around the
//! whole store, which also gives contract creation the same atomicity the
//! Postgres backend gets from its row lock. Intended for development and
//! tests; data does not survive a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;

use crate::api::{BookingFilter, ContractFilter, PaymentFilter, RefreshOutcome};
use crate::db::repository::{
    ContractRepository, ErrorContext, FullRepository, LaundryRepository, PaymentRepository,
    PropertyRepository, RepositoryError, RepositoryResult, UserRepository,
};
use crate::models::payment::generate_schedule;
use crate::models::{
    Building, BuildingId, BookingId, BookingStatus, Contract, ContractId, LaundryBooking,
    NewBooking, NewBuilding, NewContract, NewRoom, NewUser, PaymentId, PaymentMonth, RentPayment,
    RentPaymentStatus, Room, RoomId, User, UserId, UserUpdate,
};

#[derive(Default)]
struct Store {
    users: HashMap<UserId, User>,
    buildings: HashMap<BuildingId, Building>,
    rooms: HashMap<RoomId, Room>,
    contracts: HashMap<ContractId, Contract>,
    payments: HashMap<PaymentId, RentPayment>,
    bookings: HashMap<BookingId, LaundryBooking>,
}

/// HashMap-backed repository guarded by one store-wide lock.
#[derive(Default)]
pub struct LocalRepository {
    store: RwLock<Store>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(entity: &str, id: impl ToString) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("{} not found", entity),
        ErrorContext::default()
            .with_entity(entity)
            .with_entity_id(id),
    )
}

impl Store {
    /// A room is occupied when some contract on it is active today.
    fn room_occupancy(&self, room_id: RoomId, today: NaiveDate) -> bool {
        self.contracts
            .values()
            .any(|c| c.room_id == room_id && c.is_active_on(today))
    }

    fn room_with_occupancy(&self, room: &Room, today: NaiveDate) -> Room {
        let mut room = room.clone();
        room.is_occupied = self.room_occupancy(room.id, today);
        room
    }
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn create_user(&self, new_user: NewUser) -> RepositoryResult<User> {
        let mut store = self.store.write();
        let email = new_user.email.trim().to_ascii_lowercase();
        if store.users.values().any(|u| u.email == email) {
            return Err(RepositoryError::conflict_with_context(
                "email already registered",
                ErrorContext::new("create_user").with_entity("user"),
            ));
        }
        let user = User {
            id: UserId::random(),
            email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            phone_number: new_user.phone_number,
            role: new_user.role,
            is_active: true,
            is_verified: false,
            created_at: Utc::now(),
        };
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        self.store
            .read()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("user", id))
    }

    async fn get_user_by_email(&self, email: &str) -> RepositoryResult<User> {
        let email = email.trim().to_ascii_lowercase();
        self.store
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| not_found("user", email))
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        let mut users: Vec<User> = self.store.read().users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> RepositoryResult<User> {
        let mut store = self.store.write();
        if let Some(email) = &update.email {
            let email = email.trim().to_ascii_lowercase();
            if store.users.values().any(|u| u.id != id && u.email == email) {
                return Err(RepositoryError::conflict_with_context(
                    "email already registered",
                    ErrorContext::new("update_user").with_entity("user").with_entity_id(id),
                ));
            }
        }
        let user = store.users.get_mut(&id).ok_or_else(|| not_found("user", id))?;
        if let Some(email) = update.email {
            user.email = email.trim().to_ascii_lowercase();
        }
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(phone_number) = update.phone_number {
            user.phone_number = phone_number;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }
        if let Some(is_verified) = update.is_verified {
            user.is_verified = is_verified;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        self.store
            .write()
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("user", id))
    }
}

#[async_trait]
impl PropertyRepository for LocalRepository {
    async fn create_building(&self, new_building: NewBuilding) -> RepositoryResult<Building> {
        let mut store = self.store.write();
        if store.buildings.values().any(|b| b.name == new_building.name) {
            return Err(RepositoryError::conflict_with_context(
                "building name already exists",
                ErrorContext::new("create_building").with_entity("building"),
            ));
        }
        let building = Building {
            id: BuildingId::random(),
            name: new_building.name,
            address: new_building.address,
            created_at: Utc::now(),
        };
        store.buildings.insert(building.id, building.clone());
        Ok(building)
    }

    async fn get_building(&self, id: BuildingId) -> RepositoryResult<Building> {
        self.store
            .read()
            .buildings
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("building", id))
    }

    async fn list_buildings(&self) -> RepositoryResult<Vec<Building>> {
        let mut buildings: Vec<Building> =
            self.store.read().buildings.values().cloned().collect();
        buildings.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buildings)
    }

    async fn delete_building(&self, id: BuildingId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        if store.rooms.values().any(|r| r.building_id == id) {
            return Err(RepositoryError::conflict_with_context(
                "building still has rooms",
                ErrorContext::new("delete_building")
                    .with_entity("building")
                    .with_entity_id(id),
            ));
        }
        store
            .buildings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("building", id))
    }

    async fn create_room(&self, new_room: NewRoom) -> RepositoryResult<Room> {
        let mut store = self.store.write();
        if !store.buildings.contains_key(&new_room.building_id) {
            return Err(not_found("building", new_room.building_id));
        }
        if store
            .rooms
            .values()
            .any(|r| r.building_id == new_room.building_id && r.room_number == new_room.room_number)
        {
            return Err(RepositoryError::conflict_with_context(
                "room number already exists in building",
                ErrorContext::new("create_room").with_entity("room"),
            ));
        }
        let room = Room {
            id: RoomId::random(),
            building_id: new_room.building_id,
            room_number: new_room.room_number,
            is_occupied: false,
        };
        store.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    async fn get_room(&self, id: RoomId) -> RepositoryResult<Room> {
        let store = self.store.read();
        let room = store.rooms.get(&id).ok_or_else(|| not_found("room", id))?;
        Ok(store.room_with_occupancy(room, Utc::now().date_naive()))
    }

    async fn list_rooms(&self, building_id: Option<BuildingId>) -> RepositoryResult<Vec<Room>> {
        let store = self.store.read();
        let today = Utc::now().date_naive();
        let mut rooms: Vec<Room> = store
            .rooms
            .values()
            .filter(|r| building_id.is_none_or(|b| r.building_id == b))
            .map(|r| store.room_with_occupancy(r, today))
            .collect();
        rooms.sort_by_key(|r| (r.building_id.as_uuid(), r.room_number));
        Ok(rooms)
    }

    async fn delete_room(&self, id: RoomId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        if store.contracts.values().any(|c| c.room_id == id) {
            return Err(RepositoryError::conflict_with_context(
                "room has contracts",
                ErrorContext::new("delete_room")
                    .with_entity("room")
                    .with_entity_id(id),
            ));
        }
        store
            .rooms
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("room", id))
    }
}

#[async_trait]
impl ContractRepository for LocalRepository {
    async fn create_contract(
        &self,
        new_contract: NewContract,
        today: NaiveDate,
    ) -> RepositoryResult<(Contract, Vec<RentPayment>)> {
        // The write lock spans the overlap check and both inserts, so two
        // concurrent creations on the same room cannot interleave.
        let mut store = self.store.write();

        if !store.users.contains_key(&new_contract.user_id) {
            return Err(not_found("user", new_contract.user_id));
        }
        if !store.rooms.contains_key(&new_contract.room_id) {
            return Err(not_found("room", new_contract.room_id));
        }
        let overlapping = store.contracts.values().any(|c| {
            c.room_id == new_contract.room_id
                && c.overlaps(new_contract.start_date, new_contract.end_date)
        });
        if overlapping {
            return Err(RepositoryError::conflict_with_context(
                "room already has a contract in this period",
                ErrorContext::new("create_contract")
                    .with_entity("contract")
                    .with_details(format!(
                        "room_id={} start={} end={}",
                        new_contract.room_id, new_contract.start_date, new_contract.end_date
                    )),
            ));
        }

        let contract = Contract {
            id: ContractId::random(),
            user_id: new_contract.user_id,
            room_id: new_contract.room_id,
            start_date: new_contract.start_date,
            end_date: new_contract.end_date,
            rent_cents: new_contract.rent_cents,
            deposit_cents: new_contract.deposit_cents,
            created_at: Utc::now(),
        };

        let now = Utc::now();
        let payments: Vec<RentPayment> =
            generate_schedule(contract.id, contract.start_date, contract.end_date, today)
                .into_iter()
                .map(|row| RentPayment {
                    id: PaymentId::random(),
                    contract_id: row.contract_id,
                    month: row.month,
                    status: row.status,
                    payment_date: None,
                    receipt_path: None,
                    admin_comment: None,
                    user_comment: None,
                    created_at: now,
                })
                .collect();

        store.contracts.insert(contract.id, contract.clone());
        for payment in &payments {
            store.payments.insert(payment.id, payment.clone());
        }
        Ok((contract, payments))
    }

    async fn get_contract(&self, id: ContractId) -> RepositoryResult<Contract> {
        self.store
            .read()
            .contracts
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("contract", id))
    }

    async fn list_contracts(&self, filter: ContractFilter) -> RepositoryResult<Vec<Contract>> {
        let mut contracts: Vec<Contract> = self
            .store
            .read()
            .contracts
            .values()
            .filter(|c| filter.user_id.is_none_or(|u| c.user_id == u))
            .filter(|c| filter.room_id.is_none_or(|r| c.room_id == r))
            .filter(|c| filter.active_on.is_none_or(|d| c.is_active_on(d)))
            .cloned()
            .collect();
        contracts.sort_by_key(|c| c.start_date);
        Ok(contracts)
    }

    async fn delete_contract(&self, id: ContractId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        store
            .contracts
            .remove(&id)
            .ok_or_else(|| not_found("contract", id))?;
        store.payments.retain(|_, p| p.contract_id != id);
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for LocalRepository {
    async fn get_payment(&self, id: PaymentId) -> RepositoryResult<RentPayment> {
        self.store
            .read()
            .payments
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("payment", id))
    }

    async fn list_payments(&self, filter: PaymentFilter) -> RepositoryResult<Vec<RentPayment>> {
        let store = self.store.read();
        let contract_user = |contract_id: ContractId| {
            store.contracts.get(&contract_id).map(|c| c.user_id)
        };
        let mut payments: Vec<RentPayment> = store
            .payments
            .values()
            .filter(|p| filter.contract_id.is_none_or(|c| p.contract_id == c))
            .filter(|p| filter.status.is_none_or(|s| p.status == s))
            .filter(|p| {
                filter
                    .user_id
                    .is_none_or(|u| contract_user(p.contract_id) == Some(u))
            })
            .filter(|p| filter.from_month.is_none_or(|m| p.month >= m))
            .filter(|p| filter.to_month.is_none_or(|m| p.month <= m))
            .cloned()
            .collect();
        payments.sort_by_key(|p| (p.contract_id.as_uuid(), p.month));
        Ok(payments)
    }

    async fn update_payment(
        &self,
        id: PaymentId,
        update: crate::models::RentPaymentUpdate,
    ) -> RepositoryResult<RentPayment> {
        let mut store = self.store.write();
        let payment = store
            .payments
            .get_mut(&id)
            .ok_or_else(|| not_found("payment", id))?;
        if let Some(status) = update.status {
            payment.status = status;
        }
        if let Some(payment_date) = update.payment_date {
            payment.payment_date = payment_date;
        }
        if let Some(receipt_path) = update.receipt_path {
            payment.receipt_path = receipt_path;
        }
        if let Some(admin_comment) = update.admin_comment {
            payment.admin_comment = admin_comment;
        }
        if let Some(user_comment) = update.user_comment {
            payment.user_comment = user_comment;
        }
        Ok(payment.clone())
    }

    async fn refresh_payment_statuses(
        &self,
        today: NaiveDate,
    ) -> RepositoryResult<RefreshOutcome> {
        let current = PaymentMonth::from_date(today);
        let mut outcome = RefreshOutcome::default();
        let mut store = self.store.write();
        for payment in store.payments.values_mut() {
            match payment.status {
                RentPaymentStatus::Upcoming if payment.month < current => {
                    payment.status = RentPaymentStatus::Overdue;
                    outcome.marked_overdue += 1;
                }
                RentPaymentStatus::Rejected => {
                    payment.status = RentPaymentStatus::Overdue;
                    outcome.reverted_rejected += 1;
                }
                _ => {}
            }
        }
        Ok(outcome)
    }
}

#[async_trait]
impl LaundryRepository for LocalRepository {
    async fn create_booking(&self, new_booking: NewBooking) -> RepositoryResult<LaundryBooking> {
        let mut store = self.store.write();
        if !store.users.contains_key(&new_booking.user_id) {
            return Err(not_found("user", new_booking.user_id));
        }
        let booking = LaundryBooking {
            id: BookingId::random(),
            user_id: new_booking.user_id,
            booking_date: new_booking.booking_date,
            time_slot: new_booking.time_slot,
            status: BookingStatus::Pending,
            proposed_date: None,
            proposed_time_slot: None,
            last_action_by: None,
            admin_comment: None,
            created_at: Utc::now(),
        };
        store.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, id: BookingId) -> RepositoryResult<LaundryBooking> {
        self.store
            .read()
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("booking", id))
    }

    async fn list_bookings(&self, filter: BookingFilter) -> RepositoryResult<Vec<LaundryBooking>> {
        let mut bookings: Vec<LaundryBooking> = self
            .store
            .read()
            .bookings
            .values()
            .filter(|b| filter.user_id.is_none_or(|u| b.user_id == u))
            .filter(|b| filter.status.is_none_or(|s| b.status == s))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| (b.booking_date, b.created_at));
        Ok(bookings)
    }

    async fn save_booking(&self, booking: LaundryBooking) -> RepositoryResult<LaundryBooking> {
        let mut store = self.store.write();
        if !store.bookings.contains_key(&booking.id) {
            return Err(not_found("booking", booking.id));
        }
        store.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn delete_booking(&self, id: BookingId) -> RepositoryResult<()> {
        self.store
            .write()
            .bookings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("booking", id))
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
