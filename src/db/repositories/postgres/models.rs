use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{buildings, contracts, laundry_bookings, rent_payments, rooms, users};
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{
    Actor, BookingStatus, Building, Contract, LaundryBooking, PaymentMonth, RentPayment,
    RentPaymentStatus, Role, Room, User,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub role: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub role: String,
    pub is_active: bool,
    pub is_verified: bool,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> RepositoryResult<User> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e: String| RepositoryError::internal(e))?;
        Ok(User {
            id: row.id.into(),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number: row.phone_number,
            role,
            is_active: row.is_active,
            is_verified: row.is_verified,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = buildings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BuildingRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = buildings)]
pub struct NewBuildingRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
}

impl From<BuildingRow> for Building {
    fn from(row: BuildingRow) -> Building {
        Building {
            id: row.id.into(),
            name: row.name,
            address: row.address,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RoomRow {
    pub id: Uuid,
    pub building_id: Uuid,
    pub room_number: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rooms)]
pub struct NewRoomRow {
    pub id: Uuid,
    pub building_id: Uuid,
    pub room_number: i32,
}

impl RoomRow {
    /// Occupancy is derived from active contracts and supplied by the caller.
    pub fn into_room(self, is_occupied: bool) -> Room {
        Room {
            id: self.id.into(),
            building_id: self.building_id.into(),
            room_number: self.room_number,
            is_occupied,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contracts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContractRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_cents: i64,
    pub deposit_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contracts)]
pub struct NewContractRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_cents: i64,
    pub deposit_cents: i64,
}

impl From<ContractRow> for Contract {
    fn from(row: ContractRow) -> Contract {
        Contract {
            id: row.id.into(),
            user_id: row.user_id.into(),
            room_id: row.room_id.into(),
            start_date: row.start_date,
            end_date: row.end_date,
            rent_cents: row.rent_cents,
            deposit_cents: row.deposit_cents,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rent_payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RentPaymentRow {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub month: String,
    pub status: String,
    pub payment_date: Option<NaiveDate>,
    pub receipt_path: Option<String>,
    pub admin_comment: Option<String>,
    pub user_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rent_payments)]
pub struct NewRentPaymentRow {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub month: String,
    pub status: String,
}

impl TryFrom<RentPaymentRow> for RentPayment {
    type Error = RepositoryError;

    fn try_from(row: RentPaymentRow) -> RepositoryResult<RentPayment> {
        let month: PaymentMonth = row
            .month
            .parse()
            .map_err(|e: String| RepositoryError::internal(e))?;
        let status: RentPaymentStatus = row
            .status
            .parse()
            .map_err(|e: String| RepositoryError::internal(e))?;
        Ok(RentPayment {
            id: row.id.into(),
            contract_id: row.contract_id.into(),
            month,
            status,
            payment_date: row.payment_date,
            receipt_path: row.receipt_path,
            admin_comment: row.admin_comment,
            user_comment: row.user_comment,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = laundry_bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LaundryBookingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub booking_date: NaiveDate,
    pub time_slot: String,
    pub status: String,
    pub proposed_date: Option<NaiveDate>,
    pub proposed_time_slot: Option<String>,
    pub last_action_by: Option<String>,
    pub admin_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = laundry_bookings)]
pub struct NewLaundryBookingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub booking_date: NaiveDate,
    pub time_slot: String,
    pub status: String,
}

impl TryFrom<LaundryBookingRow> for LaundryBooking {
    type Error = RepositoryError;

    fn try_from(row: LaundryBookingRow) -> RepositoryResult<LaundryBooking> {
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|e: String| RepositoryError::internal(e))?;
        let last_action_by = row
            .last_action_by
            .map(|s| s.parse::<Actor>())
            .transpose()
            .map_err(|e: String| RepositoryError::internal(e))?;
        Ok(LaundryBooking {
            id: row.id.into(),
            user_id: row.user_id.into(),
            booking_date: row.booking_date,
            time_slot: row.time_slot,
            status,
            proposed_date: row.proposed_date,
            proposed_time_slot: row.proposed_time_slot,
            last_action_by,
            admin_comment: row.admin_comment,
            created_at: row.created_at,
        })
    }
}
