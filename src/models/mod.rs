//! Domain model: identifiers, users, property inventory, lease contracts,
//! rent payments and laundry bookings.

pub mod contract;
pub mod ids;
pub mod laundry;
pub mod month;
pub mod payment;
pub mod property;
pub mod uploads;
pub mod user;

pub use contract::{Contract, NewContract};
pub use ids::{BookingId, BuildingId, ContractId, PaymentId, RoomId, UserId};
pub use laundry::{
    Actor, BookingAction, BookingStatus, IllegalBookingAction, LaundryBooking, NewBooking,
};
pub use month::PaymentMonth;
pub use payment::{
    generate_schedule, NewRentPayment, RentPayment, RentPaymentStatus, RentPaymentUpdate,
};
pub use property::{Building, NewBuilding, NewRoom, Room};
pub use user::{NewUser, Role, User, UserUpdate};
