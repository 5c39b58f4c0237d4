//! Typed identifiers for the domain entities.
//!
//! Every aggregate is keyed by a UUID; the newtypes prevent, for example, a
//! room id being passed where a contract id is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Parse from the canonical hyphenated form.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// User identifier.
    UserId
);
uuid_id!(
    /// Building identifier.
    BuildingId
);
uuid_id!(
    /// Room identifier.
    RoomId
);
uuid_id!(
    /// Lease contract identifier.
    ContractId
);
uuid_id!(
    /// Rent payment row identifier.
    PaymentId
);
uuid_id!(
    /// Laundry booking identifier.
    BookingId
);
