//! Buildings and rooms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BuildingId, RoomId};

/// A building holding rentable rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    /// Unique display name.
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBuilding {
    pub name: String,
    pub address: String,
}

/// A room inside a building.
///
/// `is_occupied` is never persisted: repositories recompute it from the
/// contracts active on the day of the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub building_id: BuildingId,
    /// Positive, unique within the building.
    pub room_number: i32,
    pub is_occupied: bool,
}

/// Fields for creating a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    pub building_id: BuildingId,
    pub room_number: i32,
}

impl NewRoom {
    /// Room numbers must be positive.
    pub fn validate(&self) -> Result<(), String> {
        if self.room_number <= 0 {
            return Err("room number must be greater than 0".to_string());
        }
        Ok(())
    }
}
