//! Hotel and room catalog entries

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Money;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub owner_id: Option<Uuid>,
}

impl Hotel {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            location: location.into(),
            owner_id: None,
        }
    }

    pub fn with_owner(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
}

/// A bookable room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub hotel_id: Uuid,
    /// Room type label shown in payment history
    pub room_size: String,
    pub bed_type: String,
    pub max_people: u32,
    /// Nightly rate
    pub base_fare: Money,
    pub is_ac: bool,
}

impl Room {
    pub fn new(hotel_id: Uuid, room_size: impl Into<String>, max_people: u32, base_fare: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            hotel_id,
            room_size: room_size.into(),
            bed_type: "Double".to_string(),
            max_people,
            base_fare,
            is_ac: true,
        }
    }

    pub fn with_bed_type(mut self, bed_type: impl Into<String>) -> Self {
        self.bed_type = bed_type.into();
        self
    }
}
