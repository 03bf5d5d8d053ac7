//! Catalog and identity tables
//!
//! Users, hotels and rooms are owned by other services; the engine only reads
//! them. Inserts exist so the tables can be seeded.

use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_role, parse_uuid, parse_uuid_opt, OptionalExt};
use crate::error::Result;
use crate::models::{Hotel, Money, Room, User};

pub struct CatalogStore<'a> {
    conn: &'a Connection,
}

impl<'a> CatalogStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub fn create_user(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, full_name, email, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.full_name,
                user.email,
                user.role.as_str(),
                user.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    #[instrument(skip(self, hotel), fields(hotel_name = %hotel.name))]
    pub fn create_hotel(&self, hotel: &Hotel) -> Result<()> {
        self.conn.execute(
            "INSERT INTO hotels (id, name, location, owner_id) VALUES (?1, ?2, ?3, ?4)",
            params![
                hotel.id.to_string(),
                hotel.name,
                hotel.location,
                hotel.owner_id.map(|id| id.to_string()),
            ],
        )?;
        Ok(())
    }

    #[instrument(skip(self, room), fields(room_id = %room.id, hotel_id = %room.hotel_id))]
    pub fn create_room(&self, room: &Room) -> Result<()> {
        self.conn.execute(
            "INSERT INTO rooms (id, hotel_id, room_size, bed_type, max_people, base_fare_cents, is_ac)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                room.id.to_string(),
                room.hotel_id.to_string(),
                room.room_size,
                room.bed_type,
                room.max_people,
                room.base_fare.cents(),
                room.is_ac as i32,
            ],
        )?;
        Ok(())
    }

    /// Find user by ID
    pub fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, full_name, email, role, created_at FROM users WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok(User {
                        id: parse_uuid(&row.get::<_, String>(0)?)?,
                        full_name: row.get(1)?,
                        email: row.get(2)?,
                        role: parse_role(&row.get::<_, String>(3)?)?,
                        created_at: parse_datetime(&row.get::<_, String>(4)?)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Find hotel by ID
    pub fn find_hotel(&self, id: Uuid) -> Result<Option<Hotel>> {
        let hotel = self
            .conn
            .query_row(
                "SELECT id, name, location, owner_id FROM hotels WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok(Hotel {
                        id: parse_uuid(&row.get::<_, String>(0)?)?,
                        name: row.get(1)?,
                        location: row.get(2)?,
                        owner_id: parse_uuid_opt(row.get::<_, Option<String>>(3)?)?,
                    })
                },
            )
            .optional()?;
        Ok(hotel)
    }

    /// Find room by ID
    pub fn find_room(&self, id: Uuid) -> Result<Option<Room>> {
        let room = self
            .conn
            .query_row(
                "SELECT id, hotel_id, room_size, bed_type, max_people, base_fare_cents, is_ac
                 FROM rooms WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok(Room {
                        id: parse_uuid(&row.get::<_, String>(0)?)?,
                        hotel_id: parse_uuid(&row.get::<_, String>(1)?)?,
                        room_size: row.get(2)?,
                        bed_type: row.get(3)?,
                        max_people: row.get(4)?,
                        base_fare: Money::from_cents(row.get(5)?),
                        is_ac: row.get::<_, i32>(6)? != 0,
                    })
                },
            )
            .optional()?;
        Ok(room)
    }
}
