use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// A reservation of one time slot on one ground. Stored as a flat document,
/// keys in camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub ground: String,
    pub date: String,
    pub time_slot: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Booking {
    /// Slots are matched by exact string equality on all three parts.
    pub fn same_slot(&self, other: &Booking) -> bool {
        self.ground == other.ground && self.date == other.date && self.time_slot == other.time_slot
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Reservation {
    Created,
    /// The slot was already held. Carries the existing booking when the store
    /// could read it back.
    Taken(Option<Booking>),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error during {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: mongodb::error::Error,
    },
    #[error(
        "duplicate slots present in collection {collection}: remove the extra bookings \
         for each (ground, date, timeSlot) before starting"
    )]
    DuplicateSlots {
        collection: &'static str,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Inserts `booking` unless its slot is already held. Check and insert are
    /// a single atomic step.
    async fn reserve(&self, booking: &Booking) -> Result<Reservation, StoreError>;

    /// Time slots of every booking for `ground` on `date`, in store order.
    async fn booked_slots(&self, ground: &str, date: &str) -> Result<Vec<String>, StoreError>;
}
