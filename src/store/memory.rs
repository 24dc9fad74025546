use super::{Booking, BookingStore, Reservation, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Keeps bookings in insertion order in process memory.
#[derive(Default)]
pub struct MemoryStore {
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        self.bookings.read().await.clone()
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn reserve(&self, booking: &Booking) -> Result<Reservation, StoreError> {
        // lookup and push under one write guard
        let mut bookings = self.bookings.write().await;
        if let Some(existing) = bookings.iter().find(|b| b.same_slot(booking)) {
            return Ok(Reservation::Taken(Some(existing.clone())));
        }
        debug!("Adding booking: {:?}", booking);
        bookings.push(booking.clone());
        Ok(Reservation::Created)
    }

    async fn booked_slots(&self, ground: &str, date: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| b.ground == ground && b.date == date)
            .map(|b| b.time_slot.clone())
            .collect())
    }
}
