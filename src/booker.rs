use crate::api::{NewBooking, SlotsQuery};
use crate::error::BookingError;
use crate::mailer::{self, Confirmation, Mailer};
use crate::store::{Booking, BookingStore, Reservation};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub const BOOKING_SUCCESSFUL: &str = "Booking successful. Confirmation email sent.";

// missing and "" are treated as absent
fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

// Loose truthiness: missing, null, "", false and 0 count as absent. Other
// scalars are kept in their string form.
fn required_field(name: &str, value: Option<Value>) -> Result<Option<String>, BookingError> {
    Ok(match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) => present(Some(s)),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(true)) => Some(true.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => {
            return Err(BookingError::InvalidBody(format!("{name} must be a string.")));
        }
    })
}

impl TryFrom<NewBooking> for Booking {
    type Error = BookingError;

    fn try_from(value: NewBooking) -> Result<Self, Self::Error> {
        let field = |name: &str, value: Option<Value>| -> Result<String, BookingError> {
            required_field(name, value)?.ok_or(BookingError::MissingFields)
        };

        Ok(Self {
            ground: field("ground", value.ground)?,
            date: field("date", value.date)?,
            time_slot: field("timeSlot", value.time_slot)?,
            name: field("name", value.name)?,
            email: field("email", value.email)?,
            phone: field("phone", value.phone)?,
        })
    }
}

/// Request-independent handles shared by every booking request.
pub struct BookingApp {
    store: Arc<dyn BookingStore>,
    mailer: Arc<dyn Mailer>,
}

impl BookingApp {
    pub fn new(store: Arc<dyn BookingStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    pub async fn handle_new_booking(&self, booking: NewBooking) -> Result<String, BookingError> {
        let booking = Booking::try_from(booking)?;

        match self
            .store
            .reserve(&booking)
            .await
            .map_err(BookingError::Booking)?
        {
            Reservation::Created => {}
            Reservation::Taken(existing) => {
                warn!("Slot already booked: {:?}", existing);
                return Err(BookingError::SlotTaken);
            }
        }

        info!("Booking successful: {:?}", booking);
        // the booking is committed, the email no longer affects the outcome
        mailer::dispatch(self.mailer.clone(), Confirmation::from(&booking));

        Ok(BOOKING_SUCCESSFUL.to_string())
    }

    pub async fn booked_slots(&self, query: SlotsQuery) -> Result<Vec<String>, BookingError> {
        let (Some(ground), Some(date)) = (present(query.ground), present(query.date)) else {
            return Err(BookingError::MissingSlotQuery);
        };

        self.store
            .booked_slots(&ground, &date)
            .await
            .map_err(BookingError::FetchSlots)
    }
}
