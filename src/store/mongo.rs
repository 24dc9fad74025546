use super::{Booking, BookingStore, Reservation, StoreError};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{Error, ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use tracing::{error, info};

const COLLECTION: &str = "bookings";
const SLOT_INDEX: &str = "slot_unique";
// where existing deployments keep their data when the URI names no database
const FALLBACK_DATABASE: &str = "test";
const DUPLICATE_KEY: i32 = 11000;

pub struct MongoStore {
    bookings: Collection<Booking>,
}

fn database_error(operation: &'static str) -> impl FnOnce(Error) -> StoreError {
    move |source| StoreError::Database { operation, source }
}

fn is_duplicate_key(err: &Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

// Bookings made before the index existed may already share a slot.
fn index_error(collection: &'static str, source: Error) -> StoreError {
    if is_duplicate_key(&source) {
        let err = StoreError::DuplicateSlots { collection, source };
        error!("{}", err);
        err
    } else {
        database_error("create_index")(source)
    }
}

impl MongoStore {
    /// Connects, checks the server answers and makes sure the slot index
    /// exists. Any failure here is meant to stop the process.
    pub async fn connect(uri: &str, database: Option<&str>) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(database_error("connect"))?;

        let db = match database {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(FALLBACK_DATABASE)),
        };

        db.run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(database_error("ping"))?;
        info!("MongoDB connected, database: {}", db.name());

        let store = Self {
            bookings: db.collection(COLLECTION),
        };
        store.ensure_slot_index().await?;
        Ok(store)
    }

    async fn ensure_slot_index(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "ground": 1, "date": 1, "timeSlot": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(SLOT_INDEX.to_string())
                    .build(),
            )
            .build();

        self.bookings
            .create_index(index, None)
            .await
            .map_err(|source| index_error(COLLECTION, source))?;
        info!("Unique slot index ready on {}", COLLECTION);
        Ok(())
    }
}

#[async_trait]
impl BookingStore for MongoStore {
    async fn reserve(&self, booking: &Booking) -> Result<Reservation, StoreError> {
        // Upsert keyed on the slot. The filter fields land in the new document,
        // the contact fields only when nothing matched.
        let filter = doc! {
            "ground": booking.ground.as_str(),
            "date": booking.date.as_str(),
            "timeSlot": booking.time_slot.as_str(),
        };
        let update = doc! {
            "$setOnInsert": {
                "name": booking.name.as_str(),
                "email": booking.email.as_str(),
                "phone": booking.phone.as_str(),
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .build();

        match self
            .bookings
            .find_one_and_update(filter, update, options)
            .await
        {
            Ok(None) => Ok(Reservation::Created),
            Ok(Some(existing)) => Ok(Reservation::Taken(Some(existing))),
            // lost a race against a concurrent upsert of the same slot
            Err(e) if is_duplicate_key(&e) => Ok(Reservation::Taken(None)),
            Err(e) => Err(database_error("find_one_and_update")(e)),
        }
    }

    async fn booked_slots(&self, ground: &str, date: &str) -> Result<Vec<String>, StoreError> {
        let cursor = self
            .bookings
            .find(doc! { "ground": ground, "date": date }, None)
            .await
            .map_err(database_error("find"))?;

        cursor
            .map_ok(|booking| booking.time_slot)
            .try_collect::<Vec<String>>()
            .await
            .map_err(database_error("find"))
    }
}
