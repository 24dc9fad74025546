use crate::api::{BookedSlots, MessageBody, NewBooking, SlotsQuery};
use crate::booker::BookingApp;
use crate::error::BookingError;
use anyhow::{Context, Result};
use axum::{
    debug_handler,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Query, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    timeout::TimeoutLayer,
};
use tracing::{debug, error};

pub const WELCOME: &str = "Welcome to the Sports Management API";

async fn handle_root() -> &'static str {
    WELCOME
}

#[debug_handler]
async fn handle_book_ground(
    State(booker): State<Arc<BookingApp>>,
    payload: Result<Json<NewBooking>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageBody>), BookingError> {
    let Json(payload) = payload.map_err(|e| {
        debug!("Rejected booking body: {}", e);
        BookingError::InvalidBody(e.body_text())
    })?;

    match booker.handle_new_booking(payload).await {
        Ok(message) => Ok((StatusCode::OK, Json(MessageBody::new(message)))),
        Err(e) => {
            if let Some(cause) = std::error::Error::source(&e) {
                error!("Booking error: {:?}", cause);
            }
            Err(e)
        }
    }
}

async fn handle_booked_slots(
    State(booker): State<Arc<BookingApp>>,
    query: Result<Query<SlotsQuery>, QueryRejection>,
) -> Result<Json<BookedSlots>, BookingError> {
    let Query(query) = query.map_err(|e| BookingError::InvalidBody(e.body_text()))?;

    match booker.booked_slots(query).await {
        Ok(booked_slots) => Ok(Json(BookedSlots { booked_slots })),
        Err(e) => {
            if let Some(cause) = std::error::Error::source(&e) {
                error!("Fetch booked slots error: {:?}", cause);
            }
            Err(e)
        }
    }
}

fn booking_api(booker: Arc<BookingApp>) -> Router {
    Router::new()
        .route("/bookGround", post(handle_book_ground))
        .route("/bookedSlots", get(handle_booked_slots))
        .with_state(booker)
}

fn cors(origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("CORS origin is not a valid header value: {origin}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

/// The full HTTP surface, with the only browser origin allowed to call it.
pub fn router(booker: Arc<BookingApp>, cors_origin: &str) -> Result<Router> {
    let middleware = tower::ServiceBuilder::new()
        .layer(CompressionLayer::new().quality(tower_http::CompressionLevel::Fastest))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CatchPanicLayer::new())
        .layer(cors(cors_origin)?);

    Ok(Router::new()
        .route("/", get(handle_root))
        .nest("/user-api", booking_api(booker))
        .layer(middleware))
}
