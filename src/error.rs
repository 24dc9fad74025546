use crate::api::MessageBody;
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("All fields are required.")]
    MissingFields,
    #[error("Ground and date are required.")]
    MissingSlotQuery,
    #[error("This time slot is already booked.")]
    SlotTaken,
    #[error("{0}")]
    InvalidBody(String),
    #[error("An error occurred while booking.")]
    Booking(#[source] StoreError),
    #[error("An error occurred while fetching booked slots.")]
    FetchSlots(#[source] StoreError),
}

impl BookingError {
    pub fn status(&self) -> StatusCode {
        match self {
            BookingError::MissingFields
            | BookingError::MissingSlotQuery
            | BookingError::SlotTaken
            | BookingError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            BookingError::Booking(_) | BookingError::FetchSlots(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let body = match &self {
            // only the display text of the cause leaves the process
            BookingError::Booking(cause) => {
                MessageBody::with_error(self.to_string(), cause.to_string())
            }
            _ => MessageBody::new(self.to_string()),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: BookingError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_carry_only_a_message() {
        let (status, body) = body_of(BookingError::SlotTaken).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({ "message": "This time slot is already booked." })
        );
    }

    #[tokio::test]
    async fn booking_failure_echoes_cause_text() {
        let (status, body) = body_of(BookingError::Booking(StoreError::Unavailable(
            "connection reset".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An error occurred while booking.");
        assert_eq!(body["error"], "store unavailable: connection reset");
    }

    #[tokio::test]
    async fn slot_lookup_failure_hides_cause() {
        let (status, body) = body_of(BookingError::FetchSlots(StoreError::Unavailable(
            "connection reset".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({ "message": "An error occurred while fetching booked slots." })
        );
    }
}
