use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /user-api/bookGround`. Fields are taken as raw JSON so a
/// missing field is reported as such, and numbers or booleans are accepted and
/// stored in their string form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBooking {
    pub ground: Option<Value>,
    pub date: Option<Value>,
    pub time_slot: Option<Value>,
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub phone: Option<Value>,
}

/// Query of `GET /user-api/bookedSlots`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SlotsQuery {
    pub ground: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlots {
    pub booked_slots: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: Some(error.into()),
        }
    }
}
