#![forbid(unsafe_code)]
pub mod api;
pub mod booker;
pub mod config;
pub mod error;
pub mod mailer;
pub mod server;
pub mod store;

pub use booker::BookingApp;
pub use config::Config;
pub use error::BookingError;
