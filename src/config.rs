use anyhow::{anyhow, Context, Result};
use std::env;

pub const DEFAULT_PORT: u16 = 5003;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5175";

#[derive(Debug, Clone)]
pub struct Config {
    pub mongo_uri: String,
    /// Overrides the database named in the URI.
    pub mongo_db: Option<String>,
    pub email_user: String,
    pub email_pass: String,
    pub smtp_host: String,
    pub port: u16,
    /// The single origin browsers may call the API from.
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let required =
            |key: &str| optional(key).ok_or_else(|| anyhow!("{key} is not set in the environment"));

        let port = match optional("PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {port}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            mongo_uri: required("MONGO_URI")?,
            mongo_db: optional("MONGO_DB"),
            email_user: required("EMAIL_USER")?,
            email_pass: required("EMAIL_PASS")?,
            smtp_host: optional("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port,
            cors_origin: optional("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
        })
    }
}
