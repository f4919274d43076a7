//! Error types for the Habiter client.

use habiter_common::InvalidIdentifier;
use thiserror::Error;

use crate::object::ObjectKind;

#[derive(Debug, Error)]
pub enum HabiterError {
    /// A raw id could not be converted to a snowflake.
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    /// The object is not something messages can be sent to. `kind` is `None`
    /// for objects that were never bound to a connection.
    #[error("{} objects cannot be messaged", kind_label(.kind))]
    UnsupportedDestination { kind: Option<ObjectKind> },

    /// The object has no live connection state to act through.
    #[error("Connection state is not available")]
    NotConnected,

    /// The HTTP response had a non-2xx status code.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// An error from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A generic error string.
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HabiterError>;

fn kind_label(kind: &Option<ObjectKind>) -> String {
    match kind {
        Some(kind) => kind.to_string(),
        None => "Unbound".to_owned(),
    }
}
