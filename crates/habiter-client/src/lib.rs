//! Habiter client library.
//!
//! The centerpiece is [`Object`], a bare reference to a platform entity known
//! only by its id. Bound to a [`ConnectionState`], a user-kind object can be
//! messaged directly: the DM channel is looked up in the session cache or
//! opened over REST on demand.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use habiter_client::{ConnectionState, CreateMessage, Messageable, Object, ObjectKind, RestClient};
//!
//! #[tokio::main]
//! async fn main() -> habiter_client::Result<()> {
//!     let rest = RestClient::new("mytoken", None)?;
//!     let state = Arc::new(ConnectionState::new(Arc::new(rest), 128));
//!
//!     let user = Object::bound("80351110224678912", &state, ObjectKind::USER)?;
//!     user.send(&CreateMessage::new().content("Hello!")).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod messageable;
pub mod models;
pub mod object;
pub mod state;

pub use error::{HabiterError, Result};
pub use habiter_common::{InvalidIdentifier, Snowflake};
pub use http::{RestClient, Transport};
pub use messageable::Messageable;
pub use models::*;
pub use object::{Object, ObjectKind};
pub use state::ConnectionState;
