//! # habiter-common
//!
//! Snowflake identifiers, configuration, and the errors shared by every Habiter crate.
//! No I/O lives here apart from reading configuration at startup.

pub mod config;
pub mod error;
pub mod snowflake;

pub use error::InvalidIdentifier;
pub use snowflake::Snowflake;
