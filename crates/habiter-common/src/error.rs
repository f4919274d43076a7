//! Errors shared across Habiter crates.

use std::convert::Infallible;

/// A raw identifier could not be converted into a [`Snowflake`](crate::Snowflake).
///
/// Conversion is the only validation an identifier goes through, so this is
/// the only way constructing one can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("id parameter must be convertible to an integer, got {input}")]
pub struct InvalidIdentifier {
    /// Description of the rejected input.
    pub input: String,
}

impl InvalidIdentifier {
    pub fn new(input: impl Into<String>) -> Self {
        Self { input: input.into() }
    }
}

// Lets infallible conversions (`u64 -> Snowflake`) flow through the same
// generic constructors as fallible ones.
impl From<Infallible> for InvalidIdentifier {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
