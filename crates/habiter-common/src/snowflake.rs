//! Snowflake identifiers.
//!
//! Every entity on the platform is addressed by a 64-bit snowflake. The high
//! 42 bits hold milliseconds since [`DISCORD_EPOCH`]; the low 22 bits hold the
//! worker, process, and per-process increment that made the id unique.
//!
//! ```text
//!  63                                         22 21   17 16   12 11          0
//! +---------------------------------------------+-------+-------+-------------+
//! |        milliseconds since DISCORD_EPOCH      | worker|process|  increment  |
//! +---------------------------------------------+-------+-------+-------------+
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::InvalidIdentifier;

/// First second of 2015 in Unix milliseconds.
pub const DISCORD_EPOCH: u64 = 1_420_070_400_000;

const TIMESTAMP_SHIFT: u32 = 22;
const WORKER_MASK: u64 = 0x3E_0000;
const PROCESS_MASK: u64 = 0x1_F000;
const INCREMENT_MASK: u64 = 0xFFF;
/// Largest millisecond offset that still fits above the low 22 bits.
const MAX_OFFSET_MS: u64 = (1 << (64 - TIMESTAMP_SHIFT)) - 1;

/// A platform identifier.
///
/// Serialized as a decimal string, which is how the API sends ids to avoid
/// precision loss in JSON consumers. Deserializes from either a string or a
/// JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(u64);

impl Snowflake {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Unix milliseconds encoded in the id.
    pub const fn timestamp_ms(self) -> u64 {
        (self.0 >> TIMESTAMP_SHIFT) + DISCORD_EPOCH
    }

    /// Creation time in UTC with millisecond precision.
    ///
    /// Any id decodes to some instant; ids the platform never issued simply
    /// decode to meaningless ones.
    pub fn created_at(self) -> DateTime<Utc> {
        // (u64::MAX >> 22) + DISCORD_EPOCH is far inside chrono's range.
        DateTime::from_timestamp_millis(self.timestamp_ms() as i64).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub const fn worker_id(self) -> u8 {
        ((self.0 & WORKER_MASK) >> 17) as u8
    }

    pub const fn process_id(self) -> u8 {
        ((self.0 & PROCESS_MASK) >> 12) as u8
    }

    pub const fn increment(self) -> u16 {
        (self.0 & INCREMENT_MASK) as u16
    }

    /// Smallest snowflake that could have been issued at `at`, or the largest
    /// one when `high` is set. Useful as a `before`/`after` bound when paging.
    ///
    /// Instants before the epoch clamp to zero.
    pub fn from_datetime(at: DateTime<Utc>, high: bool) -> Self {
        let offset = at
            .timestamp_millis()
            .checked_sub(DISCORD_EPOCH as i64)
            .filter(|ms| *ms > 0)
            .map_or(0, |ms| (ms as u64).min(MAX_OFFSET_MS));
        let low = if high { (1 << TIMESTAMP_SHIFT) - 1 } else { 0 };
        Self((offset << TIMESTAMP_SHIFT) | low)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for Snowflake {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for u64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl TryFrom<i64> for Snowflake {
    type Error = InvalidIdentifier;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        u64::try_from(id)
            .map(Self)
            .map_err(|_| InvalidIdentifier::new(format!("negative integer {id}")))
    }
}

impl FromStr for Snowflake {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| InvalidIdentifier::new(format!("string {s:?}")))
    }
}

impl TryFrom<&str> for Snowflake {
    type Error = InvalidIdentifier;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for Snowflake {
    type Error = InvalidIdentifier;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct SnowflakeVisitor;

impl<'de> Visitor<'de> for SnowflakeVisitor {
    type Value = Snowflake;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a snowflake as a decimal string or non-negative integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Snowflake(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Snowflake::try_from(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Example id from the platform's developer documentation.
    const DOC_ID: u64 = 175_928_847_299_117_063;

    #[test]
    fn test_decode_documented_id() {
        let id = Snowflake::new(DOC_ID);
        assert_eq!(id.timestamp_ms(), 1_462_015_105_796);
        assert_eq!(
            id.created_at(),
            Utc.with_ymd_and_hms(2016, 4, 30, 11, 18, 25).unwrap()
                + chrono::Duration::milliseconds(796)
        );
        assert_eq!(id.worker_id(), 1);
        assert_eq!(id.process_id(), 0);
        assert_eq!(id.increment(), 7);
    }

    #[test]
    fn test_zero_decodes_to_epoch() {
        let created = Snowflake::new(0).created_at();
        assert_eq!(created.timestamp_millis(), DISCORD_EPOCH as i64);
    }

    #[test]
    fn test_max_id_still_decodes() {
        let created = Snowflake::new(u64::MAX).created_at();
        assert!(created > Snowflake::new(DOC_ID).created_at());
        assert_ne!(created, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_created_at_is_pure() {
        let id = Snowflake::new(DOC_ID);
        assert_eq!(id.created_at(), id.created_at());
    }

    #[test]
    fn test_parse_strings() {
        assert_eq!("42".parse::<Snowflake>().unwrap().get(), 42);
        assert_eq!(Snowflake::try_from(" 42\n").unwrap().get(), 42);
        assert_eq!(Snowflake::try_from(String::from("+7")).unwrap().get(), 7);
    }

    #[test]
    fn test_parse_rejects_non_integers() {
        for bad in ["", "abc", "4.2", "0x10", "-1", "18446744073709551616"] {
            let err = bad.parse::<Snowflake>().unwrap_err();
            assert!(err.input.contains(&format!("{bad:?}")), "{bad}: {err}");
        }
    }

    #[test]
    fn test_from_integers() {
        assert_eq!(Snowflake::from(9u64).get(), 9);
        assert_eq!(Snowflake::try_from(9i64).unwrap().get(), 9);
        assert!(Snowflake::try_from(-9i64).is_err());
    }

    #[test]
    fn test_from_datetime_brackets_ids_issued_then() {
        let id = Snowflake::new(DOC_ID);
        let at = id.created_at();
        let low = Snowflake::from_datetime(at, false);
        let high = Snowflake::from_datetime(at, true);
        assert!(low <= id && id <= high);
        assert_eq!(low.created_at(), at);
        assert_eq!(high.created_at(), at);
    }

    #[test]
    fn test_from_datetime_before_epoch_clamps() {
        let before = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Snowflake::from_datetime(before, false).get(), 0);
    }

    #[test]
    fn test_serde_string_or_number() {
        let from_str: Snowflake = serde_json::from_str("\"42\"").unwrap();
        let from_num: Snowflake = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(serde_json::to_string(&from_num).unwrap(), "\"42\"");
        assert!(serde_json::from_str::<Snowflake>("-1").is_err());
        assert!(serde_json::from_str::<Snowflake>("\"nope\"").is_err());
    }
}
