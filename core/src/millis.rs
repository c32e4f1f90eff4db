//! Serde helpers that store a [`Duration`] as whole milliseconds.
//!
//! Use with `#[serde(with = "doors_maze_core::millis")]` on configuration fields.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Writes the duration as an unsigned millisecond count, saturating on overflow.
pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

/// Reads an unsigned millisecond count.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}
