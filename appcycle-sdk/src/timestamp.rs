//! Wire timestamp codec.
//!
//! The platform sends timestamps either with millisecond precision
//! (`2024-05-01T12:30:45.123Z`) or with second precision
//! (`2024-05-01T12:30:45Z`). Both are UTC. An all-zero epoch literal means
//! "unset" on the sending side and decodes to the current instant.
//!
//! Encoding always writes millisecond precision.

use serde::{Deserialize, Deserializer, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub const EPOCH_SECONDS: &str = "1970-01-01T00:00:00Z";
pub const EPOCH_MILLIS: &str = "1970-01-01T00:00:00.000Z";

const MILLIS_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");
const SECONDS_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

const MILLIS_LEN: usize = EPOCH_MILLIS.len();
const SECONDS_LEN: usize = EPOCH_SECONDS.len();

#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    #[error("Unknown datetime format: {0}")]
    UnknownFormat(String),
    #[error("Invalid datetime {value}: {source}")]
    Parse {
        value: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("Failed to format datetime: {0}")]
    Format(#[from] time::error::Format),
}

/// Decode a wire timestamp.
pub fn decode(value: &str) -> Result<OffsetDateTime, TimestampError> {
    if value == EPOCH_SECONDS || value == EPOCH_MILLIS {
        return Ok(OffsetDateTime::now_utc());
    }
    let format = match value.len() {
        MILLIS_LEN => MILLIS_FORMAT,
        SECONDS_LEN => SECONDS_FORMAT,
        _ => return Err(TimestampError::UnknownFormat(value.to_string())),
    };
    PrimitiveDateTime::parse(value, format)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|source| TimestampError::Parse {
            value: value.to_string(),
            source,
        })
}

/// Encode a timestamp in UTC with millisecond precision.
pub fn encode(value: &OffsetDateTime) -> Result<String, TimestampError> {
    Ok(value.to_offset(UtcOffset::UTC).format(MILLIS_FORMAT)?)
}

pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let text = encode(value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
    let text = String::deserialize(deserializer)?;
    decode(&text).map_err(serde::de::Error::custom)
}

/// Same codec for optional fields.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| decode(&text).map_err(serde::de::Error::custom))
            .transpose()
    }
}
