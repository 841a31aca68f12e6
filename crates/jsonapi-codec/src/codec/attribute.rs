//! Attribute value codecs.
//!
//! The resource codec never converts attribute values itself; every
//! attribute field carries an [`AttributeCodec`]. [`SerdeCodec`] covers any
//! type implementing serde's traits and is what plain
//! [`SchemaBuilder::attribute`](crate::schema::SchemaBuilder::attribute)
//! uses. The remaining codecs are qualified variants for date and time
//! values whose wire representation is a matter of convention.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::{Deserialize, DeserializeOwned};
use serde_json::Value;

use crate::codec::primitives::kind_of;
use crate::error::CodecError;

/// Converts one attribute value to and from its wire form.
pub trait AttributeCodec<T>: Send + Sync + 'static {
    /// Decodes a non-null wire value.
    fn decode(&self, value: &Value) -> Result<T, CodecError>;

    /// Encodes a present value.
    fn encode(&self, value: &T) -> Result<Value, CodecError>;
}

/// Codec delegating to the type's serde implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeCodec;

impl<T> AttributeCodec<T> for SerdeCodec
where
    T: Serialize + DeserializeOwned,
{
    fn decode(&self, value: &Value) -> Result<T, CodecError> {
        Ok(T::deserialize(value)?)
    }

    fn encode(&self, value: &T) -> Result<Value, CodecError> {
        Ok(serde_json::to_value(value)?)
    }
}

fn expect_str<'v>(value: &'v Value, what: &str) -> Result<&'v str, CodecError> {
    value
        .as_str()
        .ok_or_else(|| CodecError(format!("expected {} string, found {}", what, kind_of(value))))
}

fn format_with<D: std::fmt::Display>(formatted: D, pattern: &str) -> Result<Value, CodecError> {
    let mut out = String::new();
    write!(out, "{}", formatted)
        .map_err(|_| CodecError(format!("invalid format pattern {:?}", pattern)))?;
    Ok(Value::String(out))
}

/// Calendar date in a `strftime`-style pattern, e.g. `"%d/%m/%Y"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    pattern: &'static str,
}

impl DateFormat {
    /// Creates a codec for the given pattern.
    pub const fn new(pattern: &'static str) -> Self {
        Self { pattern }
    }

    /// ISO 8601 calendar date (`YYYY-MM-DD`).
    pub const fn iso() -> Self {
        Self::new("%Y-%m-%d")
    }
}

impl AttributeCodec<NaiveDate> for DateFormat {
    fn decode(&self, value: &Value) -> Result<NaiveDate, CodecError> {
        let s = expect_str(value, "a date")?;
        Ok(NaiveDate::parse_from_str(s, self.pattern)?)
    }

    fn encode(&self, value: &NaiveDate) -> Result<Value, CodecError> {
        format_with(value.format(self.pattern), self.pattern)
    }
}

/// UTC timestamp in a `strftime`-style pattern without offset,
/// e.g. `"%Y-%m-%d %H:%M:%S"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeFormat {
    pattern: &'static str,
}

impl DateTimeFormat {
    /// Creates a codec for the given pattern.
    pub const fn new(pattern: &'static str) -> Self {
        Self { pattern }
    }
}

impl AttributeCodec<DateTime<Utc>> for DateTimeFormat {
    fn decode(&self, value: &Value) -> Result<DateTime<Utc>, CodecError> {
        let s = expect_str(value, "a timestamp")?;
        Ok(NaiveDateTime::parse_from_str(s, self.pattern)?.and_utc())
    }

    fn encode(&self, value: &DateTime<Utc>) -> Result<Value, CodecError> {
        format_with(value.format(self.pattern), self.pattern)
    }
}

/// UTC timestamp as RFC 3339 text. Any offset is accepted on decode and
/// normalized to UTC; encode always writes `Z`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rfc3339;

impl AttributeCodec<DateTime<Utc>> for Rfc3339 {
    fn decode(&self, value: &Value) -> Result<DateTime<Utc>, CodecError> {
        let s = expect_str(value, "an RFC 3339 timestamp")?;
        Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
    }

    fn encode(&self, value: &DateTime<Utc>) -> Result<Value, CodecError> {
        Ok(Value::String(value.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
    }
}

/// UTC timestamp as integer milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpochMillis;

impl AttributeCodec<DateTime<Utc>> for EpochMillis {
    fn decode(&self, value: &Value) -> Result<DateTime<Utc>, CodecError> {
        let millis = i64::deserialize(value)?;
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| CodecError(format!("timestamp {} is out of range", millis)))
    }

    fn encode(&self, value: &DateTime<Utc>) -> Result<Value, CodecError> {
        Ok(Value::from(value.timestamp_millis()))
    }
}
