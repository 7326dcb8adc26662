//! ISO-8601 timestamps and nanosecond epochs.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Supplies the current time; swapped out in tests.
pub type TimeProviderFn = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Supplies the current epoch; swapped out in tests.
pub type EpochProviderFn = Arc<dyn Fn() -> Epoch + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("time - unable to parse value. Format should be either :2006-01-02 or 2006-01-02T15:04:05.000Z")]
pub struct ParseIso8601Error;

/// A UTC timestamp rendered as `YYYY-MM-DDTHH:MM:SS.sssZ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Iso8601(DateTime<Utc>);

impl Iso8601 {
    /// The calendar date of `value`, at midnight UTC.
    pub fn new(value: DateTime<Utc>) -> Self {
        Self(value.date_naive().and_time(NaiveTime::MIN).and_utc())
    }

    /// Parses `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS.sssZ`.
    pub fn parse(value: &str) -> Result<Self, ParseIso8601Error> {
        if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
            return Ok(Self(date.and_time(NaiveTime::MIN).and_utc()));
        }
        NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
            .map(|value| Self(value.and_utc()))
            .map_err(|_| ParseIso8601Error)
    }

    pub fn date_string(&self) -> String {
        self.0.format(DATE_FORMAT).to_string()
    }

    /// Nanoseconds since the Unix epoch, saturating outside the representable range.
    pub fn to_epoch(&self) -> Epoch {
        let nanos = self.0.timestamp_nanos_opt().unwrap_or(if self.0.timestamp() < 0 {
            i64::MIN
        } else {
            i64::MAX
        });
        Epoch(nanos)
    }

    pub fn value(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Iso8601 {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl FromStr for Iso8601 {
    type Err = ParseIso8601Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Iso8601 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_TIME_FORMAT))
    }
}

impl Serialize for Iso8601 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Iso8601 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(pub i64);

impl Epoch {
    pub fn now() -> Self {
        Iso8601::from(Utc::now()).to_epoch()
    }

    pub fn to_iso8601(self) -> Iso8601 {
        Iso8601(DateTime::from_timestamp_nanos(self.0))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_iso8601(), f)
    }
}
