//! # Fecha
//!
//! Timestamp newtype used by every stored entity.
//!
//! The web client sends either full RFC 3339 timestamps
//! (`2025-03-01T14:22:05.120Z`) or bare calendar dates from `<input type="date">`
//! (`2025-03-01`). Both are accepted; bare dates mean midnight UTC. Output is
//! always RFC 3339 with millisecond precision and a `Z` suffix, the same shape
//! `Date.prototype.toISOString()` produces, so dates round-trip through the
//! client unchanged.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// A point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fecha(DateTime<Utc>);

impl Fecha {
    /// Wraps a chrono timestamp.
    #[inline]
    pub const fn new(at: DateTime<Utc>) -> Self {
        Fecha(at)
    }

    /// Current time.
    pub fn now() -> Self {
        Fecha(Utc::now())
    }

    /// Parses RFC 3339 or `YYYY-MM-DD`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();

        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(Fecha(at.with_timezone(&Utc)));
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Fecha(naive.and_utc()))
    }

    /// Returns the wrapped timestamp.
    #[inline]
    pub const fn at(&self) -> DateTime<Utc> {
        self.0
    }

    /// Calendar day (`YYYY-MM-DD`) of this timestamp.
    pub fn dia(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Whole days elapsed from `self` until `later`, floored, never negative.
    pub fn dias_hasta(&self, later: Fecha) -> i64 {
        (later.0 - self.0).num_days().max(0)
    }

    /// Shifts this timestamp back by `days`.
    pub fn menos_dias(&self, days: i64) -> Self {
        Fecha(self.0 - Duration::days(days))
    }
}

impl fmt::Display for Fecha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl FromStr for Fecha {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fecha::parse(s).ok_or_else(|| ValidationError::InvalidFormat {
            field: "fecha".to_string(),
            reason: format!("'{s}' is not an ISO-8601 date"),
        })
    }
}

impl From<DateTime<Utc>> for Fecha {
    fn from(at: DateTime<Utc>) -> Self {
        Fecha(at)
    }
}

impl Serialize for Fecha {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fecha {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Fecha::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
    }
}
