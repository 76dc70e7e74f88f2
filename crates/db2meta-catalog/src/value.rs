//! Catalog values and their canonical text form
//!
//! Every value read from a catalog view is reduced to one canonical string
//! before any dialect logic sees it, so the mappers never branch on the
//! native column type.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Timelike};
use std::borrow::Cow;

/// A single NULL-capable value as returned by the driver
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogValue {
    /// SQL NULL
    Null,

    /// Character data
    Text(String),

    /// Binary data, assumed to hold text
    Bytes(Vec<u8>),

    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),

    /// Point in time with offset
    Timestamp(DateTime<FixedOffset>),

    /// Calendar date
    Date(NaiveDate),

    /// Time of day
    Time(NaiveTime),
}

impl CatalogValue {
    /// Canonical text of this value
    ///
    /// - NULL becomes the empty string
    /// - text and bytes are kept verbatim
    /// - integers use their decimal form
    /// - floats use the shortest exact digits, in exponent form (`1e+21`)
    ///   when the decimal exponent is below -4 or at least 6
    /// - booleans become `true` / `false`
    /// - timestamps use RFC 3339 with up to nanosecond precision
    /// - anything else uses its `Display` form
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Bytes(b) => String::from_utf8_lossy(b),
            Self::I8(v) => Cow::Owned(v.to_string()),
            Self::I16(v) => Cow::Owned(v.to_string()),
            Self::I32(v) => Cow::Owned(v.to_string()),
            Self::I64(v) => Cow::Owned(v.to_string()),
            Self::U8(v) => Cow::Owned(v.to_string()),
            Self::U16(v) => Cow::Owned(v.to_string()),
            Self::U32(v) => Cow::Owned(v.to_string()),
            Self::U64(v) => Cow::Owned(v.to_string()),
            Self::F32(v) => Cow::Owned(shortest_float(v)),
            Self::F64(v) => Cow::Owned(shortest_float(v)),
            Self::Bool(v) => Cow::Borrowed(if *v { "true" } else { "false" }),
            Self::Timestamp(ts) => Cow::Owned(rfc3339_nano(ts)),
            Self::Date(d) => Cow::Owned(d.to_string()),
            Self::Time(t) => Cow::Owned(t.to_string()),
        }
    }

    /// Whether the canonical form is empty (and the value carries nothing)
    pub fn is_empty(&self) -> bool {
        self.canonical().is_empty()
    }
}

/// Shortest round-tripping text, switching to `d.ddde±XX` for large and tiny magnitudes
fn shortest_float<T: std::fmt::Display + std::fmt::LowerExp>(v: &T) -> String {
    let sci = format!("{:e}", v);
    // NaN and infinities carry no exponent
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return v.to_string();
    };
    match exp.parse::<i32>() {
        Ok(exp) if !(-4..6).contains(&exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        _ => v.to_string(),
    }
}

/// RFC 3339 with the fraction trimmed of trailing zeros
fn rfc3339_nano(ts: &DateTime<FixedOffset>) -> String {
    let mut out = ts.format("%Y-%m-%dT%H:%M:%S").to_string();

    let nanos = ts.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }

    if ts.offset().local_minus_utc() == 0 {
        out.push('Z');
    } else {
        out.push_str(&ts.format("%:z").to_string());
    }
    out
}

impl From<&str> for CatalogValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CatalogValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i16> for CatalogValue {
    fn from(value: i16) -> Self {
        Self::I16(value)
    }
}

impl From<i32> for CatalogValue {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<i64> for CatalogValue {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<bool> for CatalogValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<CatalogValue>> From<Option<T>> for CatalogValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}
