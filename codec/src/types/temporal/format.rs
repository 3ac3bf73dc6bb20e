use super::pattern::Pattern;
use crate::Error;
use chrono::{FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use std::fmt;

/// Wire representation of a temporal value.
#[derive(Clone, Debug)]
pub enum Format {
    /// Milliseconds since the Unix epoch, as a bare integer.
    Millis,
    /// Nanoseconds since the Unix epoch, as a bare integer.
    Nanos,
    /// `[year, month, day, hour, minute, second, nanosecond]`, limited to the components the
    /// type has.
    Array,
    /// `{"year":..,"month":..,"day":..,"hour":..,"minute":..,"second":..,"nano":..}`, limited
    /// to the components the type has.
    Object,
    /// Text rendered with a [Pattern]. Components the pattern does not capture are taken from
    /// the [FieldDefaults] when reading.
    Formatted(Pattern, FieldDefaults),
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millis => f.write_str("MILLIS"),
            Self::Nanos => f.write_str("NANOS"),
            Self::Array => f.write_str("ARRAY"),
            Self::Object => f.write_str("OBJECT"),
            Self::Formatted(pattern, _) => write!(f, "FORMATTED({pattern})"),
        }
    }
}

/// Components substituted for the ones a pattern does not capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDefaults {
    /// Defaults to 2000-01-01.
    pub date: NaiveDate,
    /// Defaults to midnight.
    pub time: NaiveTime,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            time: NaiveTime::MIN,
        }
    }
}

/// A [Format] bound to a declared temporal type.
#[derive(Clone, Debug)]
pub struct Binding {
    pub format: Format,

    /// Offset used to move between instants and wall-clock components.
    ///
    /// Only matters for conversions that cross that boundary: epoch counts of local values,
    /// and component-wise formats of instants. Defaults to UTC.
    pub zone: FixedOffset,
}

impl Binding {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            zone: Utc.fix(),
        }
    }

    /// Compiles `pattern` and binds it with the default [FieldDefaults].
    pub fn formatted(pattern: &str) -> Result<Self, Error> {
        Ok(Self::new(Format::Formatted(
            Pattern::new(pattern)?,
            FieldDefaults::default(),
        )))
    }

    pub fn with_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = zone;
        self
    }

    /// Replaces the field defaults of a [Format::Formatted] binding. Other formats are left
    /// untouched.
    pub fn with_defaults(mut self, defaults: FieldDefaults) -> Self {
        if let Format::Formatted(_, current) = &mut self.format {
            *current = defaults;
        }
        self
    }

    /// Field defaults in effect. Formats without a pattern use midnight of 2000-01-01.
    pub fn defaults(&self) -> FieldDefaults {
        match &self.format {
            Format::Formatted(_, defaults) => *defaults,
            _ => FieldDefaults::default(),
        }
    }
}
