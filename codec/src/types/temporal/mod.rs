//! Codecs for dates and times.
//!
//! Four temporal types are supported: [NaiveDateTime], [NaiveDate], [NaiveTime] and
//! [DateTime<Utc>]. Each declared type may be bound to a [Format] when the registry is
//! built (see [crate::Config::temporal]). Unbound types use ISO 8601 text.
//!
//! # Epoch counts
//!
//! Under [Format::Millis] and [Format::Nanos], local values are placed in the bound zone
//! before counting from the epoch, dates count from their start of day, and times count
//! from midnight (so a time is at most one day's worth of milliseconds or nanoseconds).
//!
//! # Components
//!
//! [Format::Array] and [Format::Object] carry the components the type has: all seven for
//! date-times and instants (the latter in the bound zone), year, month and day for dates,
//! hour, minute, second and nanosecond for times. Arrays must hold exactly those components
//! in that order. Objects may list fields in any order and omit some, which then read as
//! the Unix epoch date and zero time components.

mod format;
mod pattern;

pub use format::{Binding, FieldDefaults, Format};
pub use pattern::Pattern;

use super::unexpected;
use crate::{
    codec::{Codec, Context, Factory, Resolution},
    descriptor::TypeDescriptor,
    registry::Registry,
    stream::{Scalar, TokenReader, TokenWriter},
    value::Value,
    Error,
};
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat,
    TimeZone, Timelike, Utc,
};
use std::{collections::HashMap, fmt::Write, sync::Arc};

const ISO_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";
const ISO_DATE: &str = "%Y-%m-%d";
const ISO_TIME: &str = "%H:%M:%S%.f";

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const MILLIS_PER_SECOND: i64 = 1_000;

/// The temporal types codecs are provided for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemporalKind {
    DateTime,
    Date,
    Time,
    Instant,
}

impl TemporalKind {
    /// Returns the kind `ty` describes, if it is temporal.
    pub fn of(ty: &TypeDescriptor) -> Option<Self> {
        if !ty.args().is_empty() {
            return None;
        }
        if ty.is::<NaiveDateTime>() {
            Some(Self::DateTime)
        } else if ty.is::<NaiveDate>() {
            Some(Self::Date)
        } else if ty.is::<NaiveTime>() {
            Some(Self::Time)
        } else if ty.is::<DateTime<Utc>>() {
            Some(Self::Instant)
        } else {
            None
        }
    }

    fn fields(&self) -> &'static [Field] {
        use Field::*;
        match self {
            Self::DateTime | Self::Instant => &[Year, Month, Day, Hour, Minute, Second, Nano],
            Self::Date => &[Year, Month, Day],
            Self::Time => &[Hour, Minute, Second, Nano],
        }
    }
}

/// A component of a date-time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Nano,
}

impl Field {
    const ALL: [Field; 7] = [
        Field::Year,
        Field::Month,
        Field::Day,
        Field::Hour,
        Field::Minute,
        Field::Second,
        Field::Nano,
    ];

    fn name(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Nano => "nano",
        }
    }

    fn named(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    fn get(&self, datetime: &NaiveDateTime) -> i64 {
        match self {
            Self::Year => i64::from(datetime.year()),
            Self::Month => i64::from(datetime.month()),
            Self::Day => i64::from(datetime.day()),
            Self::Hour => i64::from(datetime.hour()),
            Self::Minute => i64::from(datetime.minute()),
            Self::Second => i64::from(datetime.second()),
            Self::Nano => i64::from(datetime.nanosecond()),
        }
    }
}

/// Components collected while reading [Format::Array] or [Format::Object].
#[derive(Debug)]
struct Fields([i64; 7]);

impl Default for Fields {
    fn default() -> Self {
        Self([1970, 1, 1, 0, 0, 0, 0])
    }
}

impl Fields {
    fn set(&mut self, field: Field, value: i64) {
        self.0[field as usize] = value;
    }

    fn get(&self, field: Field) -> i64 {
        self.0[field as usize]
    }

    fn to_datetime(&self) -> Option<NaiveDateTime> {
        let part = |field| u32::try_from(self.get(field)).ok();
        let year = i32::try_from(self.get(Field::Year)).ok()?;
        let date = NaiveDate::from_ymd_opt(year, part(Field::Month)?, part(Field::Day)?)?;
        let time = NaiveTime::from_hms_nano_opt(
            part(Field::Hour)?,
            part(Field::Minute)?,
            part(Field::Second)?,
            part(Field::Nano)?,
        )?;
        Some(date.and_time(time))
    }
}

impl std::fmt::Display for Fields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, field) in Field::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", field.name(), self.get(*field))?;
        }
        Ok(())
    }
}

/// Reads and writes one temporal type under an optional [Binding].
pub struct TemporalCodec {
    kind: TemporalKind,
    binding: Option<Binding>,
}

impl TemporalCodec {
    pub fn new(kind: TemporalKind, binding: Option<Binding>) -> Self {
        Self { kind, binding }
    }

    fn malformed(&self, text: impl Into<String>) -> Error {
        Error::MalformedTemporalValue {
            text: text.into(),
            format: self.binding.as_ref().map(|binding| binding.format.clone()),
        }
    }

    fn zone(&self) -> FixedOffset {
        self.binding
            .as_ref()
            .map_or_else(|| Utc.fix(), |binding| binding.zone)
    }

    fn defaults(&self) -> FieldDefaults {
        self.binding
            .as_ref()
            .map(Binding::defaults)
            .unwrap_or_default()
    }

    /// Wall-clock view of `value` in the bound zone.
    fn local(&self, value: &Value, ty: &TypeDescriptor) -> Result<NaiveDateTime, Error> {
        let defaults = self.defaults();
        match (self.kind, value) {
            (TemporalKind::DateTime, Value::DateTime(datetime)) => Ok(*datetime),
            (TemporalKind::Date, Value::Date(date)) => Ok(date.and_time(defaults.time)),
            (TemporalKind::Time, Value::Time(time)) => Ok(defaults.date.and_time(*time)),
            (TemporalKind::Instant, Value::Instant(instant)) => {
                Ok(instant.with_timezone(&self.zone()).naive_local())
            }
            (_, other) => Err(unexpected(ty, other)),
        }
    }

    /// Builds a value of this codec's kind from a wall-clock view in the bound zone.
    fn at_local(&self, datetime: NaiveDateTime) -> Result<Value, Error> {
        Ok(match self.kind {
            TemporalKind::DateTime => Value::DateTime(datetime),
            TemporalKind::Date => Value::Date(datetime.date()),
            TemporalKind::Time => Value::Time(datetime.time()),
            TemporalKind::Instant => {
                let instant = self
                    .zone()
                    .from_local_datetime(&datetime)
                    .single()
                    .ok_or_else(|| self.malformed(datetime.to_string()))?;
                Value::Instant(instant.with_timezone(&Utc))
            }
        })
    }

    fn read_long(&self, reader: &mut dyn TokenReader) -> Result<i64, Error> {
        reader
            .value_as_long()
            .map_err(|_| self.malformed(reader.value_as_string().unwrap_or_default()))
    }

    fn read_epoch(&self, reader: &mut dyn TokenReader, nanos: bool) -> Result<Value, Error> {
        let count = self.read_long(reader)?;
        let (seconds, subsec) = if nanos {
            (
                count.div_euclid(NANOS_PER_SECOND),
                count.rem_euclid(NANOS_PER_SECOND),
            )
        } else {
            (
                count.div_euclid(MILLIS_PER_SECOND),
                count.rem_euclid(MILLIS_PER_SECOND) * NANOS_PER_MILLI,
            )
        };

        // Both are non-negative and in range after the euclidean split
        let subsec = subsec as u32;
        if self.kind == TemporalKind::Time {
            let time = u32::try_from(seconds)
                .ok()
                .and_then(|seconds| NaiveTime::from_num_seconds_from_midnight_opt(seconds, subsec))
                .ok_or_else(|| self.malformed(count.to_string()))?;
            return Ok(Value::Time(time));
        }
        let instant = DateTime::from_timestamp(seconds, subsec)
            .ok_or_else(|| self.malformed(count.to_string()))?;
        if self.kind == TemporalKind::Instant {
            return Ok(Value::Instant(instant));
        }
        self.at_local(instant.with_timezone(&self.zone()).naive_local())
    }

    fn write_epoch(
        &self,
        value: &Value,
        ty: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
        nanos: bool,
    ) -> Result<(), Error> {
        let (seconds, subsec) = match value {
            Value::Time(time) if self.kind == TemporalKind::Time => (
                i64::from(time.num_seconds_from_midnight()),
                i64::from(time.nanosecond()),
            ),
            _ => {
                let local = self.local(value, ty)?;
                let instant = self
                    .zone()
                    .from_local_datetime(&local)
                    .single()
                    .ok_or_else(|| self.malformed(local.to_string()))?;
                (
                    instant.timestamp(),
                    i64::from(instant.timestamp_subsec_nanos()),
                )
            }
        };
        let count = if nanos {
            seconds
                .checked_mul(NANOS_PER_SECOND)
                .and_then(|count| count.checked_add(subsec))
        } else {
            seconds
                .checked_mul(MILLIS_PER_SECOND)
                .and_then(|count| count.checked_add(subsec / NANOS_PER_MILLI))
        };
        let count = count.ok_or_else(|| self.malformed(format!("{value:?}")))?;
        writer.write_value(Scalar::Integer(count))
    }

    fn read_array(&self, reader: &mut dyn TokenReader) -> Result<Value, Error> {
        reader.begin_array()?;
        let mut fields = Fields::default();
        for (found, field) in self.kind.fields().iter().enumerate() {
            if !reader.has_next() {
                return Err(self.malformed(format!(
                    "expected {} components, found {found}",
                    self.kind.fields().len()
                )));
            }
            reader.next()?;
            fields.set(*field, self.read_long(reader)?);
        }
        if reader.has_next() {
            return Err(self.malformed(format!(
                "more than {} components",
                self.kind.fields().len()
            )));
        }
        reader.end_array()?;
        self.assemble(&fields)
    }

    fn read_object(&self, reader: &mut dyn TokenReader) -> Result<Value, Error> {
        reader.begin_object()?;
        let mut fields = Fields::default();
        while reader.has_next() {
            reader.next()?;
            let name = reader.name()?;
            let field = Field::named(name)
                .filter(|field| self.kind.fields().contains(field))
                .ok_or_else(|| self.malformed(format!("unknown field {name:?}")))?;
            fields.set(field, self.read_long(reader)?);
        }
        reader.end_object()?;
        self.assemble(&fields)
    }

    fn assemble(&self, fields: &Fields) -> Result<Value, Error> {
        let datetime = fields
            .to_datetime()
            .ok_or_else(|| self.malformed(fields.to_string()))?;
        self.at_local(datetime)
    }

    fn write_fields(
        &self,
        value: &Value,
        ty: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
        named: bool,
    ) -> Result<(), Error> {
        let local = self.local(value, ty)?;
        if named {
            writer.begin_object()?;
        } else {
            writer.begin_array()?;
        }
        for field in self.kind.fields() {
            if named {
                writer.write_name(field.name())?;
            }
            writer.write_value(Scalar::Integer(field.get(&local)))?;
        }
        if named {
            writer.end_object()
        } else {
            writer.end_array()
        }
    }

    fn read_iso(&self, text: &str) -> Result<Value, Error> {
        let value = match self.kind {
            TemporalKind::DateTime => {
                NaiveDateTime::parse_from_str(text, ISO_DATE_TIME).map(Value::DateTime)
            }
            TemporalKind::Date => NaiveDate::parse_from_str(text, ISO_DATE).map(Value::Date),
            TemporalKind::Time => NaiveTime::parse_from_str(text, ISO_TIME).map(Value::Time),
            TemporalKind::Instant => DateTime::parse_from_rfc3339(text)
                .map(|instant| Value::Instant(instant.with_timezone(&Utc))),
        };
        value.map_err(|_| self.malformed(text))
    }

    fn write_iso(&self, value: &Value, ty: &TypeDescriptor) -> Result<String, Error> {
        let mut out = String::new();
        let result = match (self.kind, value) {
            (TemporalKind::DateTime, Value::DateTime(datetime)) => {
                write!(out, "{}", datetime.format(ISO_DATE_TIME))
            }
            (TemporalKind::Date, Value::Date(date)) => write!(out, "{}", date.format(ISO_DATE)),
            (TemporalKind::Time, Value::Time(time)) => write!(out, "{}", time.format(ISO_TIME)),
            (TemporalKind::Instant, Value::Instant(instant)) => {
                out.push_str(&instant.to_rfc3339_opts(SecondsFormat::AutoSi, true));
                Ok(())
            }
            (_, other) => return Err(unexpected(ty, other)),
        };
        result.map_err(|_| self.malformed(format!("{value:?}")))?;
        Ok(out)
    }
}

impl Codec for TemporalCodec {
    fn read(
        &self,
        _: &TypeDescriptor,
        reader: &mut dyn TokenReader,
        _: &mut Context<'_>,
    ) -> Result<Value, Error> {
        let Some(binding) = &self.binding else {
            let text = reader.value_as_string()?;
            return self.read_iso(&text);
        };
        match &binding.format {
            Format::Millis => self.read_epoch(reader, false),
            Format::Nanos => self.read_epoch(reader, true),
            Format::Array => self.read_array(reader),
            Format::Object => self.read_object(reader),
            Format::Formatted(pattern, defaults) => {
                let text = reader.value_as_string()?;
                let datetime = pattern
                    .parse(&text, defaults)
                    .map_err(|_| self.malformed(text))?;
                self.at_local(datetime)
            }
        }
    }

    fn write(
        &self,
        value: &Value,
        ty: &TypeDescriptor,
        writer: &mut dyn TokenWriter,
        _: &mut Context<'_>,
    ) -> Result<(), Error> {
        let Some(binding) = &self.binding else {
            let text = self.write_iso(value, ty)?;
            return writer.write_value(Scalar::Text(&text));
        };
        match &binding.format {
            Format::Millis => self.write_epoch(value, ty, writer, false),
            Format::Nanos => self.write_epoch(value, ty, writer, true),
            Format::Array => self.write_fields(value, ty, writer, false),
            Format::Object => self.write_fields(value, ty, writer, true),
            Format::Formatted(pattern, _) => {
                let local = self.local(value, ty)?;
                let text = pattern
                    .format(&local)
                    .map_err(|_| self.malformed(local.to_string()))?;
                writer.write_value(Scalar::Text(&text))
            }
        }
    }
}

/// Claims the temporal types, applying the binding configured for each.
pub struct TemporalFactory {
    bindings: HashMap<TypeDescriptor, Binding>,
}

impl TemporalFactory {
    /// Fails with [Error::InvalidBinding] if any binding targets a non-temporal type.
    pub fn new(bindings: HashMap<TypeDescriptor, Binding>) -> Result<Self, Error> {
        if let Some(ty) = bindings
            .keys()
            .find(|ty| TemporalKind::of(ty).is_none())
            .cloned()
        {
            return Err(Error::InvalidBinding(ty));
        }
        Ok(Self { bindings })
    }
}

impl Factory for TemporalFactory {
    fn create(&self, ty: &TypeDescriptor, _: &Registry) -> Result<Resolution, Error> {
        let Some(kind) = TemporalKind::of(ty) else {
            return Ok(Resolution::Declined);
        };
        let binding = self.bindings.get(ty).cloned();
        Ok(Resolution::Claimed(Arc::new(TemporalCodec::new(kind, binding))))
    }
}
