use std::any::Any;

use jiff::fmt::strtime;
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned, civil};

use super::{BindField, FieldDescriptor, ParseFailure, Slot, TimeField};
use crate::value::Value;

/// The instant assigned to time fields bound from empty input: the Unix epoch, in UTC.
pub fn zero_time() -> Zoned {
    Timestamp::UNIX_EPOCH.to_zoned(TimeZone::UTC)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// How the text bound to a time field is parsed, as declared by its tags.
///
/// - `time_format`: a `strftime`-style pattern. RFC 3339 when absent.
/// - `time_location`: an IANA time zone name, e.g. `Europe/Rome`.
/// - `time_utc`: interpret the input in UTC.
///
/// When the input carries no offset, it's interpreted in `time_location`,
/// then UTC if `time_utc` is set, then the binder's fallback zone.
pub struct TimeOptions {
    pub format: Option<&'static str>,
    pub location: Option<&'static str>,
    pub utc: bool,
}

impl TimeOptions {
    pub fn from_field(field: &FieldDescriptor) -> Self {
        Self {
            format: field.tag("time_format").filter(|f| !f.is_empty()),
            location: field.tag("time_location").filter(|l| !l.is_empty()),
            utc: field.flag("time_utc"),
        }
    }

    fn time_zone(&self, fallback: &TimeZone) -> Result<TimeZone, jiff::Error> {
        if let Some(name) = self.location {
            return TimeZone::get(name);
        }
        if self.utc {
            return Ok(TimeZone::UTC);
        }
        Ok(fallback.clone())
    }

    pub fn parse(&self, raw: &str, fallback: &TimeZone) -> Result<Zoned, jiff::Error> {
        if raw.is_empty() {
            return Ok(zero_time());
        }
        let tz = self.time_zone(fallback)?;
        let Some(format) = self.format else {
            return Ok(raw.parse::<Timestamp>()?.to_zoned(tz));
        };
        let parsed = strtime::parse(format, raw)?;
        if parsed.offset().is_some() {
            return Ok(parsed.to_timestamp()?.to_zoned(tz));
        }
        let datetime = if parsed.hour().is_some() {
            parsed.to_datetime()?
        } else {
            parsed.to_date()?.to_datetime(civil::Time::midnight())
        };
        datetime.to_zoned(tz)
    }
}

/// Parse `raw` according to the time tags of `field`.
pub fn parse_time(
    raw: &str,
    field: &FieldDescriptor,
    fallback: &TimeZone,
) -> Result<Zoned, ParseFailure> {
    TimeOptions::from_field(field)
        .parse(raw, fallback)
        .map_err(|e| ParseFailure::new(raw, e))
}

impl TimeField for Zoned {
    fn set_zoned(&mut self, zoned: Zoned) {
        *self = zoned;
    }

    fn to_value(&self) -> Value {
        Value::DateTime(self.datetime())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl BindField for Zoned {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Time(self)
    }
}

impl TimeField for Timestamp {
    fn set_zoned(&mut self, zoned: Zoned) {
        *self = zoned.timestamp();
    }

    fn to_value(&self) -> Value {
        Value::DateTime(self.to_zoned(TimeZone::UTC).datetime())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl BindField for Timestamp {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Time(self)
    }
}
