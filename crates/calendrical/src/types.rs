//! Composite results of the conversion layer that chrono has no direct type for.
//!
//! A local date and time map to `chrono::NaiveDate`/`NaiveTime`, an offset
//! date-time to `DateTime<FixedOffset>`. A date or time paired with an offset,
//! and a date-time carrying both offset and zone, are defined here.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::zone::Zone;

/// A local date with an offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetDate {
    pub date: NaiveDate,
    pub offset: FixedOffset,
}

impl OffsetDate {
    pub fn new(date: NaiveDate, offset: FixedOffset) -> Self {
        Self { date, offset }
    }

    pub fn to_local_date(&self) -> NaiveDate {
        self.date
    }
}

impl fmt::Display for OffsetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.date, self.offset)
    }
}

/// A local time with an offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetTime {
    pub time: NaiveTime,
    pub offset: FixedOffset,
}

impl OffsetTime {
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }

    pub fn to_local_time(&self) -> NaiveTime {
        self.time
    }
}

impl fmt::Display for OffsetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.time, self.offset)
    }
}

/// A date-time with the offset in force and the zone that supplied it.
///
/// Built by [`Calendrical::to_zoned_date_time`](crate::Calendrical::to_zoned_date_time),
/// which checks the offset is one the zone permits at that local date-time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZonedDateTime {
    pub date_time: DateTime<FixedOffset>,
    pub zone: Zone,
}

impl ZonedDateTime {
    pub fn offset(&self) -> FixedOffset {
        *self.date_time.offset()
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn to_local_date_time(&self) -> NaiveDateTime {
        self.date_time.naive_local()
    }
}

impl fmt::Display for ZonedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.date_time.to_rfc3339(), self.zone)
    }
}
