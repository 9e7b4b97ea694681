//! Conversion of a calendrical into concrete date and time types.
//!
//! Canonical slots are used as-is. When a slot is empty the calendrical is merged
//! strictly first and the merged slot is used. Every failure, including one raised
//! by the merge, surfaces as `CalendricalError::ConversionFailed`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::calendrical::Calendrical;
use crate::error::{CalendricalError, Result};
use crate::fields::FieldValueMap;
use crate::types::{OffsetDate, OffsetTime, ZonedDateTime};
use crate::zone::Zone;

fn failed(target: &str, cal: &Calendrical, reason: impl std::fmt::Display) -> CalendricalError {
    CalendricalError::ConversionFailed(format!("cannot convert {cal} to {target}: {reason}"))
}

impl Calendrical {
    fn merged_for(&self, target: &str) -> Result<Calendrical> {
        self.merge_strict().map_err(|e| failed(target, self, e))
    }

    fn require_offset(&self, target: &str) -> Result<FixedOffset> {
        self.offset()
            .ok_or_else(|| failed(target, self, "no offset"))
    }

    /// # Errors
    /// `CalendricalError::ConversionFailed` if no date can be obtained.
    pub fn to_local_date(&self) -> Result<NaiveDate> {
        if let Some(date) = self.date() {
            return Ok(date);
        }
        self.merged_for("LocalDate")?
            .date()
            .ok_or_else(|| failed("LocalDate", self, "not enough information for a date"))
    }

    /// # Errors
    /// `CalendricalError::ConversionFailed` if no time can be obtained.
    pub fn to_local_time(&self) -> Result<NaiveTime> {
        if let Some(time) = self.time() {
            return Ok(time);
        }
        self.merged_for("LocalTime")?
            .time()
            .ok_or_else(|| failed("LocalTime", self, "not enough information for a time"))
    }

    /// # Errors
    /// `CalendricalError::ConversionFailed` unless both a date and a time can be obtained.
    pub fn to_local_date_time(&self) -> Result<NaiveDateTime> {
        if let (Some(date), Some(time)) = (self.date(), self.time()) {
            return Ok(date.and_time(time));
        }
        let merged = self.merged_for("LocalDateTime")?;
        match (merged.date(), merged.time()) {
            (Some(date), Some(time)) => Ok(date.and_time(time)),
            (None, _) => Err(failed("LocalDateTime", self, "not enough information for a date")),
            (_, None) => Err(failed("LocalDateTime", self, "not enough information for a time")),
        }
    }

    /// # Errors
    /// `CalendricalError::ConversionFailed` without an offset or a date.
    pub fn to_offset_date(&self) -> Result<OffsetDate> {
        let offset = self.require_offset("OffsetDate")?;
        let date = self
            .to_local_date()
            .map_err(|e| failed("OffsetDate", self, e))?;
        Ok(OffsetDate::new(date, offset))
    }

    /// # Errors
    /// `CalendricalError::ConversionFailed` without an offset or a time.
    pub fn to_offset_time(&self) -> Result<OffsetTime> {
        let offset = self.require_offset("OffsetTime")?;
        let time = self
            .to_local_time()
            .map_err(|e| failed("OffsetTime", self, e))?;
        Ok(OffsetTime::new(time, offset))
    }

    /// # Errors
    /// `CalendricalError::ConversionFailed` without an offset, a date or a time.
    pub fn to_offset_date_time(&self) -> Result<DateTime<FixedOffset>> {
        let offset = self.require_offset("OffsetDateTime")?;
        let local = self
            .to_local_date_time()
            .map_err(|e| failed("OffsetDateTime", self, e))?;
        offset
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| failed("OffsetDateTime", self, "date-time out of range"))
    }

    /// Converts to a date-time in the zone, using the stored offset.
    ///
    /// # Errors
    /// `CalendricalError::ConversionFailed` without a zone, an offset, a date or a
    /// time, or when the zone does not permit the offset at that local date-time.
    pub fn to_zoned_date_time(&self) -> Result<ZonedDateTime> {
        let zone: Zone = self
            .zone()
            .ok_or_else(|| failed("ZonedDateTime", self, "no zone"))?;
        let date_time = self
            .to_offset_date_time()
            .map_err(|e| failed("ZonedDateTime", self, e))?;
        if !zone.is_valid_offset(date_time.naive_local(), *date_time.offset()) {
            return Err(failed(
                "ZonedDateTime",
                self,
                format!("offset {} is not valid in zone {zone}", date_time.offset()),
            ));
        }
        Ok(ZonedDateTime { date_time, zone })
    }

    /// A copy of the field map.
    pub fn to_date_time_fields(&self) -> FieldValueMap {
        self.fields().clone()
    }

    /// A copy of this calendrical.
    pub fn to_calendrical(&self) -> Calendrical {
        self.clone()
    }
}
