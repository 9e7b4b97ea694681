//! Field-to-field derivation over a field map.
//!
//! Two layers answer a request. Direct relations compute one field from others
//! (quarter-of-year from month-of-year, hour-of-day from am/pm plus hour-of-am/pm, ...).
//! When no relation applies, the map is resolved to a date and/or time and the
//! requested field is read from those.
//!
//! Relations only consume source values inside their legal range, except during a
//! lenient resolution where out-of-range values roll over into the next larger unit.
//! Cycles in the relation graph (hour-of-day and clock-hour-of-day derive each other)
//! are cut by tracking the rules already being derived.

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Weekday};

use crate::error::{CalendricalError, Result};
use crate::fields::FieldValueMap;
use crate::rule::{
    check_in_range, is_leap_year, month_length, weeks_in_week_based_year, FieldRule, ValueRange,
    EPOCH_DAY_OFFSET,
};

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i64 = 24 * NANOS_PER_HOUR;

/// Largest magnitude a lenient relation accepts as input. Keeps every relation's
/// arithmetic inside `i64`.
const LENIENT_LIMIT: u64 = 1 << 31;

/// Rules currently being derived, one bit per rule.
#[derive(Clone, Copy, Default)]
struct Visiting(u64);

impl Visiting {
    fn contains(self, rule: FieldRule) -> bool {
        self.0 & (1 << rule as u32) != 0
    }

    fn with(self, rule: FieldRule) -> Self {
        Visiting(self.0 | (1 << rule as u32))
    }
}

/// How resolution treats a value outside its rule's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The value counts as absent.
    Quiet,
    /// The value is an error.
    Strict,
    /// The value rolls over: the 32nd of June is the 2nd of July, hour 26 is
    /// 02:00 on the next day.
    Lenient,
}

/// A date or time resolved from fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolved<T> {
    pub(crate) value: T,
    /// Whole days a time overflowed by. Always zero for a date.
    pub(crate) days: i64,
    /// The rules the value was built from.
    pub(crate) from: &'static [FieldRule],
}

impl<T> Resolved<T> {
    fn new(value: T, from: &'static [FieldRule]) -> Self {
        Self {
            value,
            days: 0,
            from,
        }
    }
}

const BY_EPOCH_DAY: &[FieldRule] = &[FieldRule::EpochDay];
const BY_YEAR_MONTH_DAY: &[FieldRule] =
    &[FieldRule::Year, FieldRule::MonthOfYear, FieldRule::DayOfMonth];
const BY_YEAR_DAY: &[FieldRule] = &[FieldRule::Year, FieldRule::DayOfYear];
const BY_WEEK_DATE: &[FieldRule] = &[
    FieldRule::WeekBasedYear,
    FieldRule::WeekOfWeekBasedYear,
    FieldRule::DayOfWeek,
];
const BY_NANO_OF_DAY: &[FieldRule] = &[FieldRule::NanoOfDay];
const BY_CLOCK: &[FieldRule] = &[
    FieldRule::HourOfDay,
    FieldRule::MinuteOfHour,
    FieldRule::SecondOfMinute,
    FieldRule::NanoOfSecond,
];

/// Reads a field map as a derivation context.
pub(crate) struct Resolver<'a> {
    fields: &'a FieldValueMap,
    mode: Resolution,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(fields: &'a FieldValueMap) -> Self {
        Self::with_mode(fields, Resolution::Quiet)
    }

    pub(crate) fn with_mode(fields: &'a FieldValueMap, mode: Resolution) -> Self {
        Self { fields, mode }
    }

    /// Derives a rule from the map, falling back to the date and time the map
    /// resolves to. `date`, `time` and `offset` are canonical values that take
    /// the place of anything the map would resolve.
    pub(crate) fn derive(
        &self,
        rule: FieldRule,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        offset: Option<FixedOffset>,
    ) -> Option<i64> {
        if let Some(value) = self.lookup(rule, Visiting::default()) {
            return Some(value);
        }
        let date = date.or_else(|| Some(self.resolve_date().ok()??.value));
        let time = time.or_else(|| Some(self.resolve_time().ok()??.value));
        rule.value_from(date, time, offset)
    }

    fn lookup(&self, rule: FieldRule, visiting: Visiting) -> Option<i64> {
        if let Some(value) = self.fields.get(rule) {
            return Some(value);
        }
        if visiting.contains(rule) {
            return None;
        }
        self.relate(rule, visiting.with(rule))
    }

    fn valid(&self, rule: FieldRule, visiting: Visiting) -> Option<i64> {
        let value = self.lookup(rule, visiting)?;
        let usable = match self.mode {
            Resolution::Lenient => value.unsigned_abs() <= LENIENT_LIMIT,
            Resolution::Quiet | Resolution::Strict => rule.is_valid_value(value),
        };
        usable.then_some(value)
    }

    fn relate(&self, rule: FieldRule, visiting: Visiting) -> Option<i64> {
        use FieldRule::*;
        let v = |source: FieldRule| self.valid(source, visiting);
        match rule {
            Year => v(ZeroEpochMonth).map(|m| m.div_euclid(12)),
            QuarterOfYear => v(MonthOfYear).map(|m| (m - 1) / 3 + 1),
            ZeroEpochMonth => Some(v(Year)? * 12 + v(MonthOfYear)? - 1),
            MonthOfYear => v(ZeroEpochMonth)
                .map(|m| m.rem_euclid(12) + 1)
                .or_else(|| Some((v(QuarterOfYear)? - 1) * 3 + v(MonthOfQuarter)?)),
            MonthOfQuarter => v(MonthOfYear).map(|m| (m - 1) % 3 + 1),
            AlignedWeekOfYear => v(DayOfYear).map(|d| (d - 1) / 7 + 1),
            AlignedWeekOfMonth => v(DayOfMonth).map(|d| (d - 1) / 7 + 1),
            AmPmOfDay => v(HourOfDay).map(|h| h / 12),
            HourOfDay => v(ClockHourOfDay)
                .map(|h| h % 24)
                .or_else(|| Some(v(AmPmOfDay)? * 12 + v(HourOfAmPm)?))
                .or_else(|| v(MinuteOfDay).map(|m| m / 60)),
            ClockHourOfDay => v(HourOfDay).map(|h| (h + 23) % 24 + 1),
            HourOfAmPm => v(HourOfDay)
                .map(|h| h % 12)
                .or_else(|| v(ClockHourOfAmPm).map(|h| h % 12)),
            ClockHourOfAmPm => v(HourOfAmPm).map(|h| (h + 11) % 12 + 1),
            MinuteOfDay => v(SecondOfDay)
                .map(|s| s / 60)
                .or_else(|| Some(v(HourOfDay)? * 60 + v(MinuteOfHour)?)),
            MinuteOfHour => v(MinuteOfDay).map(|m| m % 60),
            SecondOfDay => v(NanoOfDay)
                .map(|n| n / NANOS_PER_SECOND)
                .or_else(|| v(MilliOfDay).map(|m| m / 1_000))
                .or_else(|| Some(v(MinuteOfDay)? * 60 + v(SecondOfMinute)?)),
            SecondOfMinute => v(SecondOfDay).map(|s| s % 60),
            MilliOfDay => v(NanoOfDay)
                .map(|n| n / NANOS_PER_MILLI)
                .or_else(|| Some(v(SecondOfDay)? * 1_000 + v(MilliOfSecond)?)),
            MilliOfSecond => v(NanoOfSecond)
                .map(|n| n / NANOS_PER_MILLI)
                .or_else(|| v(MilliOfDay).map(|m| m % 1_000)),
            NanoOfDay => Some(v(SecondOfDay)? * NANOS_PER_SECOND + v(NanoOfSecond)?),
            NanoOfSecond => v(NanoOfDay)
                .map(|n| n % NANOS_PER_SECOND)
                .or_else(|| v(MilliOfSecond).map(|m| m * NANOS_PER_MILLI)),
            WeekBasedYear | WeekOfWeekBasedYear | EpochDay | DayOfYear | DayOfMonth
            | DayOfWeek | EpochSecond => None,
        }
    }

    /// A constituent of a date or time, treated as the mode says when out of range.
    fn component(&self, rule: FieldRule) -> Result<Option<i64>> {
        let Some(value) = self.lookup(rule, Visiting::default()) else {
            return Ok(None);
        };
        match self.mode {
            Resolution::Strict => rule.check_value(value).map(Some),
            Resolution::Quiet => Ok(Some(value).filter(|v| rule.is_valid_value(*v))),
            Resolution::Lenient => Ok(Some(value)),
        }
    }

    /// Resolves the map to a date.
    ///
    /// Tried in order: epoch-day; year, month and day-of-month; year and day-of-year;
    /// week-based-year, week and day-of-week. `Ok(None)` means no combination is present.
    ///
    /// # Errors
    /// `CalendricalError::OutOfRange` for a year outside the supported range, and in
    /// strict mode for a constituent outside its range or a combination that names
    /// no date (the 31st of June).
    pub(crate) fn resolve_date(&self) -> Result<Option<Resolved<NaiveDate>>> {
        use FieldRule::*;
        if let Some(epoch_day) = self.component(EpochDay)? {
            let date = date_from_epoch_day(epoch_day)?;
            return Ok(Some(Resolved::new(date, BY_EPOCH_DAY)));
        }
        if let Some(year) = self.component(Year)? {
            let month = self.component(MonthOfYear)?;
            if let (Some(month), Some(day)) = (month, self.component(DayOfMonth)?) {
                let date = self.year_month_day(year, month, day)?;
                return Ok(Some(Resolved::new(date, BY_YEAR_MONTH_DAY)));
            }
            if let Some(day_of_year) = self.component(DayOfYear)? {
                let date = self.year_day(year, day_of_year)?;
                return Ok(Some(Resolved::new(date, BY_YEAR_DAY)));
            }
        }
        if let Some(week_year) = self.component(WeekBasedYear)? {
            let week = self.component(WeekOfWeekBasedYear)?;
            if let (Some(week), Some(day)) = (week, self.component(DayOfWeek)?) {
                let date = self.week_date(week_year, week, day)?;
                return Ok(Some(Resolved::new(date, BY_WEEK_DATE)));
            }
        }
        Ok(None)
    }

    fn year_month_day(&self, year: i64, month: i64, day: i64) -> Result<NaiveDate> {
        if self.mode == Resolution::Lenient {
            let months = year
                .saturating_mul(12)
                .saturating_add(month.saturating_sub(1));
            let first = first_day(FieldRule::Year, months.div_euclid(12))?;
            let first = first
                .with_month0(months.rem_euclid(12) as u32)
                .ok_or_else(|| out_of_range(FieldRule::MonthOfYear, month, 12))?;
            return roll_days(first, day.saturating_sub(1));
        }
        let y = chrono_year(FieldRule::Year, year)?;
        NaiveDate::from_ymd_opt(y, month as u32, day as u32)
            .ok_or_else(|| out_of_range(FieldRule::DayOfMonth, day, month_length(year, month)))
    }

    fn year_day(&self, year: i64, day_of_year: i64) -> Result<NaiveDate> {
        if self.mode == Resolution::Lenient {
            return roll_days(
                first_day(FieldRule::Year, year)?,
                day_of_year.saturating_sub(1),
            );
        }
        let y = chrono_year(FieldRule::Year, year)?;
        NaiveDate::from_yo_opt(y, day_of_year as u32).ok_or_else(|| {
            let days = if is_leap_year(year) { 366 } else { 365 };
            out_of_range(FieldRule::DayOfYear, day_of_year, days)
        })
    }

    fn week_date(&self, week_year: i64, week: i64, day: i64) -> Result<NaiveDate> {
        let y = chrono_year(FieldRule::WeekBasedYear, week_year)?;
        if self.mode == Resolution::Lenient {
            let first = NaiveDate::from_isoywd_opt(y, 1, Weekday::Mon)
                .ok_or_else(|| out_of_range(FieldRule::WeekBasedYear, week_year, 1))?;
            let days = week
                .saturating_sub(1)
                .saturating_mul(7)
                .saturating_add(day.saturating_sub(1));
            return roll_days(first, days);
        }
        NaiveDate::from_isoywd_opt(y, week as u32, weekday(day)).ok_or_else(|| {
            out_of_range(
                FieldRule::WeekOfWeekBasedYear,
                week,
                weeks_in_week_based_year(week_year),
            )
        })
    }

    /// Resolves the map to a time.
    ///
    /// Nano-of-day wins when derivable; otherwise hour-of-day and minute-of-hour are
    /// required, with second and nano defaulting to zero. Only a lenient resolution
    /// can overflow into [`Resolved::days`].
    pub(crate) fn resolve_time(&self) -> Result<Option<Resolved<NaiveTime>>> {
        use FieldRule::*;
        if let Some(nano_of_day) = self.component(NanoOfDay)? {
            return Ok(time_from_nanos(nano_of_day, BY_NANO_OF_DAY));
        }
        let hour = self.component(HourOfDay)?;
        let minute = self.component(MinuteOfHour)?;
        let (Some(hour), Some(minute)) = (hour, minute) else {
            return Ok(None);
        };
        let second = self.component(SecondOfMinute)?.unwrap_or(0);
        let nano = self.component(NanoOfSecond)?.unwrap_or(0);
        let nanos = [
            (hour, NANOS_PER_HOUR),
            (minute, NANOS_PER_MINUTE),
            (second, NANOS_PER_SECOND),
            (nano, 1),
        ]
        .into_iter()
        .try_fold(0i64, |total, (value, scale)| {
            total.checked_add(value.checked_mul(scale)?)
        })
        .ok_or(CalendricalError::OutOfRange {
            rule: HourOfDay,
            value: hour,
            min: 0,
            max: 23,
        })?;
        Ok(time_from_nanos(nanos, BY_CLOCK))
    }
}

/// Moves a date by a number of days.
///
/// # Errors
/// `CalendricalError::OutOfRange` on `EpochDay` when the result is outside the
/// supported range.
pub(crate) fn roll_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    let epoch_day = i64::from(date.num_days_from_ce()) - EPOCH_DAY_OFFSET;
    date_from_epoch_day(epoch_day.saturating_add(days))
}

fn time_from_nanos(nanos: i64, from: &'static [FieldRule]) -> Option<Resolved<NaiveTime>> {
    let nano_of_day = nanos.rem_euclid(NANOS_PER_DAY);
    let time = NaiveTime::from_num_seconds_from_midnight_opt(
        (nano_of_day / NANOS_PER_SECOND) as u32,
        (nano_of_day % NANOS_PER_SECOND) as u32,
    )?;
    Some(Resolved {
        value: time,
        days: nanos.div_euclid(NANOS_PER_DAY),
        from,
    })
}

/// The 1st of January of a year.
fn first_day(rule: FieldRule, year: i64) -> Result<NaiveDate> {
    let y = chrono_year(rule, year)?;
    NaiveDate::from_yo_opt(y, 1).ok_or_else(|| out_of_range(rule, year, i64::from(y)))
}

fn out_of_range(rule: FieldRule, value: i64, max: i64) -> CalendricalError {
    CalendricalError::OutOfRange {
        rule,
        value,
        min: 1,
        max,
    }
}

fn chrono_year(rule: FieldRule, year: i64) -> Result<i32> {
    let range = ValueRange::of(
        i64::from(NaiveDate::MIN.year()),
        i64::from(NaiveDate::MAX.year()),
    );
    check_in_range(rule, year, range).map(|y| y as i32)
}

fn date_from_epoch_day(epoch_day: i64) -> Result<NaiveDate> {
    let min = i64::from(NaiveDate::MIN.num_days_from_ce()) - EPOCH_DAY_OFFSET;
    let max = i64::from(NaiveDate::MAX.num_days_from_ce()) - EPOCH_DAY_OFFSET;
    let epoch_day = check_in_range(FieldRule::EpochDay, epoch_day, ValueRange::of(min, max))?;
    NaiveDate::from_num_days_from_ce_opt((epoch_day + EPOCH_DAY_OFFSET) as i32).ok_or(
        CalendricalError::OutOfRange {
            rule: FieldRule::EpochDay,
            value: epoch_day,
            min,
            max,
        },
    )
}

/// Maps an ISO day-of-week, 1 (Monday) to 7 (Sunday), already range checked.
fn weekday(day_of_week: i64) -> Weekday {
    match day_of_week {
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}
