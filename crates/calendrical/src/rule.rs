//! Field rules -- the identity and metadata of each calendrical field.
//!
//! Each ISO field is one variant of [`FieldRule`]. The metadata for every variant
//! (id, name, units, legal range) lives in a static table built at compile time,
//! so a rule is a `Copy` handle that is shared freely across threads.
//!
//! Variants are declared from most to least significant: larger unit first, then
//! larger range, with an unbounded range counting as the largest. The derived
//! ordering therefore matches the order field maps iterate and print in.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Weekday};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calendrical::Calendrical;
use crate::error::{CalendricalError, Result};
use crate::unit::PeriodUnit;

/// Day number of 1970-01-01 counted from 0001-01-01 (day 1).
pub(crate) const EPOCH_DAY_OFFSET: i64 = 719_163;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;

const MIN_YEAR: i64 = -999_999_999;
const MAX_YEAR: i64 = 999_999_999;

/// A named calendar system owning a set of field rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chronology {
    Iso,
}

impl Chronology {
    pub fn name(self) -> &'static str {
        match self {
            Chronology::Iso => "ISO",
        }
    }
}

/// The legal values of a field.
///
/// Fields whose range depends on context (such as day-of-month) carry a
/// smallest maximum and largest minimum in addition to the outer bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueRange {
    min: i64,
    largest_min: i64,
    smallest_max: i64,
    max: i64,
}

impl ValueRange {
    /// A fixed range from `min` to `max` inclusive.
    pub const fn of(min: i64, max: i64) -> Self {
        Self {
            min,
            largest_min: min,
            smallest_max: max,
            max,
        }
    }

    /// A range whose maximum varies between `smallest_max` and `max`.
    pub const fn of_variable(min: i64, smallest_max: i64, max: i64) -> Self {
        Self {
            min,
            largest_min: min,
            smallest_max,
            max,
        }
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn largest_min(&self) -> i64 {
        self.largest_min
    }

    pub fn smallest_max(&self) -> i64 {
        self.smallest_max
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// True if the minimum and maximum do not vary.
    pub fn is_fixed(&self) -> bool {
        self.min == self.largest_min && self.max == self.smallest_max
    }

    pub fn is_valid(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fixed() {
            write!(f, "{} - {}", self.min, self.max)
        } else {
            write!(f, "{} - {}/{}", self.min, self.smallest_max, self.max)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    Date,
    Time,
}

struct RuleInfo {
    id: &'static str,
    name: &'static str,
    unit: PeriodUnit,
    range_unit: Option<PeriodUnit>,
    range: ValueRange,
    kind: RuleKind,
}

const fn info(
    id: &'static str,
    name: &'static str,
    unit: PeriodUnit,
    range_unit: Option<PeriodUnit>,
    range: ValueRange,
    kind: RuleKind,
) -> RuleInfo {
    RuleInfo {
        id,
        name,
        unit,
        range_unit,
        range,
        kind,
    }
}

/// A calendrical field of the ISO chronology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldRule {
    Year,
    WeekBasedYear,
    QuarterOfYear,
    ZeroEpochMonth,
    MonthOfYear,
    MonthOfQuarter,
    AlignedWeekOfYear,
    WeekOfWeekBasedYear,
    AlignedWeekOfMonth,
    EpochDay,
    DayOfYear,
    DayOfMonth,
    DayOfWeek,
    AmPmOfDay,
    HourOfDay,
    ClockHourOfDay,
    HourOfAmPm,
    ClockHourOfAmPm,
    MinuteOfDay,
    MinuteOfHour,
    EpochSecond,
    SecondOfDay,
    SecondOfMinute,
    MilliOfDay,
    MilliOfSecond,
    NanoOfDay,
    NanoOfSecond,
}

use PeriodUnit::*;
use RuleKind::{Date, Time};

// Indexed by discriminant; order must match the enum.
#[rustfmt::skip]
static RULE_TABLE: [RuleInfo; 27] = [
    info("ISO.Year", "Year", Years, None, ValueRange::of(MIN_YEAR, MAX_YEAR), Date),
    info("ISO.WeekBasedYear", "WeekBasedYear", WeekBasedYears, None, ValueRange::of(MIN_YEAR, MAX_YEAR), Date),
    info("ISO.QuarterOfYear", "QuarterOfYear", Quarters, Some(Years), ValueRange::of(1, 4), Date),
    info("ISO.ZeroEpochMonth", "ZeroEpochMonth", Months, None, ValueRange::of(MIN_YEAR * 12, MAX_YEAR * 12 + 11), Date),
    info("ISO.MonthOfYear", "MonthOfYear", Months, Some(Years), ValueRange::of(1, 12), Date),
    info("ISO.MonthOfQuarter", "MonthOfQuarter", Months, Some(Quarters), ValueRange::of(1, 3), Date),
    info("ISO.AlignedWeekOfYear", "AlignedWeekOfYear", Weeks, Some(Years), ValueRange::of(1, 53), Date),
    info("ISO.WeekOfWeekBasedYear", "WeekOfWeekBasedYear", Weeks, Some(WeekBasedYears), ValueRange::of_variable(1, 52, 53), Date),
    info("ISO.AlignedWeekOfMonth", "AlignedWeekOfMonth", Weeks, Some(Months), ValueRange::of_variable(1, 4, 5), Date),
    info("ISO.EpochDay", "EpochDay", Days, None, ValueRange::of(i64::MIN, i64::MAX), Date),
    info("ISO.DayOfYear", "DayOfYear", Days, Some(Years), ValueRange::of_variable(1, 365, 366), Date),
    info("ISO.DayOfMonth", "DayOfMonth", Days, Some(Months), ValueRange::of_variable(1, 28, 31), Date),
    info("ISO.DayOfWeek", "DayOfWeek", Days, Some(Weeks), ValueRange::of(1, 7), Date),
    info("ISO.AmPmOfDay", "AmPmOfDay", HalfDays, Some(Days), ValueRange::of(0, 1), Time),
    info("ISO.HourOfDay", "HourOfDay", Hours, Some(Days), ValueRange::of(0, 23), Time),
    info("ISO.ClockHourOfDay", "ClockHourOfDay", Hours, Some(Days), ValueRange::of(1, 24), Time),
    info("ISO.HourOfAmPm", "HourOfAmPm", Hours, Some(HalfDays), ValueRange::of(0, 11), Time),
    info("ISO.ClockHourOfAmPm", "ClockHourOfAmPm", Hours, Some(HalfDays), ValueRange::of(1, 12), Time),
    info("ISO.MinuteOfDay", "MinuteOfDay", Minutes, Some(Days), ValueRange::of(0, 1_439), Time),
    info("ISO.MinuteOfHour", "MinuteOfHour", Minutes, Some(Hours), ValueRange::of(0, 59), Time),
    info("ISO.EpochSecond", "EpochSecond", Seconds, None, ValueRange::of(i64::MIN, i64::MAX), Time),
    info("ISO.SecondOfDay", "SecondOfDay", Seconds, Some(Days), ValueRange::of(0, 86_399), Time),
    info("ISO.SecondOfMinute", "SecondOfMinute", Seconds, Some(Minutes), ValueRange::of(0, 59), Time),
    info("ISO.MilliOfDay", "MilliOfDay", Millis, Some(Days), ValueRange::of(0, 86_399_999), Time),
    info("ISO.MilliOfSecond", "MilliOfSecond", Millis, Some(Seconds), ValueRange::of(0, 999), Time),
    info("ISO.NanoOfDay", "NanoOfDay", Nanos, Some(Days), ValueRange::of(0, 86_399_999_999_999), Time),
    info("ISO.NanoOfSecond", "NanoOfSecond", Nanos, Some(Seconds), ValueRange::of(0, 999_999_999), Time),
];

static ALL_RULES: [FieldRule; 27] = [
    FieldRule::Year,
    FieldRule::WeekBasedYear,
    FieldRule::QuarterOfYear,
    FieldRule::ZeroEpochMonth,
    FieldRule::MonthOfYear,
    FieldRule::MonthOfQuarter,
    FieldRule::AlignedWeekOfYear,
    FieldRule::WeekOfWeekBasedYear,
    FieldRule::AlignedWeekOfMonth,
    FieldRule::EpochDay,
    FieldRule::DayOfYear,
    FieldRule::DayOfMonth,
    FieldRule::DayOfWeek,
    FieldRule::AmPmOfDay,
    FieldRule::HourOfDay,
    FieldRule::ClockHourOfDay,
    FieldRule::HourOfAmPm,
    FieldRule::ClockHourOfAmPm,
    FieldRule::MinuteOfDay,
    FieldRule::MinuteOfHour,
    FieldRule::EpochSecond,
    FieldRule::SecondOfDay,
    FieldRule::SecondOfMinute,
    FieldRule::MilliOfDay,
    FieldRule::MilliOfSecond,
    FieldRule::NanoOfDay,
    FieldRule::NanoOfSecond,
];

impl FieldRule {
    fn info(self) -> &'static RuleInfo {
        &RULE_TABLE[self as usize]
    }

    /// Every ISO rule, most significant first.
    pub fn all() -> &'static [FieldRule] {
        &ALL_RULES
    }

    /// Looks up a rule by its chronology-qualified id, such as `"ISO.MonthOfYear"`.
    pub fn by_id(id: &str) -> Option<FieldRule> {
        ALL_RULES.iter().copied().find(|rule| rule.id() == id)
    }

    /// Like [`FieldRule::by_id`], failing with `InvalidArgument` for an unknown id.
    pub fn parse_id(id: &str) -> Result<FieldRule> {
        Self::by_id(id)
            .ok_or_else(|| CalendricalError::InvalidArgument(format!("unknown field rule id: {id}")))
    }

    pub fn id(self) -> &'static str {
        self.info().id
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn chronology(self) -> Chronology {
        Chronology::Iso
    }

    /// The unit this field counts.
    pub fn unit(self) -> PeriodUnit {
        self.info().unit
    }

    /// The period this field repeats within, `None` for unbounded fields such as the year.
    pub fn range_unit(self) -> Option<PeriodUnit> {
        self.info().range_unit
    }

    /// The chronology-wide legal range.
    pub fn range(self) -> ValueRange {
        self.info().range
    }

    /// The legal range narrowed by whatever the context knows.
    ///
    /// Day-of-month depends on the month and, for February, the year. Day-of-year
    /// and aligned-week-of-month depend on the year being leap, week-of-week-based-year
    /// on the week-based year. Without enough context the chronology-wide range is returned.
    pub fn range_in(self, context: &Calendrical) -> ValueRange {
        let valid = |rule: FieldRule| {
            context
                .derive_value_quiet(rule)
                .filter(|v| rule.is_valid_value(*v))
        };
        match self {
            FieldRule::DayOfMonth => match valid(FieldRule::MonthOfYear) {
                Some(2) => match valid(FieldRule::Year) {
                    Some(year) => ValueRange::of(1, month_length(year, 2)),
                    None => ValueRange::of_variable(1, 28, 29),
                },
                Some(month) => ValueRange::of(1, month_length(2000, month)),
                None => self.range(),
            },
            FieldRule::DayOfYear => match valid(FieldRule::Year) {
                Some(year) if is_leap_year(year) => ValueRange::of(1, 366),
                Some(_) => ValueRange::of(1, 365),
                None => self.range(),
            },
            FieldRule::AlignedWeekOfMonth => match valid(FieldRule::MonthOfYear) {
                Some(2) => match valid(FieldRule::Year) {
                    Some(year) if is_leap_year(year) => ValueRange::of(1, 5),
                    Some(_) => ValueRange::of(1, 4),
                    None => self.range(),
                },
                Some(_) => ValueRange::of(1, 5),
                None => self.range(),
            },
            FieldRule::WeekOfWeekBasedYear => match valid(FieldRule::WeekBasedYear) {
                Some(year) => ValueRange::of(1, weeks_in_week_based_year(year)),
                None => self.range(),
            },
            _ => self.range(),
        }
    }

    pub fn is_date_based(self) -> bool {
        self.info().kind == RuleKind::Date
    }

    pub fn is_time_based(self) -> bool {
        self.info().kind == RuleKind::Time
    }

    /// True if the value lies within the chronology-wide range.
    pub fn is_valid_value(self, value: i64) -> bool {
        self.range().is_valid(value)
    }

    /// Checks the value against the chronology-wide range.
    pub fn check_value(self, value: i64) -> Result<i64> {
        check_in_range(self, value, self.range())
    }

    /// True if the field always has the same minimum and maximum.
    pub fn is_fixed_value_set(self) -> bool {
        self.range().is_fixed()
    }

    /// Derives this field purely from the canonical date, time and offset of the context.
    ///
    /// The field map of the context is ignored. Returns `None` when the canonical
    /// slots do not hold enough information.
    pub fn derive_from(self, context: &Calendrical) -> Option<i64> {
        self.value_from(context.date(), context.time(), context.offset())
    }

    pub(crate) fn value_from(
        self,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        offset: Option<FixedOffset>,
    ) -> Option<i64> {
        if self.is_date_based() {
            return date.map(|d| self.value_from_date(d));
        }
        let time = time?;
        if self == FieldRule::EpochSecond {
            let local = date?.and_time(time);
            return offset?
                .from_local_datetime(&local)
                .single()
                .map(|dt| dt.timestamp());
        }
        Some(self.value_from_time(time))
    }

    fn value_from_date(self, date: NaiveDate) -> i64 {
        let month0 = i64::from(date.month0());
        match self {
            FieldRule::Year => i64::from(date.year()),
            FieldRule::WeekBasedYear => i64::from(date.iso_week().year()),
            FieldRule::QuarterOfYear => month0 / 3 + 1,
            FieldRule::ZeroEpochMonth => i64::from(date.year()) * 12 + month0,
            FieldRule::MonthOfYear => month0 + 1,
            FieldRule::MonthOfQuarter => month0 % 3 + 1,
            FieldRule::AlignedWeekOfYear => i64::from(date.ordinal0()) / 7 + 1,
            FieldRule::WeekOfWeekBasedYear => i64::from(date.iso_week().week()),
            FieldRule::AlignedWeekOfMonth => i64::from(date.day0()) / 7 + 1,
            FieldRule::EpochDay => i64::from(date.num_days_from_ce()) - EPOCH_DAY_OFFSET,
            FieldRule::DayOfYear => i64::from(date.ordinal()),
            FieldRule::DayOfMonth => i64::from(date.day()),
            FieldRule::DayOfWeek => i64::from(date.weekday().number_from_monday()),
            _ => unreachable!("{self} is not date based"),
        }
    }

    fn value_from_time(self, time: NaiveTime) -> i64 {
        let hour = i64::from(time.hour());
        let second_of_day = i64::from(time.num_seconds_from_midnight());
        let nano = i64::from(time.nanosecond());
        match self {
            FieldRule::AmPmOfDay => hour / 12,
            FieldRule::HourOfDay => hour,
            FieldRule::ClockHourOfDay => (hour + 23) % 24 + 1,
            FieldRule::HourOfAmPm => hour % 12,
            FieldRule::ClockHourOfAmPm => (hour + 11) % 12 + 1,
            FieldRule::MinuteOfDay => second_of_day / 60,
            FieldRule::MinuteOfHour => i64::from(time.minute()),
            FieldRule::SecondOfDay => second_of_day,
            FieldRule::SecondOfMinute => i64::from(time.second()),
            FieldRule::MilliOfDay => second_of_day * 1_000 + nano / NANOS_PER_MILLI,
            FieldRule::MilliOfSecond => nano / NANOS_PER_MILLI,
            FieldRule::NanoOfDay => second_of_day * NANOS_PER_SECOND + nano,
            FieldRule::NanoOfSecond => nano,
            _ => unreachable!("{self} is not time based"),
        }
    }

    /// Orders two calendricals by this field's value. A missing value sorts last.
    pub fn compare(self, a: &Calendrical, b: &Calendrical) -> Ordering {
        match (a.derive_value_quiet(self), b.derive_value_quiet(self)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for FieldRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

struct RuleIdVisitor;

impl<'de> Visitor<'de> for RuleIdVisitor {
    type Value = FieldRule;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a field rule id such as \"ISO.Year\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<FieldRule, E> {
        FieldRule::by_id(v).ok_or_else(|| E::custom(format!("unknown field rule id: {v}")))
    }
}

impl<'de> Deserialize<'de> for FieldRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_str(RuleIdVisitor)
    }
}

pub(crate) fn check_in_range(rule: FieldRule, value: i64, range: ValueRange) -> Result<i64> {
    if range.is_valid(value) {
        Ok(value)
    } else {
        Err(CalendricalError::OutOfRange {
            rule,
            value,
            min: range.min(),
            max: range.max(),
        })
    }
}

pub(crate) fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Length of an ISO month; `month` must be 1 to 12.
pub(crate) fn month_length(year: i64, month: i64) -> i64 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub(crate) fn weeks_in_week_based_year(year: i64) -> i64 {
    let has_53 = i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_isoywd_opt(y, 53, Weekday::Mon))
        .is_some();
    if has_53 {
        53
    } else {
        52
    }
}
