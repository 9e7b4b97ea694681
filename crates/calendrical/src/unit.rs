//! Period units counted by field rules.

use std::fmt;

/// A unit of time that a field counts, or the period within which it repeats.
///
/// Variants are declared from shortest to longest, so the derived ordering
/// compares units by duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodUnit {
    Nanos,
    Millis,
    Seconds,
    Minutes,
    Hours,
    HalfDays,
    Days,
    Weeks,
    Months,
    Quarters,
    WeekBasedYears,
    Years,
}

impl PeriodUnit {
    /// Display name of the unit.
    pub fn name(self) -> &'static str {
        match self {
            PeriodUnit::Nanos => "Nanos",
            PeriodUnit::Millis => "Millis",
            PeriodUnit::Seconds => "Seconds",
            PeriodUnit::Minutes => "Minutes",
            PeriodUnit::Hours => "Hours",
            PeriodUnit::HalfDays => "HalfDays",
            PeriodUnit::Days => "Days",
            PeriodUnit::Weeks => "Weeks",
            PeriodUnit::Months => "Months",
            PeriodUnit::Quarters => "Quarters",
            PeriodUnit::WeekBasedYears => "WeekBasedYears",
            PeriodUnit::Years => "Years",
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
