//! Merge policy.
//!
//! A merge folds a calendrical's fields into its canonical date and time. The
//! policy decides what happens to a field that disagrees with the value derived
//! for it: fail the merge, or drop the field and carry on.

use std::collections::BTreeSet;

use crate::error::{CalendricalError, Result};
use crate::rule::FieldRule;

/// Fields a lenient merge still refuses to silently discard.
const LENIENT_TRUSTED: [FieldRule; 5] = [
    FieldRule::Year,
    FieldRule::MonthOfYear,
    FieldRule::DayOfMonth,
    FieldRule::HourOfDay,
    FieldRule::MinuteOfHour,
];

/// How a merge treats disagreeing fields.
///
/// ```
/// use calendrical::{FieldRule, MergeConfig};
///
/// let config = MergeConfig::lenient().with_trusted_rule(FieldRule::DayOfWeek);
/// assert!(config.rejects(FieldRule::DayOfWeek));
/// assert!(!config.rejects(FieldRule::AmPmOfDay));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    strict: bool,
    check_unused_fields: bool,
    trusted: BTreeSet<FieldRule>,
}

impl MergeConfig {
    /// Every disagreement fails.
    pub fn strict() -> Self {
        Self {
            strict: true,
            check_unused_fields: true,
            trusted: BTreeSet::new(),
        }
    }

    /// Disagreements fail only for the year, month, day, hour and minute fields.
    /// Any other disagreeing field is dropped.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            check_unused_fields: true,
            trusted: LENIENT_TRUSTED.into_iter().collect(),
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// When false, derivable fields are dropped without comparing values.
    pub fn with_check_unused_fields(mut self, check: bool) -> Self {
        self.check_unused_fields = check;
        self
    }

    /// Replaces the trusted set.
    pub fn with_trusted<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = FieldRule>,
    {
        self.trusted = rules.into_iter().collect();
        self
    }

    pub fn with_trusted_rule(mut self, rule: FieldRule) -> Self {
        self.trusted.insert(rule);
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn check_unused_fields(&self) -> bool {
        self.check_unused_fields
    }

    pub fn trusted(&self) -> &BTreeSet<FieldRule> {
        &self.trusted
    }

    /// True if a disagreement on this rule fails the merge.
    pub fn rejects(&self, rule: FieldRule) -> bool {
        self.strict || self.trusted.contains(&rule)
    }

    /// # Errors
    /// Returns `CalendricalError::InvalidArgument` for a strict policy that skips
    /// comparisons, since it could never reject anything.
    pub fn validate(&self) -> Result<()> {
        if self.strict && !self.check_unused_fields {
            return Err(CalendricalError::InvalidArgument(
                "a strict merge must check unused fields".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self::strict()
    }
}
