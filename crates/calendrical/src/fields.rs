//! An immutable map of field rule to value.
//!
//! Values are stored exactly as supplied, including values outside the rule's
//! legal range. Validation is deferred until a caller asks for it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::calendrical::Calendrical;
use crate::error::{CalendricalError, Result};
use crate::rule::FieldRule;

/// A set of field/value pairs with unique rules, iterated most significant first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValueMap {
    values: BTreeMap<FieldRule, i64>,
}

impl FieldValueMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from rule/value pairs applied left to right.
    ///
    /// A later pair for the same rule overrides an earlier one.
    ///
    /// # Errors
    /// Returns `CalendricalError::InvalidArgument` if any rule is `None`.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Option<FieldRule>, i64)>,
    {
        let mut values = BTreeMap::new();
        for (position, (rule, value)) in pairs.into_iter().enumerate() {
            let rule = rule.ok_or_else(|| {
                CalendricalError::InvalidArgument(format!(
                    "field rule at position {position} must not be absent"
                ))
            })?;
            values.insert(rule, value);
        }
        Ok(Self { values })
    }

    /// Returns a copy with the pair inserted, replacing any existing value for the rule.
    pub fn with(&self, rule: FieldRule, value: i64) -> Self {
        let mut values = self.values.clone();
        values.insert(rule, value);
        Self { values }
    }

    /// Returns a copy with every pair of `other` added; `other` wins on clashes.
    pub fn with_fields(&self, other: &FieldValueMap) -> Self {
        let mut values = self.values.clone();
        values.extend(other.values.iter().map(|(r, v)| (*r, *v)));
        Self { values }
    }

    /// Returns a copy without the rule.
    pub fn without(&self, rule: FieldRule) -> Self {
        if !self.values.contains_key(&rule) {
            return self.clone();
        }
        let mut values = self.values.clone();
        values.remove(&rule);
        Self { values }
    }

    /// The stored value, not validated.
    pub fn get(&self, rule: FieldRule) -> Option<i64> {
        self.values.get(&rule).copied()
    }

    /// The stored value, failing with `FieldUnsupported` when absent.
    pub fn value(&self, rule: FieldRule) -> Result<i64> {
        self.get(rule)
            .ok_or(CalendricalError::FieldUnsupported { rule })
    }

    /// The stored value checked against the rule's range.
    pub fn value_validated(&self, rule: FieldRule) -> Result<i64> {
        rule.check_value(self.value(rule)?)
    }

    pub fn contains(&self, rule: FieldRule) -> bool {
        self.values.contains_key(&rule)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates the pairs, most significant rule first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (FieldRule, i64)> + '_ {
        self.values.iter().map(|(r, v)| (*r, *v))
    }

    pub fn rules(&self) -> impl DoubleEndedIterator<Item = FieldRule> + '_ {
        self.values.keys().copied()
    }

    /// Checks every value against its rule's range, failing on the first one outside.
    pub fn validate(&self) -> Result<&Self> {
        for (rule, value) in self.iter() {
            rule.check_value(value)?;
        }
        Ok(self)
    }

    pub fn is_valid(&self) -> bool {
        self.iter().all(|(rule, value)| rule.is_valid_value(value))
    }

    /// True if no field that the date can answer disagrees with it.
    pub fn matches_date(&self, date: NaiveDate) -> bool {
        self.iter().all(|(rule, value)| {
            rule.value_from(Some(date), None, None)
                .is_none_or(|derived| derived == value)
        })
    }

    /// True if no field that the time can answer disagrees with it.
    pub fn matches_time(&self, time: NaiveTime) -> bool {
        self.iter().all(|(rule, value)| {
            rule.value_from(None, Some(time), None)
                .is_none_or(|derived| derived == value)
        })
    }

    pub fn to_calendrical(&self) -> Calendrical {
        Calendrical::from_fields(self.clone())
    }
}

impl FromIterator<(FieldRule, i64)> for FieldValueMap {
    fn from_iter<T: IntoIterator<Item = (FieldRule, i64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for FieldValueMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (rule, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{rule}={value}")?;
        }
        f.write_str("}")
    }
}
