//! The `Calendrical` aggregate and its field derivation engine.
//!
//! A calendrical holds up to five independent pieces of information: a field map
//! plus optional canonical date, time, offset and zone slots. Any of them may be
//! absent and they are not required to agree with each other until a merge or a
//! consistency check asks for it.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{FixedOffset, NaiveDate, NaiveTime};
use tracing::trace;

use crate::error::{CalendricalError, Result};
use crate::fields::FieldValueMap;
use crate::resolve::Resolver;
use crate::rule::{check_in_range, FieldRule};
use crate::zone::Zone;

/// Where a derived field value came from.
///
/// Sources are consulted in declaration order and the first one that answers wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSource {
    /// Read from the canonical date slot.
    Date,
    /// Read from the canonical time slot (and, for epoch-second, the date and offset).
    Time,
    /// Stored verbatim in the field map.
    Stored,
    /// Computed from other fields in the map.
    Derived,
}

/// Date and time information in any combination of fields and canonical values.
///
/// Immutable: every `with_*` method returns a new value.
///
/// ```
/// use calendrical::{Calendrical, FieldRule};
///
/// let cal = Calendrical::from_field_pairs([
///     (Some(FieldRule::Year), 2008),
///     (Some(FieldRule::MonthOfYear), 6),
///     (Some(FieldRule::DayOfMonth), 30),
/// ])
/// .unwrap();
/// assert_eq!(cal.derive_value(FieldRule::DayOfWeek).unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Calendrical {
    fields: FieldValueMap,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    offset: Option<FixedOffset>,
    zone: Option<Zone>,
}

impl Calendrical {
    /// A calendrical with no information at all.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn assemble(
        fields: FieldValueMap,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        offset: Option<FixedOffset>,
        zone: Option<Zone>,
    ) -> Self {
        Self {
            fields,
            date,
            time,
            offset,
            zone,
        }
    }

    /// A calendrical holding a single field.
    ///
    /// # Errors
    /// Returns `CalendricalError::InvalidArgument` if the rule is `None`.
    pub fn from_field(rule: Option<FieldRule>, value: i64) -> Result<Self> {
        Self::from_field_pairs([(rule, value)])
    }

    /// A calendrical holding the given fields, later pairs overriding earlier ones.
    ///
    /// # Errors
    /// Returns `CalendricalError::InvalidArgument` if any rule is `None`.
    pub fn from_field_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Option<FieldRule>, i64)>,
    {
        Ok(Self::from_fields(FieldValueMap::from_pairs(pairs)?))
    }

    pub fn from_fields(fields: FieldValueMap) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// A calendrical from canonical values only. The field map is empty.
    pub fn from_parts(
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        offset: Option<FixedOffset>,
        zone: Option<Zone>,
    ) -> Self {
        Self::assemble(FieldValueMap::new(), date, time, offset, zone)
    }

    /// A calendrical from a field map plus offset and zone. A `None` map is treated as empty.
    pub fn from_fields_with(
        fields: Option<FieldValueMap>,
        offset: Option<FixedOffset>,
        zone: Option<Zone>,
    ) -> Self {
        Self::assemble(fields.unwrap_or_default(), None, None, offset, zone)
    }

    pub fn with_fields(&self, fields: FieldValueMap) -> Self {
        Self {
            fields,
            ..self.clone()
        }
    }

    pub fn with_date(&self, date: Option<NaiveDate>) -> Self {
        Self {
            date,
            ..self.clone()
        }
    }

    pub fn with_time(&self, time: Option<NaiveTime>) -> Self {
        Self {
            time,
            ..self.clone()
        }
    }

    pub fn with_offset(&self, offset: Option<FixedOffset>) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }

    pub fn with_zone(&self, zone: Option<Zone>) -> Self {
        Self {
            zone,
            ..self.clone()
        }
    }

    /// The field map. Never absent; an empty map stands for "no fields".
    pub fn fields(&self) -> &FieldValueMap {
        &self.fields
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    pub fn zone(&self) -> Option<Zone> {
        self.zone
    }

    /// True if every part is absent.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.date.is_none()
            && self.time.is_none()
            && self.offset.is_none()
            && self.zone.is_none()
    }

    fn locate(&self, rule: FieldRule) -> Option<(ValueSource, i64)> {
        let canonical = if rule.is_date_based() {
            self.date
                .and(rule.derive_from(self))
                .map(|value| (ValueSource::Date, value))
        } else {
            self.time
                .and(rule.derive_from(self))
                .map(|value| (ValueSource::Time, value))
        };
        canonical
            .or_else(|| self.fields.get(rule).map(|value| (ValueSource::Stored, value)))
            .or_else(|| {
                Resolver::new(&self.fields)
                    .derive(rule, self.date, self.time, self.offset)
                    .map(|value| (ValueSource::Derived, value))
            })
    }

    /// Which source would answer a request for the rule, if any.
    pub fn source_of(&self, rule: FieldRule) -> Option<ValueSource> {
        self.locate(rule).map(|(source, _)| source)
    }

    pub fn is_derivable(&self, rule: FieldRule) -> bool {
        self.locate(rule).is_some()
    }

    /// Derives the value of a field from whatever this calendrical holds.
    ///
    /// The canonical date (for date-based rules) or time (for time-based rules)
    /// wins over a stored field, which wins over a value computed from other
    /// fields. The result is not range checked.
    ///
    /// # Errors
    /// Returns `CalendricalError::FieldUnsupported` when no source can answer.
    pub fn derive_value(&self, rule: FieldRule) -> Result<i64> {
        match self.locate(rule) {
            Some((source, value)) => {
                trace!(%rule, ?source, value, "derived field value");
                Ok(value)
            }
            None => Err(CalendricalError::FieldUnsupported { rule }),
        }
    }

    /// Like [`Calendrical::derive_value`] but `None` when no source can answer.
    pub fn derive_value_quiet(&self, rule: FieldRule) -> Option<i64> {
        self.locate(rule).map(|(_, value)| value)
    }

    /// Derives the value and checks it against the range the rule has in this context.
    pub fn derive_value_validated(&self, rule: FieldRule) -> Result<i64> {
        let value = self.derive_value(rule)?;
        check_in_range(rule, value, rule.range_in(self))
    }

    /// Checks every stored field against the canonical date, time and offset.
    ///
    /// Fields the canonical values cannot answer are not checked, nor are fields
    /// checked against each other.
    ///
    /// # Errors
    /// Returns `CalendricalError::Inconsistent` for the most significant disagreeing field.
    pub fn check_consistent(&self) -> Result<()> {
        for (rule, stored) in self.fields.iter() {
            if let Some(derived) = rule.derive_from(self) {
                if derived != stored {
                    return Err(CalendricalError::Inconsistent {
                        rule,
                        stored,
                        derived,
                    });
                }
            }
        }
        Ok(())
    }

    /// The value every rule derives to, in rule order.
    fn derived_values(&self) -> Vec<Option<i64>> {
        FieldRule::all()
            .iter()
            .map(|rule| self.derive_value_quiet(*rule))
            .collect()
    }

    /// Stored fields that the date or time slot overrides with a different value.
    ///
    /// These never show through [`Calendrical::derive_value`] but still tell two
    /// calendricals apart.
    fn overridden_fields(&self) -> FieldValueMap {
        self.fields
            .iter()
            .filter(|(rule, stored)| {
                rule.derive_from(self)
                    .is_some_and(|derived| derived != *stored)
            })
            .collect()
    }
}

/// Two calendricals are equal when every rule derives to the same value (or to
/// nothing) on both sides, the fields the slots override match, and the offset
/// and zone match.
impl PartialEq for Calendrical {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && self.zone == other.zone
            && self.derived_values() == other.derived_values()
            && self.overridden_fields() == other.overridden_fields()
    }
}

impl Eq for Calendrical {}

impl Hash for Calendrical {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.derived_values().hash(state);
        self.overridden_fields().hash(state);
        self.offset.hash(state);
        self.zone.hash(state);
    }
}

/// Prints the parts that are present, space separated: fields, date, time, offset, zone.
/// A calendrical with nothing prints `{}`.
impl fmt::Display for Calendrical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.fields.is_empty() {
            parts.push(self.fields.to_string());
        }
        if let Some(date) = self.date {
            parts.push(date.to_string());
        }
        if let Some(time) = self.time {
            parts.push(time.to_string());
        }
        if let Some(offset) = self.offset {
            parts.push(offset.to_string());
        }
        if let Some(zone) = self.zone {
            parts.push(zone.to_string());
        }
        if parts.is_empty() {
            f.write_str("{}")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}
