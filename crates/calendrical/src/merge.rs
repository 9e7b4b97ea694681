//! Redundancy removal and merging.
//!
//! Both walk the field map least significant rule first, so that when two fields
//! reproduce each other the finer one is the one removed. A merge comparing fields
//! against each other visits the ones its policy may drop before the trusted ones.

use tracing::debug;

use crate::calendrical::Calendrical;
use crate::config::MergeConfig;
use crate::error::{CalendricalError, Result};
use crate::fields::FieldValueMap;
use crate::resolve::{roll_days, Resolution, Resolver};
use crate::rule::FieldRule;

/// Removes every field whose value the canonical slots of `canonical`, or failing
/// those the remaining fields, reproduce exactly. Repeats until nothing changes.
pub(crate) fn strip_derivable(mut fields: FieldValueMap, canonical: &Calendrical) -> FieldValueMap {
    loop {
        let mut changed = false;
        let rules: Vec<FieldRule> = fields.rules().rev().collect();
        for rule in rules {
            let Some(stored) = fields.get(rule) else {
                continue;
            };
            let others = fields.without(rule);
            if derive_elsewhere(rule, &others, canonical) == Some(stored) {
                fields = others;
                changed = true;
            }
        }
        if !changed {
            return fields;
        }
    }
}

fn derive_elsewhere(rule: FieldRule, others: &FieldValueMap, canonical: &Calendrical) -> Option<i64> {
    rule.derive_from(canonical).or_else(|| {
        Resolver::new(others).derive(
            rule,
            canonical.date(),
            canonical.time(),
            canonical.offset(),
        )
    })
}

/// Decides the fate of one field given the value derived for it elsewhere.
/// `Ok(true)` keeps the field.
fn reconcile(rule: FieldRule, stored: i64, derived: Option<i64>, config: &MergeConfig) -> Result<bool> {
    let Some(derived) = derived else {
        return Ok(true);
    };
    if derived == stored || !config.check_unused_fields() {
        return Ok(false);
    }
    if config.rejects(rule) {
        return Err(CalendricalError::Inconsistent {
            rule,
            stored,
            derived,
        });
    }
    debug!(%rule, stored, derived, "dropping field that disagrees with merged value");
    Ok(false)
}

impl Calendrical {
    /// Returns a copy without the fields that the date, time, offset or other
    /// fields already imply.
    ///
    /// Fields that disagree with the value derivable for them are kept.
    pub fn remove_derivable(&self) -> Calendrical {
        let canonical = Calendrical::from_parts(self.date(), self.time(), self.offset(), None);
        let fields = strip_derivable(self.fields().clone(), &canonical);
        self.with_fields(fields)
    }

    /// Merges the fields into the date and time under a policy.
    ///
    /// The date and time are resolved from the fields where the slots are empty.
    /// A strict policy range checks every field first. A lenient one rolls
    /// out-of-range constituents over (the 32nd of June is the 2nd of July) and
    /// carries a time past midnight into the date. The fields a date or time was
    /// built from are consumed. Fields the result or the other fields account for
    /// are then removed; fields that disagree either fail the merge or are dropped,
    /// as the policy says. Fields nothing can derive are kept.
    ///
    /// # Errors
    /// - `CalendricalError::InvalidArgument` for an invalid policy.
    /// - `CalendricalError::OutOfRange` for a field outside its range under a strict
    ///   policy, or fields that resolve to no date or time.
    /// - `CalendricalError::Inconsistent` for a disagreement the policy rejects.
    pub fn merge_with(&self, config: &MergeConfig) -> Result<Calendrical> {
        config.validate()?;
        let mode = if config.is_strict() {
            self.fields().validate()?;
            Resolution::Strict
        } else {
            Resolution::Lenient
        };

        // Against the canonical slots the caller supplied.
        let mut fields = FieldValueMap::new();
        for (rule, stored) in self.fields().iter().rev() {
            if reconcile(rule, stored, rule.derive_from(self), config)? {
                fields = fields.with(rule, stored);
            }
        }

        let resolver = Resolver::with_mode(&fields, mode);
        let mut consumed: Vec<FieldRule> = Vec::new();
        let mut overflow = 0;
        let mut time = self.time();
        if time.is_none() {
            if let Some(resolved) = resolver.resolve_time()? {
                consumed.extend(resolved.from);
                overflow = resolved.days;
                time = Some(resolved.value);
            }
        }
        let mut date = self.date();
        if date.is_none() {
            if let Some(resolved) = resolver.resolve_date()? {
                consumed.extend(resolved.from);
                date = Some(resolved.value);
            }
        }
        if overflow != 0 {
            match date {
                Some(day) => date = Some(roll_days(day, overflow)?),
                None => debug!(days = overflow, "no date to carry the time overflow into"),
            }
        }
        let merged = Calendrical::from_parts(date, time, self.offset(), None);

        // Against the date and time the fields resolved to.
        let mut residual = FieldValueMap::new();
        for (rule, stored) in fields.iter().rev() {
            if consumed.contains(&rule) {
                continue;
            }
            if reconcile(rule, stored, rule.derive_from(&merged), config)? {
                residual = residual.with(rule, stored);
            }
        }

        // Against each other, fields the policy may drop first.
        let (trusted, untrusted): (Vec<FieldRule>, Vec<FieldRule>) =
            residual.rules().rev().partition(|rule| config.rejects(*rule));
        for rule in untrusted.into_iter().chain(trusted) {
            let Some(stored) = residual.get(rule) else {
                continue;
            };
            let others = residual.without(rule);
            let derived = Resolver::new(&others).derive(rule, date, time, self.offset());
            if !reconcile(rule, stored, derived, config)? {
                residual = others;
            }
        }

        debug!(
            input = self.fields().len(),
            kept = residual.len(),
            ?date,
            ?time,
            "merged calendrical"
        );
        Ok(Calendrical::assemble(
            residual,
            date,
            time,
            self.offset(),
            self.zone(),
        ))
    }

    /// Merges with every disagreement failing.
    pub fn merge_strict(&self) -> Result<Calendrical> {
        self.merge_with(&MergeConfig::strict())
    }

    /// Merges dropping disagreeing fields other than year, month, day, hour and minute,
    /// rolling out-of-range constituents over instead of failing.
    pub fn merge_lenient(&self) -> Result<Calendrical> {
        self.merge_with(&MergeConfig::lenient())
    }
}
