//! Error types for calendrical operations.

use thiserror::Error;

use crate::rule::FieldRule;

/// Errors raised while reading, validating, merging or converting calendrical data.
///
/// Every error is raised at the point of detection. Nothing is retried internally;
/// callers wanting a non-failing read use [`Calendrical::derive_value_quiet`].
///
/// [`Calendrical::derive_value_quiet`]: crate::Calendrical::derive_value_quiet
#[derive(Error, Debug)]
pub enum CalendricalError {
    /// A required argument, usually a rule, was absent or unknown.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A value was validated against its rule and fell outside the legal range.
    #[error("Value {value} for {rule} is outside the range {min} to {max}")]
    OutOfRange {
        rule: FieldRule,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The field is neither stored nor derivable from any slot.
    #[error("Field {rule} is not supported by this calendrical")]
    FieldUnsupported { rule: FieldRule },

    /// A stored value disagrees with the value derived from another source.
    #[error("Field {rule} has value {stored} which is inconsistent with the derived value {derived}")]
    Inconsistent {
        rule: FieldRule,
        stored: i64,
        derived: i64,
    },

    /// Not enough, or contradictory, information to build the requested type.
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    /// A binary snapshot could not be encoded or decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl CalendricalError {
    /// The rule the error refers to, when there is one.
    pub fn rule(&self) -> Option<FieldRule> {
        match self {
            CalendricalError::OutOfRange { rule, .. }
            | CalendricalError::FieldUnsupported { rule }
            | CalendricalError::Inconsistent { rule, .. } => Some(*rule),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalendricalError>;
