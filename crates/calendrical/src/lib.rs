//! # calendrical
//!
//! Partial date and time information that can be queried, validated, merged and
//! converted.
//!
//! A [`Calendrical`] holds any combination of field values (year, hour-of-day,
//! day-of-week, ...) and canonical date, time, offset and zone values. Field values
//! are derived on demand from whatever is present, so a calendrical holding only
//! year, month and day can answer day-of-week. Merging folds the fields into a
//! date and time and reports disagreements.
//!
//! ## Modules
//!
//! - [`rule`]: the ISO field rules, their ranges and their units
//! - [`unit`]: period units the rules measure in
//! - [`fields`]: the immutable rule-to-value map
//! - [`calendrical`]: the aggregate and its derivation engine
//! - [`config`]: merge policy
//! - [`zone`]: fixed-offset and region time zones
//! - [`types`]: offset and zoned result types for conversion
//! - [`error`]: error types
//!
//! Merging, conversion and serialization are methods on [`Calendrical`].

pub mod calendrical;
pub mod config;
mod convert;
pub mod error;
pub mod fields;
mod merge;
mod resolve;
pub mod rule;
mod snapshot;
pub mod types;
pub mod unit;
pub mod zone;

pub use calendrical::{Calendrical, ValueSource};
pub use config::MergeConfig;
pub use error::CalendricalError;
pub use fields::FieldValueMap;
pub use rule::{Chronology, FieldRule, ValueRange};
pub use types::{OffsetDate, OffsetTime, ZonedDateTime};
pub use unit::PeriodUnit;
pub use zone::Zone;
