//! Tests for redundancy removal and the strict and lenient merges.

use calendrical::{Calendrical, CalendricalError, FieldRule, FieldValueMap, MergeConfig, Zone};
use chrono::{FixedOffset, NaiveDate, NaiveTime};

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn time(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
}

fn fields(pairs: &[(FieldRule, i64)]) -> Calendrical {
    Calendrical::from_field_pairs(pairs.iter().map(|(r, v)| (Some(*r), *v))).unwrap()
}

fn map(pairs: &[(FieldRule, i64)]) -> FieldValueMap {
    pairs.iter().copied().collect()
}

// ---------------------------------------------------------------------------
// remove_derivable
// ---------------------------------------------------------------------------

#[test]
fn removes_fields_implied_by_the_date() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::DayOfWeek, 1),
        (FieldRule::HourOfDay, 9),
    ])
    .with_date(date(2008, 6, 30));
    let reduced = cal.remove_derivable();
    assert_eq!(reduced.fields(), &map(&[(FieldRule::HourOfDay, 9)]));
    assert_eq!(reduced.date(), date(2008, 6, 30));
}

#[test]
fn keeps_fields_that_disagree() {
    let cal = fields(&[(FieldRule::QuarterOfYear, 1)]).with_date(date(2008, 6, 30));
    let reduced = cal.remove_derivable();
    assert_eq!(reduced.fields(), &map(&[(FieldRule::QuarterOfYear, 1)]));
}

#[test]
fn removes_fields_implied_by_other_fields() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::QuarterOfYear, 2),
    ]);
    let reduced = cal.remove_derivable();
    assert_eq!(
        reduced.fields(),
        &map(&[(FieldRule::Year, 2008), (FieldRule::MonthOfYear, 6)])
    );
}

#[test]
fn removes_time_fields_implied_by_hour() {
    let cal = fields(&[
        (FieldRule::HourOfDay, 11),
        (FieldRule::AmPmOfDay, 0),
        (FieldRule::HourOfAmPm, 11),
    ]);
    assert_eq!(
        cal.remove_derivable().fields(),
        &map(&[(FieldRule::HourOfDay, 11)])
    );
}

#[test]
fn fields_that_cannot_be_derived_survive() {
    let cal = fields(&[(FieldRule::Year, 2008), (FieldRule::MonthOfYear, 6)]);
    assert_eq!(cal.remove_derivable().fields(), cal.fields());
}

#[test]
fn remove_derivable_is_idempotent() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 30),
        (FieldRule::DayOfWeek, 1),
        (FieldRule::QuarterOfYear, 2),
        (FieldRule::HourOfDay, 14),
        (FieldRule::AmPmOfDay, 1),
    ]);
    let once = cal.remove_derivable();
    let twice = once.remove_derivable();
    assert_eq!(once.fields(), twice.fields());
    assert!(!once.fields().contains(FieldRule::DayOfWeek));
    assert!(!once.fields().contains(FieldRule::AmPmOfDay));
}

#[test]
fn remove_derivable_keeps_offset_and_zone() {
    let cal = fields(&[(FieldRule::Year, 2008)])
        .with_date(date(2008, 6, 30))
        .with_offset(FixedOffset::east_opt(3_600))
        .with_zone(Some(Zone::utc()));
    let reduced = cal.remove_derivable();
    assert!(reduced.fields().is_empty());
    assert_eq!(reduced.offset(), FixedOffset::east_opt(3_600));
    assert_eq!(reduced.zone(), Some(Zone::utc()));
}

// ---------------------------------------------------------------------------
// merge_strict
// ---------------------------------------------------------------------------

#[test]
fn strict_merge_promotes_fields_to_date() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 30),
        (FieldRule::DayOfWeek, 1),
    ]);
    let merged = cal.merge_strict().unwrap();
    assert_eq!(merged.date(), date(2008, 6, 30));
    assert!(merged.fields().is_empty());
}

#[test]
fn strict_merge_promotes_fields_to_time() {
    let cal = fields(&[
        (FieldRule::HourOfDay, 14),
        (FieldRule::MinuteOfHour, 30),
        (FieldRule::AmPmOfDay, 1),
    ]);
    let merged = cal.merge_strict().unwrap();
    assert_eq!(merged.time(), time(14, 30));
    assert!(merged.fields().is_empty());
}

#[test]
fn strict_merge_rejects_disagreement_with_resolved_date() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 30),
        (FieldRule::DayOfWeek, 2),
    ]);
    match cal.merge_strict().unwrap_err() {
        CalendricalError::Inconsistent {
            rule,
            stored,
            derived,
        } => {
            assert_eq!(rule, FieldRule::DayOfWeek);
            assert_eq!((stored, derived), (2, 1));
        }
        other => panic!("expected Inconsistent, got {other:?}"),
    }
}

#[test]
fn strict_merge_rejects_disagreement_with_date_slot() {
    let cal = fields(&[(FieldRule::QuarterOfYear, 1)]).with_date(date(2008, 6, 30));
    let err = cal.merge_strict().unwrap_err();
    assert_eq!(err.rule(), Some(FieldRule::QuarterOfYear));
}

#[test]
fn strict_merge_rejects_disagreement_between_fields() {
    let cal = fields(&[(FieldRule::HourOfDay, 13), (FieldRule::AmPmOfDay, 0)]);
    let err = cal.merge_strict().unwrap_err();
    assert_eq!(err.rule(), Some(FieldRule::AmPmOfDay));
}

#[test]
fn strict_merge_reports_impossible_dates() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 31),
    ]);
    assert!(matches!(
        cal.merge_strict(),
        Err(CalendricalError::OutOfRange {
            rule: FieldRule::DayOfMonth,
            value: 31,
            min: 1,
            max: 30,
        })
    ));
}

#[test]
fn strict_merge_reports_out_of_range_constituents() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 13),
        (FieldRule::DayOfMonth, 1),
    ]);
    let err = cal.merge_strict().unwrap_err();
    assert!(matches!(err, CalendricalError::OutOfRange { .. }));
    assert_eq!(err.rule(), Some(FieldRule::MonthOfYear));
}

#[test]
fn strict_merge_range_checks_fields_feeding_the_time() {
    let cal = fields(&[
        (FieldRule::AmPmOfDay, 1),
        (FieldRule::HourOfAmPm, 14),
        (FieldRule::MinuteOfHour, 0),
    ]);
    assert!(matches!(
        cal.merge_strict(),
        Err(CalendricalError::OutOfRange {
            rule: FieldRule::HourOfAmPm,
            value: 14,
            min: 0,
            max: 11,
        })
    ));
}

#[test]
fn strict_merge_keeps_unresolvable_fields() {
    let cal = fields(&[(FieldRule::Year, 2008), (FieldRule::MonthOfYear, 6)]);
    let merged = cal.merge_strict().unwrap();
    assert_eq!(merged.date(), None);
    assert_eq!(merged.fields(), cal.fields());
}

#[test]
fn merge_combines_date_slot_with_time_fields() {
    let cal = fields(&[(FieldRule::HourOfDay, 11), (FieldRule::MinuteOfHour, 30)])
        .with_date(date(2008, 6, 30))
        .with_offset(FixedOffset::east_opt(3_600))
        .with_zone(Some(Zone::utc()));
    let merged = cal.merge_strict().unwrap();
    assert_eq!(merged.date(), date(2008, 6, 30));
    assert_eq!(merged.time(), time(11, 30));
    assert_eq!(merged.offset(), FixedOffset::east_opt(3_600));
    assert_eq!(merged.zone(), Some(Zone::utc()));
    assert!(merged.fields().is_empty());
}

#[test]
fn merge_of_empty_is_empty() {
    let merged = Calendrical::new().merge_strict().unwrap();
    assert!(merged.is_empty());
}

// ---------------------------------------------------------------------------
// merge_lenient and merge_with
// ---------------------------------------------------------------------------

#[test]
fn lenient_merge_drops_untrusted_disagreement() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 30),
        (FieldRule::DayOfWeek, 2),
    ]);
    let merged = cal.merge_lenient().unwrap();
    assert_eq!(merged.date(), date(2008, 6, 30));
    assert!(merged.fields().is_empty());
}

#[test]
fn lenient_merge_still_rejects_trusted_fields() {
    let cal = fields(&[(FieldRule::DayOfMonth, 29)]).with_date(date(2008, 6, 30));
    let err = cal.merge_lenient().unwrap_err();
    assert_eq!(err.rule(), Some(FieldRule::DayOfMonth));

    let untrusted = fields(&[(FieldRule::DayOfWeek, 3)]).with_date(date(2008, 6, 30));
    let merged = untrusted.merge_lenient().unwrap();
    assert!(merged.fields().is_empty());
}

#[test]
fn lenient_merge_drops_disagreement_between_fields() {
    let cal = fields(&[(FieldRule::HourOfDay, 13), (FieldRule::AmPmOfDay, 0)]);
    let merged = cal.merge_lenient().unwrap();
    assert_eq!(merged.fields(), &map(&[(FieldRule::HourOfDay, 13)]));
}

#[test]
fn custom_trusted_set_is_honoured() {
    let cal = fields(&[(FieldRule::DayOfWeek, 3)]).with_date(date(2008, 6, 30));
    let config = MergeConfig::lenient().with_trusted_rule(FieldRule::DayOfWeek);
    let err = cal.merge_with(&config).unwrap_err();
    assert_eq!(err.rule(), Some(FieldRule::DayOfWeek));

    let none_trusted = MergeConfig::lenient().with_trusted(Vec::<FieldRule>::new());
    let cal = fields(&[(FieldRule::DayOfMonth, 29)]).with_date(date(2008, 6, 30));
    assert!(cal.merge_with(&none_trusted).unwrap().fields().is_empty());
}

#[test]
fn unchecked_merge_drops_derivable_fields_without_comparing() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 30),
        (FieldRule::DayOfWeek, 2),
    ]);
    let config = MergeConfig::lenient()
        .with_check_unused_fields(false)
        .with_trusted([FieldRule::DayOfWeek]);
    let merged = cal.merge_with(&config).unwrap();
    assert_eq!(merged.date(), date(2008, 6, 30));
    assert!(merged.fields().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let config = MergeConfig::strict().with_check_unused_fields(false);
    assert!(matches!(
        Calendrical::new().merge_with(&config),
        Err(CalendricalError::InvalidArgument(_))
    ));
}

#[test]
fn merge_leaves_the_input_untouched() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 30),
    ]);
    let before = cal.fields().clone();
    let _ = cal.merge_strict().unwrap();
    assert_eq!(cal.fields(), &before);
    assert_eq!(cal.date(), None);
}

#[test]
fn merged_result_equals_the_input() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 30),
        (FieldRule::HourOfDay, 11),
        (FieldRule::MinuteOfHour, 30),
    ]);
    assert_eq!(cal.merge_strict().unwrap(), cal);
}

// ---------------------------------------------------------------------------
// lenient rollover
// ---------------------------------------------------------------------------

#[test]
fn lenient_merge_rolls_days_past_the_end_of_the_month() {
    for (day, expected) in [(31, date(2008, 7, 1)), (32, date(2008, 7, 2)), (0, date(2008, 5, 31))] {
        let cal = fields(&[
            (FieldRule::Year, 2008),
            (FieldRule::MonthOfYear, 6),
            (FieldRule::DayOfMonth, day),
        ]);
        let merged = cal.merge_lenient().unwrap();
        assert_eq!(merged.date(), expected, "day {day}");
        assert!(merged.fields().is_empty());
    }
}

#[test]
fn lenient_merge_rolls_months_and_days_of_year() {
    let month_13 = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 13),
        (FieldRule::DayOfMonth, 1),
    ]);
    assert_eq!(month_13.merge_lenient().unwrap().date(), date(2009, 1, 1));

    let day_367 = fields(&[(FieldRule::Year, 2008), (FieldRule::DayOfYear, 367)]);
    assert_eq!(day_367.merge_lenient().unwrap().date(), date(2009, 1, 1));
}

#[test]
fn lenient_merge_cross_checks_against_the_rolled_date() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 32),
        (FieldRule::DayOfWeek, 3),
        (FieldRule::QuarterOfYear, 3),
        (FieldRule::MinuteOfHour, 30),
    ]);
    let merged = cal.merge_lenient().unwrap();
    assert_eq!(merged.date(), date(2008, 7, 2));
    assert_eq!(merged.fields(), &map(&[(FieldRule::MinuteOfHour, 30)]));

    let wrong_day = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 32),
        (FieldRule::DayOfWeek, 2),
    ]);
    let config = MergeConfig::lenient().with_trusted_rule(FieldRule::DayOfWeek);
    match wrong_day.merge_with(&config).unwrap_err() {
        CalendricalError::Inconsistent {
            rule,
            stored,
            derived,
        } => {
            assert_eq!(rule, FieldRule::DayOfWeek);
            assert_eq!((stored, derived), (2, 3));
        }
        other => panic!("expected Inconsistent, got {other:?}"),
    }
    assert_eq!(wrong_day.merge_lenient().unwrap().date(), date(2008, 7, 2));
}

#[test]
fn lenient_merge_carries_hour_overflow_into_the_date() {
    let pm_14 = [
        (FieldRule::AmPmOfDay, 1),
        (FieldRule::HourOfAmPm, 14),
        (FieldRule::MinuteOfHour, 0),
    ];
    let merged = fields(&pm_14).merge_lenient().unwrap();
    assert_eq!(merged.time(), time(2, 0));
    assert_eq!(merged.date(), None);
    assert!(merged.fields().is_empty());

    let mut dated = vec![
        (FieldRule::Year, 2008),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 30),
    ];
    dated.extend(pm_14);
    let merged = fields(&dated).merge_lenient().unwrap();
    assert_eq!(merged.date(), date(2008, 7, 1));
    assert_eq!(merged.time(), time(2, 0));
    assert!(merged.fields().is_empty());
}

#[test]
fn lenient_merge_fails_when_the_year_is_unsupported() {
    let cal = fields(&[
        (FieldRule::Year, 1_000_000_000),
        (FieldRule::MonthOfYear, 6),
        (FieldRule::DayOfMonth, 30),
    ]);
    let err = cal.merge_lenient().unwrap_err();
    assert_eq!(err.rule(), Some(FieldRule::Year));
}

#[test]
fn lenient_merge_drops_a_stale_untrusted_field_before_blaming_a_trusted_one() {
    let cal = fields(&[
        (FieldRule::Year, 2008),
        (FieldRule::ZeroEpochMonth, 2008 * 12),
        (FieldRule::MonthOfYear, 6),
    ]);
    let merged = cal.merge_lenient().unwrap();
    assert_eq!(
        merged.fields(),
        &map(&[(FieldRule::Year, 2008), (FieldRule::MonthOfYear, 6)])
    );
}
