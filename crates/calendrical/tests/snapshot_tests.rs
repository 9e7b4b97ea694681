//! Tests for the serialized and binary snapshot forms.

use calendrical::{Calendrical, CalendricalError, FieldRule, FieldValueMap, Zone};
use chrono::{FixedOffset, NaiveDate, NaiveTime};
use serde_json::json;

fn shapes() -> Vec<Calendrical> {
    let date = NaiveDate::from_ymd_opt(2008, 6, 30);
    let time = NaiveTime::from_hms_nano_opt(11, 30, 59, 500);
    let offset = FixedOffset::east_opt(3_600);
    let paris = Some(Zone::parse("Europe/Paris").unwrap());
    let map: FieldValueMap = [(FieldRule::Year, 2008), (FieldRule::MonthOfYear, -1)]
        .into_iter()
        .collect();
    vec![
        Calendrical::new(),
        Calendrical::from_field(Some(FieldRule::Year), 2008).unwrap(),
        Calendrical::from_fields(map.clone()),
        Calendrical::from_parts(date, None, None, None),
        Calendrical::from_parts(None, time, None, None),
        Calendrical::from_parts(date, time, offset, None),
        Calendrical::from_parts(date, time, offset, paris),
        Calendrical::from_parts(None, None, FixedOffset::west_opt(5_400), Some(Zone::utc())),
        Calendrical::from_fields_with(Some(map), offset, paris).with_date(date),
    ]
}

#[test]
fn byte_snapshot_round_trips_every_shape() {
    for cal in shapes() {
        let bytes = cal.to_bytes().unwrap();
        let back = Calendrical::from_bytes(&bytes).unwrap();
        assert_eq!(back, cal, "{cal}");
        assert_eq!(back.fields(), cal.fields());
        assert_eq!(back.date(), cal.date());
        assert_eq!(back.time(), cal.time());
        assert_eq!(back.offset(), cal.offset());
        assert_eq!(back.zone(), cal.zone());
    }
}

#[test]
fn serde_round_trips_every_shape() {
    for cal in shapes() {
        let text = serde_json::to_string(&cal).unwrap();
        let back: Calendrical = serde_json::from_str(&text).unwrap();
        assert_eq!(back.fields(), cal.fields());
        assert_eq!(back.date(), cal.date());
        assert_eq!(back.offset(), cal.offset());
        assert_eq!(back.zone(), cal.zone());
    }
}

#[test]
fn serialized_form_uses_ids_and_seconds() {
    let cal = Calendrical::from_field(Some(FieldRule::Year), 2008)
        .unwrap()
        .with_date(NaiveDate::from_ymd_opt(2008, 6, 30))
        .with_offset(FixedOffset::east_opt(3_600))
        .with_zone(Some(Zone::parse("Europe/Paris").unwrap()));
    assert_eq!(
        serde_json::to_value(&cal).unwrap(),
        json!({
            "fields": { "ISO.Year": 2008 },
            "date": "2008-06-30",
            "offset_seconds": 3600,
            "zone": "Europe/Paris",
        })
    );
    assert_eq!(serde_json::to_value(Calendrical::new()).unwrap(), json!({}));
}

#[test]
fn malformed_bytes_are_a_snapshot_error() {
    assert!(matches!(
        Calendrical::from_bytes(b"not json"),
        Err(CalendricalError::Snapshot(_))
    ));
    assert!(matches!(
        Calendrical::from_bytes(br#"{"fields":{"ISO.Fortnight":1}}"#),
        Err(CalendricalError::Snapshot(_))
    ));
    assert!(matches!(
        Calendrical::from_bytes(br#"{"zone":"Mars/Olympus"}"#),
        Err(CalendricalError::Snapshot(_))
    ));
}

#[test]
fn unrepresentable_offset_is_rejected() {
    assert!(matches!(
        Calendrical::from_bytes(br#"{"offset_seconds":999999}"#),
        Err(CalendricalError::InvalidArgument(_))
    ));
}

#[test]
fn oversized_zone_offset_is_a_snapshot_error() {
    for id in ["UTC+999999", "UTC-99999999999", "UTC+19:00", "UTC+-5"] {
        let bytes = format!(r#"{{"zone":"{id}"}}"#);
        assert!(
            matches!(
                Calendrical::from_bytes(bytes.as_bytes()),
                Err(CalendricalError::Snapshot(_))
            ),
            "{id}"
        );
    }
    let edge = Calendrical::from_bytes(br#"{"zone":"UTC+18:00"}"#).unwrap();
    assert_eq!(edge.zone(), Some(Zone::fixed(FixedOffset::east_opt(18 * 3_600).unwrap())));
}
