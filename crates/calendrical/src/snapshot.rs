//! Serialized form of a calendrical.
//!
//! Rules and zones are written by id and the offset as total seconds east of UTC.
//! Absent parts are omitted. The byte snapshot is the JSON encoding of the same form.

use chrono::{FixedOffset, NaiveDate, NaiveTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::calendrical::Calendrical;
use crate::error::{CalendricalError, Result};
use crate::fields::FieldValueMap;
use crate::zone::Zone;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Snapshot {
    #[serde(default, skip_serializing_if = "FieldValueMap::is_empty")]
    fields: FieldValueMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zone: Option<Zone>,
}

impl From<&Calendrical> for Snapshot {
    fn from(cal: &Calendrical) -> Self {
        Self {
            fields: cal.fields().clone(),
            date: cal.date(),
            time: cal.time(),
            offset_seconds: cal.offset().map(|o| o.local_minus_utc()),
            zone: cal.zone(),
        }
    }
}

impl TryFrom<Snapshot> for Calendrical {
    type Error = CalendricalError;

    fn try_from(snapshot: Snapshot) -> Result<Self> {
        let offset = snapshot
            .offset_seconds
            .map(|secs| {
                FixedOffset::east_opt(secs).ok_or_else(|| {
                    CalendricalError::InvalidArgument(format!("offset out of range: {secs}s"))
                })
            })
            .transpose()?;
        Ok(Calendrical::assemble(
            snapshot.fields,
            snapshot.date,
            snapshot.time,
            offset,
            snapshot.zone,
        ))
    }
}

impl Serialize for Calendrical {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Snapshot::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Calendrical {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let snapshot = Snapshot::deserialize(deserializer)?;
        Calendrical::try_from(snapshot).map_err(de::Error::custom)
    }
}

impl Calendrical {
    /// Encodes every part, exactly as held, including out-of-range field values.
    ///
    /// # Errors
    /// `CalendricalError::Snapshot` if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&Snapshot::from(self))?)
    }

    /// Decodes a snapshot written by [`Calendrical::to_bytes`].
    ///
    /// # Errors
    /// `CalendricalError::Snapshot` for malformed input, `InvalidArgument` for an
    /// offset chrono cannot represent.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        Calendrical::try_from(snapshot)
    }
}
