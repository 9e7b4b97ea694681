//! Time zones: either a fixed offset or a region with rules from `chrono-tz`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CalendricalError, Result};

/// A time zone held by a [`Calendrical`](crate::Calendrical).
///
/// Equality and hashing are by id, so `Zone::fixed(+01:00)` built twice compares equal.
#[derive(Debug, Clone, Copy)]
pub enum Zone {
    /// A zone that always uses the same offset. Zero renders as `UTC`.
    Fixed(FixedOffset),
    /// An IANA region such as `Europe/Paris`.
    Region(Tz),
}

impl Zone {
    /// The fixed UTC zone.
    pub fn utc() -> Self {
        Zone::Fixed(Utc.fix())
    }

    pub fn fixed(offset: FixedOffset) -> Self {
        Zone::Fixed(offset)
    }

    /// Parses `UTC`, `UTC+01:00` style ids or an IANA region name.
    ///
    /// # Errors
    /// Returns `CalendricalError::InvalidArgument` for an unknown id.
    pub fn parse(id: &str) -> Result<Self> {
        if id == "UTC" || id == "Z" {
            return Ok(Self::utc());
        }
        if let Some(offset) = id.strip_prefix("UTC") {
            return parse_offset(offset)
                .map(Zone::Fixed)
                .ok_or_else(|| CalendricalError::InvalidArgument(format!("invalid zone id: {id}")));
        }
        Tz::from_str(id)
            .map(Zone::Region)
            .map_err(|_| CalendricalError::InvalidArgument(format!("invalid zone id: {id}")))
    }

    /// The zone id, as accepted by [`Zone::parse`].
    pub fn id(&self) -> String {
        match self {
            Zone::Fixed(offset) if offset.local_minus_utc() == 0 => "UTC".to_string(),
            Zone::Fixed(offset) => format!("UTC{offset}"),
            Zone::Region(tz) => tz.name().to_string(),
        }
    }

    /// Offsets the zone permits for a local date-time.
    ///
    /// Empty inside a gap, two entries inside an overlap.
    pub fn valid_offsets(&self, local: NaiveDateTime) -> Vec<FixedOffset> {
        match self {
            Zone::Fixed(offset) => vec![*offset],
            Zone::Region(tz) => match tz.offset_from_local_datetime(&local) {
                LocalResult::Single(o) => vec![o.fix()],
                LocalResult::Ambiguous(earlier, later) => vec![earlier.fix(), later.fix()],
                LocalResult::None => Vec::new(),
            },
        }
    }

    pub fn is_valid_offset(&self, local: NaiveDateTime, offset: FixedOffset) -> bool {
        self.valid_offsets(local).contains(&offset)
    }
}

/// Parses `+hh:mm`, `-hh:mm` or `+hh:mm:ss`, at most 18 hours either way.
pub(crate) fn parse_offset(text: &str) -> Option<FixedOffset> {
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let mut parts = rest.split(':');
    let hours: u8 = parts.next()?.parse().ok()?;
    let minutes: u8 = parts.next().map_or(Some(0), |m| m.parse().ok())?;
    let seconds: u8 = parts.next().map_or(Some(0), |s| s.parse().ok())?;
    if parts.next().is_some() || hours > 18 || minutes > 59 || seconds > 59 {
        return None;
    }
    let total = i32::from(hours) * 3_600 + i32::from(minutes) * 60 + i32::from(seconds);
    FixedOffset::east_opt(sign * total)
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Zone {}

impl Hash for Zone {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

impl From<FixedOffset> for Zone {
    fn from(offset: FixedOffset) -> Self {
        Zone::Fixed(offset)
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Zone::Region(tz)
    }
}

impl Serialize for Zone {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id())
    }
}

struct ZoneIdVisitor;

impl<'de> Visitor<'de> for ZoneIdVisitor {
    type Value = Zone;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a zone id such as \"UTC\", \"UTC+01:00\" or \"Europe/Paris\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Zone, E> {
        Zone::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Zone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_str(ZoneIdVisitor)
    }
}
