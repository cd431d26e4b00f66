//! Time coordinate handling.
//!
//! Time coordinates carry CF units of the form `<unit> since <reference>`,
//! e.g. `seconds since 1970-01-01 00:00:00`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};

use crate::Cube;

/// Parsed CF time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnits {
    /// Length of one unit in seconds
    pub seconds_per_unit: i64,
    /// Epoch the offsets are counted from
    pub reference: DateTime<Utc>,
}

impl TimeUnits {
    /// Parse a CF units string. Returns `None` for non-time units.
    pub fn parse(units: &str) -> Option<Self> {
        let (unit, reference) = units.split_once(" since ")?;
        let seconds_per_unit = match unit.trim().to_lowercase().as_str() {
            "seconds" | "second" | "s" => 1,
            "minutes" | "minute" | "min" => 60,
            "hours" | "hour" | "h" => 3600,
            "days" | "day" | "d" => 86400,
            _ => return None,
        };
        let reference = parse_reference(reference.trim())?;
        Some(Self {
            seconds_per_unit,
            reference,
        })
    }

    /// Convert an offset in these units to an absolute time.
    ///
    /// Returns `None` when the offset is not finite or the result falls
    /// outside the representable date range.
    pub fn to_datetime(&self, value: f64) -> Option<DateTime<Utc>> {
        let millis = (value * self.seconds_per_unit as f64 * 1000.0).round();
        // i64 bounds as f64; `as` would saturate out-of-range offsets silently
        if !millis.is_finite() || millis < i64::MIN as f64 || millis >= i64::MAX as f64 {
            return None;
        }
        let delta = TimeDelta::try_milliseconds(millis as i64)?;
        self.reference.checked_add_signed(delta)
    }
}

fn parse_reference(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim_end_matches(" UTC").trim_end_matches('Z');
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

impl Cube {
    /// Validity time from a single valued `time` coordinate.
    pub fn validity_time(&self) -> Option<DateTime<Utc>> {
        let coord = self.coord("time")?;
        TimeUnits::parse(&coord.units)?.to_datetime(coord.single_point()?)
    }
}
