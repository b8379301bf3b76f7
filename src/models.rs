//! Wire-format data model for the Panchang API.
//!
//! A `PanchangRecord` is assembled fresh per request and serialized straight
//! to JSON; there is no write path. Field names are camelCase on the wire.
//! Every merged field carries its provenance (`scraped` or `calculated`) in
//! the `sources` map so callers can tell authoritative data from the
//! approximation fallback.

use std::collections::BTreeMap;

use serde::Serialize;

// ---

/// Which pipeline produced a merged field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Scraped,
    Calculated,
}

/// Which calendar day an element's `end_time` falls on. The source data
/// carries only a clock time; by convention an end time strictly before
/// sunrise belongs to tomorrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndDay {
    Today,
    Tomorrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Avoid,
    Caution,
    Normal,
}

impl Severity {
    /// Severity is a pure function of the affliction tags on a window.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Severity {
        // ---
        let has = |needle: &str| tags.iter().any(|t| t.as_ref().eq_ignore_ascii_case(needle));
        if has("rahu kaal") || has("yama ganda") {
            Severity::Avoid
        } else if has("gulika kaal") || has("dur muhurat") || has("varjyam") {
            Severity::Caution
        } else {
            Severity::Normal
        }
    }
}

// ---

/// Resolved place for a request: read-only input from the geocoding side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Fixed offset from UTC, in minutes.
    pub tz_offset_minutes: i32,
}

/// One of the four transiting Panchang elements (tithi, nakshatra, yoga,
/// karana) with its transition time and table-derived attributes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPeriod {
    pub name: String,
    /// Local clock time at which the element gives way to `next_name`.
    pub end_time: String,
    pub end_day: EndDay,
    pub next_name: String,
    pub deity: String,
    pub lord: String,
    pub meaning: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTimings {
    pub sunrise: String,
    pub sunset: String,
    pub solar_noon: String,
    pub moonrise: String,
    pub moonset: String,
    /// Durations as `HH:MM`.
    pub day_length: String,
    pub night_length: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoonData {
    pub rashi: String,
    pub rashi_lord: String,
    pub element: String,
    pub phase: String,
    pub illumination_percent: u8,
}

/// Named favourable windows, each a `"HH:MM - HH:MM"` string.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuspiciousTimes {
    pub abhijit: String,
    pub brahma_muhurat: String,
    pub amrit_kaal: String,
}

/// Named unfavourable windows from the eightfold day division.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InauspiciousTimes {
    pub rahu_kaal: String,
    pub gulika_kaal: String,
    pub yama_ganda: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Masa {
    pub name: String,
    pub paksha: String,
    pub ayana: String,
    pub ritu: String,
}

/// A tagged affliction window. Intervals in a record are sorted by `start`
/// and pairwise non-overlapping by construction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoshaInterval {
    pub start: String,
    pub end: String,
    pub tags: Vec<String>,
    pub severity: Severity,
}

/// The unit of output for one (date, location) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanchangRecord {
    pub date: String,
    pub weekday: String,
    pub location: Location,
    pub tithi: ElementPeriod,
    pub nakshatra: ElementPeriod,
    pub yoga: ElementPeriod,
    pub karana: ElementPeriod,
    pub timings: DayTimings,
    pub moon_data: MoonData,
    pub auspicious_times: AuspiciousTimes,
    pub inauspicious_times: InauspiciousTimes,
    pub masa: Masa,
    pub festivals: Vec<String>,
    pub vrats: Vec<String>,
    pub dosha_intervals: Vec<DoshaInterval>,
    /// Field name -> which pipeline supplied it.
    pub sources: BTreeMap<String, Provenance>,
}
