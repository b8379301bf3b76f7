//! Approximation fallback: a complete, self-consistent Panchang day from
//! nothing but the date and local sunrise/sunset.
//!
//! Cycle positions come from day-of-year arithmetic modulo the table
//! lengths and element end times are sunrise plus a date-seeded offset, so
//! the output is stable for a given date but explicitly not authoritative.
//! The one authentically standard algorithm here is the eightfold
//! sunrise-to-sunset division for Rahu Kaal, Gulika Kaal and Yama Ganda.
//!
//! This module must never fail: every branch has a default and the output
//! is always well-formed.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::tables;

// ---

/// A half-open local-time window in minutes since midnight. `start` may be
/// negative and `end` may exceed 1439; formatting wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: i64,
    pub end: i64,
}

impl Window {
    pub fn format(&self) -> String {
        crate::timeutil::window(self.start, self.end)
    }
}

/// A tagged affliction window before severity derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoshaSpan {
    pub start: i64,
    pub end: i64,
    pub tags: Vec<String>,
}

/// Everything the calculator derives for one day. All times are local
/// minutes since midnight; element end times are unwrapped (they may pass
/// 1440 when a transition falls after midnight).
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedDay {
    pub sunrise: i64,
    pub sunset: i64,
    pub solar_noon: i64,
    pub moonrise: i64,
    pub moonset: i64,

    pub tithi_index: usize,
    pub tithi_end: i64,
    pub nakshatra_index: usize,
    pub nakshatra_end: i64,
    pub yoga_index: usize,
    pub yoga_end: i64,
    pub karana_index: usize,
    pub karana_end: i64,
    pub rashi_index: usize,

    pub rahu_kaal: Window,
    pub gulika_kaal: Window,
    pub yama_ganda: Window,
    pub abhijit: Window,
    pub brahma_muhurat: Window,
    pub amrit_kaal: Window,

    pub dosha_spans: Vec<DoshaSpan>,
    pub festivals: Vec<String>,
    pub vrats: Vec<String>,

    pub phase: &'static str,
    pub illumination_percent: u8,
    pub masa_index: usize,
    pub ayana: &'static str,
}

// ---

/// Per-month festival candidate lists (Gregorian month, 1-12).
const FESTIVALS_BY_MONTH: [&[&str]; 12] = [
    &["Makar Sankranti", "Pongal"],
    &["Vasant Panchami", "Maha Shivaratri"],
    &["Holi", "Gudi Padwa"],
    &["Ram Navami", "Hanuman Jayanti"],
    &["Akshaya Tritiya", "Buddha Purnima"],
    &["Ganga Dussehra", "Nirjala Ekadashi"],
    &["Guru Purnima", "Rath Yatra"],
    &["Raksha Bandhan", "Janmashtami"],
    &["Ganesh Chaturthi", "Onam"],
    &["Navratri", "Dussehra"],
    &["Diwali", "Chhath Puja"],
    &["Gita Jayanti", "Dattatreya Jayanti"],
];

/// Weekday-indexed vrat names, Sunday first.
const VRAT_BY_WEEKDAY: [&str; 7] = [
    "Ravivar Vrat",
    "Somvar Vrat",
    "Mangalvar Vrat",
    "Budhvar Vrat",
    "Guruvar Vrat",
    "Shukravar Vrat",
    "Shanivar Vrat",
];

/// Rahu Kaal / Gulika Kaal / Yama Ganda segment (0-indexed into the eight
/// equal sunrise-sunset divisions), indexed by weekday with Sunday first.
/// These are the traditional assignments.
const RAHU_SEGMENT: [i64; 7] = [7, 1, 6, 4, 5, 3, 2];
const GULIKA_SEGMENT: [i64; 7] = [6, 5, 4, 3, 2, 1, 0];
const YAMA_SEGMENT: [i64; 7] = [4, 3, 2, 1, 0, 6, 5];

const MOON_PHASES_WAXING: [&str; 4] = [
    "Waxing Crescent",
    "First Quarter",
    "Waxing Gibbous",
    "Full Moon",
];
const MOON_PHASES_WANING: [&str; 4] = [
    "Waning Gibbous",
    "Last Quarter",
    "Waning Crescent",
    "New Moon",
];

// ---

/// Stable date-seeded mixer for pseudo-random-looking but deterministic
/// offsets (splitmix64 finalizer).
fn mix(seed: u64, salt: u64) -> u64 {
    // ---
    let mut x = seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn date_seed(date: NaiveDate) -> u64 {
    (date.year() as u64)
        .wrapping_mul(10_000)
        .wrapping_add(date.month() as u64 * 100)
        .wrapping_add(date.day() as u64)
}

/// Element end time: sunrise plus a seeded offset in [4h, 21h), so some
/// transitions land after midnight and exercise the day-rollover rule.
fn seeded_end(seed: u64, salt: u64, sunrise: i64) -> i64 {
    sunrise + 240 + (mix(seed, salt) % 1020) as i64
}

// ---

/// Derive a full approximate day. Total and deterministic: identical inputs
/// always produce identical output.
pub fn calculate(date: NaiveDate, sunrise_min: u32, sunset_min: u32) -> CalculatedDay {
    // ---
    let seed = date_seed(date);
    let sunrise = sunrise_min as i64;
    // Guard inverted or degenerate inputs so the eightfold division and
    // window math stay well-formed.
    let sunset = (sunset_min as i64).max(sunrise + 8);

    let doy = date.ordinal() as usize; // 1-based day of year
    let dom = date.day() as usize;
    let weekday = date.weekday().num_days_from_sunday() as usize;

    // Cycle positions: day-count arithmetic modulo the table lengths, not
    // true lunar-synodic computation.
    let tithi_index = (doy + dom) % 30;
    let nakshatra_index = doy % 27;
    let yoga_index = (doy + date.month() as usize) % 27;
    // A karana spans half a tithi, so its counter runs twice as fast.
    let karana_index = (2 * (doy + dom)) % 11;
    // The Moon spends roughly 2.25 days per rashi.
    let rashi_index = ((doy as f64) / 2.25) as usize % 12;

    let solar_noon = (sunrise + sunset) / 2;
    let day_len = sunset - sunrise;
    let segment = day_len / 8;

    let eightfold = |idx: i64| Window {
        start: sunrise + idx * segment,
        end: sunrise + (idx + 1) * segment,
    };

    let rahu_kaal = eightfold(RAHU_SEGMENT[weekday]);
    let gulika_kaal = eightfold(GULIKA_SEGMENT[weekday]);
    let yama_ganda = eightfold(YAMA_SEGMENT[weekday]);

    // Abhijit is the midday muhurta: one fifteenth of the day centered on
    // solar noon, so it always sits strictly inside sunrise-sunset.
    let abhijit = Window {
        start: solar_noon - day_len / 30,
        end: solar_noon + day_len / 30,
    };
    let brahma_muhurat = Window {
        start: sunrise - 96,
        end: sunrise - 48,
    };
    let amrit_start = sunrise + (mix(seed, 11) % (day_len.max(49) as u64 - 48)) as i64;
    let amrit_kaal = Window {
        start: amrit_start,
        end: amrit_start + 48,
    };

    // One seeded Dur Muhurat window joins the three eightfold doshas.
    let dur_start = sunrise + (mix(seed, 13) % (day_len.max(49) as u64 - 48)) as i64;
    let dur_muhurat = Window {
        start: dur_start,
        end: dur_start + 48,
    };

    let dosha_spans = merge_dosha_spans(vec![
        (rahu_kaal, "rahu kaal"),
        (gulika_kaal, "gulika kaal"),
        (yama_ganda, "yama ganda"),
        (dur_muhurat, "dur muhurat"),
    ]);

    // The Moon rises ~48 minutes later each tithi.
    let moonrise = (sunrise + 48 * tithi_index as i64).rem_euclid(1440);
    let moonset = (moonrise + 720).rem_euclid(1440);

    let (phase, illumination_percent) = moon_phase(tithi_index);

    let masa_index = (date.month() as usize + 9) % 12;
    // Uttarayana runs roughly mid-January to mid-July.
    let ayana = if (14..196).contains(&(date.ordinal() as i32)) {
        "Uttarayana"
    } else {
        "Dakshinayana"
    };

    let festivals = pick_festivals(date, seed);
    let vrats = pick_vrats(date.weekday(), tithi_index);

    CalculatedDay {
        sunrise,
        sunset,
        solar_noon,
        moonrise,
        moonset,
        tithi_index,
        tithi_end: seeded_end(seed, 1, sunrise),
        nakshatra_index,
        nakshatra_end: seeded_end(seed, 2, sunrise),
        yoga_index,
        yoga_end: seeded_end(seed, 3, sunrise),
        karana_index,
        karana_end: seeded_end(seed, 4, sunrise),
        rashi_index,
        rahu_kaal,
        gulika_kaal,
        yama_ganda,
        abhijit,
        brahma_muhurat,
        amrit_kaal,
        dosha_spans,
        festivals,
        vrats,
        phase,
        illumination_percent,
        masa_index,
        ayana,
    }
}

// ---

/// Moon phase name and illumination percentage from the tithi position.
/// Positions 0-14 wax from new toward full, 15-29 wane back.
fn moon_phase(tithi_index: usize) -> (&'static str, u8) {
    // ---
    let i = tithi_index % 30;
    if i < 15 {
        let illum = ((i + 1) as f64 / 15.0 * 100.0).round() as u8;
        let phase = if i == 14 {
            "Full Moon"
        } else {
            MOON_PHASES_WAXING[i / 5]
        };
        (phase, illum.min(100))
    } else {
        let illum = ((29 - i) as f64 / 15.0 * 100.0).round() as u8;
        let phase = if i == 29 {
            "New Moon"
        } else {
            MOON_PHASES_WANING[(i - 15) / 5]
        };
        (phase, illum.min(100))
    }
}

/// Sort raw windows by start and coalesce overlaps, unioning tags, so the
/// resulting sequence is non-overlapping by construction.
fn merge_dosha_spans(raw: Vec<(Window, &str)>) -> Vec<DoshaSpan> {
    // ---
    let mut spans: Vec<DoshaSpan> = raw
        .into_iter()
        .map(|(w, tag)| DoshaSpan {
            start: w.start,
            end: w.end,
            tags: vec![tag.to_string()],
        })
        .collect();
    spans.sort_by_key(|s| (s.start, s.end));

    let mut merged: Vec<DoshaSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start < last.end => {
                last.end = last.end.max(span.end);
                for tag in span.tags {
                    if !last.tags.contains(&tag) {
                        last.tags.push(tag);
                    }
                }
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Seeded pick from the month's candidate list. Not the real religious
/// calendar; the tithi-driven observances below are the honest part.
fn pick_festivals(date: NaiveDate, seed: u64) -> Vec<String> {
    // ---
    let candidates = FESTIVALS_BY_MONTH[(date.month() - 1) as usize];
    let mut out = BTreeSet::new();
    for (i, name) in candidates.iter().enumerate() {
        if mix(seed, 100 + i as u64) % 2 == 0 {
            out.insert(name.to_string());
        }
    }
    // Never an empty list: keep at least the month's first candidate.
    if out.is_empty() {
        out.insert(candidates[0].to_string());
    }
    out.into_iter().collect()
}

/// Weekday vrat plus the tithi-bound observances.
fn pick_vrats(weekday: Weekday, tithi_index: usize) -> Vec<String> {
    // ---
    let mut out = BTreeSet::new();
    out.insert(VRAT_BY_WEEKDAY[weekday.num_days_from_sunday() as usize].to_string());

    match tithi_index % 15 {
        3 => {
            out.insert("Sankashti Chaturthi".to_string());
        }
        10 => {
            out.insert("Ekadashi Vrat".to_string());
        }
        12 => {
            out.insert("Pradosh Vrat".to_string());
        }
        _ => {}
    }
    if tithi_index % 30 == 14 {
        out.insert("Purnima Vrat".to_string());
    }
    if tithi_index % 30 == 29 {
        out.insert("Amavasya Vrat".to_string());
    }

    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        // ---
        let a = calculate(day(2025, 6, 22), 324, 1161);
        let b = calculate(day(2025, 6, 22), 324, 1161);
        assert_eq!(a, b);
    }

    #[test]
    fn different_dates_move_the_cycles() {
        // ---
        let a = calculate(day(2025, 6, 22), 324, 1161);
        let b = calculate(day(2025, 6, 23), 324, 1161);
        assert_ne!(a.tithi_index, b.tithi_index);
        assert_ne!(a.nakshatra_index, b.nakshatra_index);
    }

    #[test]
    fn abhijit_is_centered_inside_the_day() {
        // ---
        // Short winter day, long summer day, and a near-equinox day.
        for (sunrise, sunset) in [(430u32, 1030u32), (324, 1161), (360, 1080)] {
            let c = calculate(day(2025, 3, 15), sunrise, sunset);
            assert!(c.abhijit.start > c.sunrise);
            assert!(c.abhijit.end < c.sunset);
            let center = (c.abhijit.start + c.abhijit.end) / 2;
            assert!((center - c.solar_noon).abs() <= 1);
        }
    }

    #[test]
    fn eightfold_windows_sit_inside_the_day() {
        // ---
        for d in 1..=28 {
            let c = calculate(day(2025, 2, d), 400, 1100);
            for w in [c.rahu_kaal, c.gulika_kaal, c.yama_ganda] {
                assert!(w.start >= c.sunrise && w.end <= c.sunset);
                assert_eq!(w.end - w.start, (c.sunset - c.sunrise) / 8);
            }
        }
    }

    #[test]
    fn rahu_kaal_follows_the_weekday_table() {
        // ---
        // 2025-06-22 is a Sunday: Rahu Kaal is the eighth segment.
        let c = calculate(day(2025, 6, 22), 320, 1120);
        let segment = (c.sunset - c.sunrise) / 8;
        assert_eq!(c.rahu_kaal.start, c.sunrise + 7 * segment);
        // 2025-06-23 is a Monday: second segment.
        let c = calculate(day(2025, 6, 23), 320, 1120);
        assert_eq!(c.rahu_kaal.start, c.sunrise + segment);
    }

    #[test]
    fn brahma_muhurat_precedes_sunrise() {
        // ---
        let c = calculate(day(2025, 6, 22), 324, 1161);
        assert_eq!(c.brahma_muhurat.start, c.sunrise - 96);
        assert_eq!(c.brahma_muhurat.end, c.sunrise - 48);
        // Early sunrise pushes the window across midnight; formatting wraps.
        let c = calculate(day(2025, 6, 22), 30, 800);
        assert!(c.brahma_muhurat.start < 0);
        assert_eq!(c.brahma_muhurat.format().len(), "HH:MM - HH:MM".len());
    }

    #[test]
    fn dosha_spans_are_sorted_and_disjoint() {
        // ---
        for d in 1..=28 {
            let c = calculate(day(2024, 7, d), 340, 1120);
            assert!(!c.dosha_spans.is_empty());
            for pair in c.dosha_spans.windows(2) {
                assert!(pair[0].start <= pair[1].start);
                assert!(pair[0].end <= pair[1].start, "overlap on day {d}");
            }
            for span in &c.dosha_spans {
                assert!(!span.tags.is_empty());
            }
        }
    }

    #[test]
    fn merged_spans_union_tags() {
        // ---
        let merged = merge_dosha_spans(vec![
            (Window { start: 100, end: 200 }, "rahu kaal"),
            (Window { start: 150, end: 260 }, "dur muhurat"),
            (Window { start: 400, end: 450 }, "yama ganda"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].start, 100);
        assert_eq!(merged[0].end, 260);
        assert_eq!(merged[0].tags, vec!["rahu kaal", "dur muhurat"]);
        assert_eq!(merged[1].tags, vec!["yama ganda"]);
    }

    #[test]
    fn moon_phase_tracks_the_tithi_cycle() {
        // ---
        assert_eq!(moon_phase(14), ("Full Moon", 100));
        assert_eq!(moon_phase(29).0, "New Moon");
        assert_eq!(moon_phase(29).1, 0);
        let (phase, illum) = moon_phase(2);
        assert_eq!(phase, "Waxing Crescent");
        assert_eq!(illum, 20);
    }

    #[test]
    fn vrats_and_festivals_are_never_empty() {
        // ---
        for m in 1..=12 {
            let c = calculate(day(2025, m, 10), 360, 1100);
            assert!(!c.festivals.is_empty());
            assert!(!c.vrats.is_empty());
        }
    }
}
