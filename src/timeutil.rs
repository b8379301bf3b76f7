//! Clock-string arithmetic used by every downstream calculation.
//!
//! All Panchang times are plain 24-hour `HH:MM` strings in local time, so
//! window math happens on minutes-since-midnight. `minutes_to_time` is total
//! and wraps modulo 1440 on purpose: "96 minutes before sunrise" must stay a
//! valid clock time even when it crosses midnight.

use crate::error::FormatError;

// ---

pub const MINUTES_PER_DAY: i64 = 1440;

/// Parse `H:MM` / `HH:MM` into minutes since midnight, in `[0, 1439]`.
pub fn time_to_minutes(hhmm: &str) -> Result<u32, FormatError> {
    // ---
    let err = || FormatError {
        input: hhmm.to_string(),
    };

    let (h, m) = hhmm.split_once(':').ok_or_else(err)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(err());
    }
    if !h.bytes().all(|b| b.is_ascii_digit()) || !m.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }

    let hours: u32 = h.parse().map_err(|_| err())?;
    let minutes: u32 = m.parse().map_err(|_| err())?;
    if hours > 23 || minutes > 59 {
        return Err(err());
    }

    Ok(hours * 60 + minutes)
}

/// Format minutes-since-midnight as zero-padded `HH:MM`, wrapping modulo a day.
pub fn minutes_to_time(minutes: i64) -> String {
    // ---
    let m = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// Format a `[start, end]` pair as the `"HH:MM - HH:MM"` window string the
/// API exposes.
pub fn window(start: i64, end: i64) -> String {
    format!("{} - {}", minutes_to_time(start), minutes_to_time(end))
}

/// Format a duration in minutes as `HH:MM` hours-and-minutes.
pub fn duration_hhmm(minutes: i64) -> String {
    let m = minutes.max(0);
    format!("{:02}:{:02}", m / 60, m % 60)
}
