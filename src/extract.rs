//! Scraper for the external Panchang authority site.
//!
//! Two independent strategies run over the fetched markup and their results
//! merge into one flat key -> value map:
//!
//! 1. **Script-variable strategy** — the site initializes its widgets from
//!    inline `var pn_*` assignments; we parse each right-hand-side literal
//!    (string, number, boolean, JSON array). These values win on collision.
//! 2. **HTML-pattern strategy** — per field, an ordered list of regular
//!    expressions is tried against table cells, labeled spans, and plain
//!    "Label: Value" runs; the first match that survives the validity filter
//!    is kept. The markup has drifted repeatedly, so each historical shape
//!    stays in the list as one more pattern.
//!
//! Both strategies are best-effort and partial: any field may be absent and
//! that is not an error. Only transport failures (non-200, timeout, network)
//! are reported, and those make the assembler fall through to the calculated
//! path entirely.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::SourceError;

// ---

/// Canonical field keys the extractor may populate.
pub const FIELD_KEYS: &[&str] = &[
    "tithi",
    "tithi_end_time",
    "nakshatra",
    "nakshatra_end_time",
    "yoga",
    "yoga_end_time",
    "karana",
    "karana_end_time",
    "sunrise",
    "sunset",
    "moonrise",
    "moonset",
    "rashi",
    "paksha",
    "masa",
    "rahu_kaal",
    "gulika_kaal",
    "yama_ganda",
    "abhijit",
    "festivals",
];

/// Strings the site renders while data is loading or missing. A match equal
/// to one of these is treated as no match.
const PLACEHOLDERS: &[&str] = &["-", "--", "...", "N/A", "NA", "null", "undefined", "Loading..."];

/// Sparse scrape output: whatever fields either strategy recovered.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    map: BTreeMap<String, String>,
}

impl ExtractedFields {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Insert a candidate value if it passes the validity filter and the key
    /// is not already populated by a higher-priority strategy.
    fn fill(&mut self, key: &str, value: &str) {
        // ---
        let value = value.trim();
        if self.map.contains_key(key) || !is_plausible(value) {
            return;
        }
        self.map.insert(key.to_string(), value.to_string());
    }

    /// Test hook: build from explicit key/value pairs.
    pub fn from_pairs<'a, I: IntoIterator<Item = (&'a str, &'a str)>>(pairs: I) -> Self {
        let mut out = Self::default();
        for (k, v) in pairs {
            out.fill(k, v);
        }
        out
    }
}

/// Length bounds, no embedded markup, not a known placeholder.
fn is_plausible(value: &str) -> bool {
    // ---
    !value.is_empty()
        && value.len() <= 80
        && !value.contains('<')
        && !value.contains('>')
        && !PLACEHOLDERS.iter().any(|p| value.eq_ignore_ascii_case(p))
}

// ---

/// Fetch the authority page for one (date, city) query.
///
/// Bounded per-attempt timeout, `fetch_retries` retries with linear backoff.
/// After exhausting retries the caller gets `SourceError`; a timeout on the
/// last attempt is reported as `Timeout` so logs can tell the causes apart.
pub async fn fetch_page(
    client: &reqwest::Client,
    cfg: &Config,
    date: NaiveDate,
    city: &str,
) -> Result<String, SourceError> {
    // ---
    let url = format!(
        "{}?day={}&month={}&year={}&city={}",
        cfg.source_url,
        date.day(),
        date.month(),
        date.year(),
        city.replace(' ', "+"),
    );

    let attempts = cfg.fetch_retries + 1;
    let mut last_timeout = false;
    let mut last_cause = String::new();

    for attempt in 1..=attempts {
        // ---
        debug!("Fetching panchang page, attempt {attempt}/{attempts}: {url}");

        let result = client
            .get(&url)
            .timeout(Duration::from_secs(cfg.fetch_timeout_secs as u64))
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    last_timeout = e.is_timeout();
                    last_cause = format!("body read failed: {e}");
                }
            },
            Ok(resp) => {
                last_timeout = false;
                last_cause = format!("unexpected status {}", resp.status());
            }
            Err(e) => {
                last_timeout = e.is_timeout();
                last_cause = e.to_string();
            }
        }

        warn!("Panchang fetch attempt {attempt}/{attempts} failed: {last_cause}");

        if attempt < attempts {
            // Linear backoff between attempts.
            tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
        }
    }

    if last_timeout {
        Err(SourceError::Timeout { attempts })
    } else {
        Err(SourceError::Unavailable(last_cause))
    }
}

// ---

/// Run both strategies over raw markup. Never fails; missing fields are
/// simply absent from the returned map.
pub fn extract_fields(html: &str) -> ExtractedFields {
    // ---
    let mut fields = ExtractedFields::default();

    // Script variables first so they win key collisions.
    extract_script_vars(html, &mut fields);
    extract_html_patterns(html, &mut fields);

    debug!(
        "Extractor recovered {} of {} fields",
        fields.len(),
        FIELD_KEYS.len()
    );
    fields
}

/// Strategy 1: `var pn_tithi = "Ekadashi";` style page-init assignments.
fn extract_script_vars(html: &str, fields: &mut ExtractedFields) {
    // ---
    let assign = match Regex::new(r#"(?m)(?:var|let|const)\s+pn_([a-z_]+)\s*=\s*([^;\n]+);"#) {
        Ok(re) => re,
        Err(_) => return,
    };

    for cap in assign.captures_iter(html) {
        let key = &cap[1];
        if !FIELD_KEYS.contains(&key) {
            continue;
        }
        if let Some(value) = parse_js_literal(cap[2].trim()) {
            fields.fill(key, &value);
        }
    }
}

/// Parse a right-hand-side JS literal into a flat string value.
/// Arrays flatten to a comma-separated list; objects are not recognized.
fn parse_js_literal(raw: &str) -> Option<String> {
    // ---
    let raw = raw.trim();

    if (raw.starts_with('"') && raw.ends_with('"') && raw.len() >= 2)
        || (raw.starts_with('\'') && raw.ends_with('\'') && raw.len() >= 2)
    {
        return Some(raw[1..raw.len() - 1].to_string());
    }

    if raw.starts_with('[') {
        // JSON array of strings/numbers; single quotes are normalized first
        // because the site emits both styles.
        let normalized = raw.replace('\'', "\"");
        let parsed: serde_json::Value = serde_json::from_str(&normalized).ok()?;
        let items: Vec<String> = parsed
            .as_array()?
            .iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();
        if items.is_empty() {
            return None;
        }
        return Some(items.join(", "));
    }

    if raw == "true" || raw == "false" || raw.parse::<f64>().is_ok() {
        return Some(raw.to_string());
    }

    None
}

/// Strategy 2: ordered regex lists per field against the rendered markup.
///
/// Each entry is one historically observed shape of the site; first match
/// that passes the validity filter wins. Capture group 1 is the value.
fn field_patterns() -> Vec<(&'static str, Vec<&'static str>)> {
    // ---
    vec![
        ("tithi", vec![
            r"(?is)<td[^>]*>\s*Tithi\s*</td>\s*<td[^>]*>([^<]+)</td>",
            r"(?is)<(?:span|b|strong|label)[^>]*>\s*Tithi\s*:?\s*</(?:span|b|strong|label)>\s*([^<]+)<",
            r"(?i)\bTithi\s*:\s*([A-Za-z]+(?: [A-Za-z]+)*?)(?:\s+(?:upto|till|ends)\b|\s*[<,.\n]|$)",
        ]),
        ("tithi_end_time", vec![
            r"(?i)\bTithi\b[^<\n]{0,60}?(?:upto|till|ends? at)\s*(\d{1,2}:\d{2})",
        ]),
        ("nakshatra", vec![
            r"(?is)<td[^>]*>\s*Nakshatra\s*</td>\s*<td[^>]*>([^<]+)</td>",
            r"(?is)<(?:span|b|strong|label)[^>]*>\s*Nakshatra\s*:?\s*</(?:span|b|strong|label)>\s*([^<]+)<",
            r"(?i)\bNakshatra\s*:\s*([A-Za-z]+(?: [A-Za-z]+)*?)(?:\s+(?:upto|till|ends)\b|\s*[<,.\n]|$)",
        ]),
        ("nakshatra_end_time", vec![
            r"(?i)\bNakshatra\b[^<\n]{0,60}?(?:upto|till|ends? at)\s*(\d{1,2}:\d{2})",
        ]),
        ("yoga", vec![
            r"(?is)<td[^>]*>\s*Yoga\s*</td>\s*<td[^>]*>([^<]+)</td>",
            r"(?is)<(?:span|b|strong|label)[^>]*>\s*Yoga\s*:?\s*</(?:span|b|strong|label)>\s*([^<]+)<",
            r"(?i)\bYoga\s*:\s*([A-Za-z]+(?: [A-Za-z]+)*?)(?:\s+(?:upto|till|ends)\b|\s*[<,.\n]|$)",
        ]),
        ("yoga_end_time", vec![
            r"(?i)\bYoga\b[^<\n]{0,60}?(?:upto|till|ends? at)\s*(\d{1,2}:\d{2})",
        ]),
        ("karana", vec![
            r"(?is)<td[^>]*>\s*Karana\s*</td>\s*<td[^>]*>([^<]+)</td>",
            r"(?is)<(?:span|b|strong|label)[^>]*>\s*Karana\s*:?\s*</(?:span|b|strong|label)>\s*([^<]+)<",
            r"(?i)\bKarana\s*:\s*([A-Za-z]+(?: [A-Za-z]+)*?)(?:\s+(?:upto|till|ends)\b|\s*[<,.\n]|$)",
        ]),
        ("karana_end_time", vec![
            r"(?i)\bKarana\b[^<\n]{0,60}?(?:upto|till|ends? at)\s*(\d{1,2}:\d{2})",
        ]),
        ("sunrise", vec![
            r"(?is)<td[^>]*>\s*Sunrise\s*</td>\s*<td[^>]*>\s*(\d{1,2}:\d{2})",
            r"(?i)\bSunrise\s*:?\s*(\d{1,2}:\d{2})",
        ]),
        ("sunset", vec![
            r"(?is)<td[^>]*>\s*Sunset\s*</td>\s*<td[^>]*>\s*(\d{1,2}:\d{2})",
            r"(?i)\bSunset\s*:?\s*(\d{1,2}:\d{2})",
        ]),
        ("moonrise", vec![
            r"(?i)\bMoonrise\s*:?\s*(\d{1,2}:\d{2})",
        ]),
        ("moonset", vec![
            r"(?i)\bMoonset\s*:?\s*(\d{1,2}:\d{2})",
        ]),
        ("rashi", vec![
            r"(?is)<td[^>]*>\s*(?:Moon\s*Sign|Rashi)\s*</td>\s*<td[^>]*>([^<]+)</td>",
            r"(?i)\b(?:Moon\s*Sign|Chandra\s*Rashi|Rashi)\s*:\s*([A-Za-z]{3,20})",
        ]),
        ("paksha", vec![
            r"(?i)\bPaksha\s*:?\s*(Shukla|Krishna)",
        ]),
        ("masa", vec![
            r"(?i)\b(?:Masa|Month)\s*:\s*([A-Za-z]{3,20})\b",
        ]),
        ("rahu_kaal", vec![
            r"(?i)\bRahu\s*Kaal(?:am)?\s*:?\s*(\d{1,2}:\d{2}\s*-\s*\d{1,2}:\d{2})",
        ]),
        ("gulika_kaal", vec![
            r"(?i)\bGulik(?:a|ai)?\s*Kaal(?:am)?\s*:?\s*(\d{1,2}:\d{2}\s*-\s*\d{1,2}:\d{2})",
        ]),
        ("yama_ganda", vec![
            r"(?i)\bYama\s*Gand(?:a|am)\s*:?\s*(\d{1,2}:\d{2}\s*-\s*\d{1,2}:\d{2})",
        ]),
        ("abhijit", vec![
            r"(?i)\bAbhijit(?:\s*Muhurat)?\s*:?\s*(\d{1,2}:\d{2}\s*-\s*\d{1,2}:\d{2})",
        ]),
        ("festivals", vec![
            r"(?is)<td[^>]*>\s*Festivals?\s*</td>\s*<td[^>]*>([^<]+)</td>",
            r"(?i)\bFestivals?\s*:\s*([A-Za-z][A-Za-z, ]{2,70})",
        ]),
    ]
}

fn extract_html_patterns(html: &str, fields: &mut ExtractedFields) {
    // ---
    for (key, patterns) in field_patterns() {
        if fields.get(key).is_some() {
            continue;
        }
        for pattern in patterns {
            let re = match Regex::new(pattern) {
                Ok(re) => re,
                Err(_) => continue,
            };
            if let Some(cap) = re.captures(html) {
                let before = fields.len();
                fields.fill(key, &cap[1]);
                if fields.len() > before {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    const SCRIPT_PAGE: &str = r#"
        <html><head><script>
        var pn_tithi = "Ekadashi";
        var pn_nakshatra = 'Revati';
        var pn_tithi_end_time = "08:42";
        var pn_festivals = ["Nirjala Ekadashi", "Gayatri Jayanti"];
        var pn_unrelated = "skip me";
        let pn_paksha = "Shukla";
        </script></head><body></body></html>
    "#;

    const TABLE_PAGE: &str = r#"
        <table class="panchang">
          <tr><td>Tithi</td><td>Panchami</td></tr>
          <tr><td>Nakshatra</td><td>Rohini</td></tr>
          <tr><td>Sunrise</td><td>05:24</td></tr>
          <tr><td>Sunset</td><td>19:21</td></tr>
        </table>
        <p>Rahu Kaal : 17:37 - 19:21</p>
        <p>Yoga: Siddhi upto 21:10</p>
        <span>Moon Sign: Meena</span>
    "#;

    #[test]
    fn script_variable_strategy_collects_typed_literals() {
        // ---
        let fields = extract_fields(SCRIPT_PAGE);
        assert_eq!(fields.get("tithi"), Some("Ekadashi"));
        assert_eq!(fields.get("nakshatra"), Some("Revati"));
        assert_eq!(fields.get("tithi_end_time"), Some("08:42"));
        assert_eq!(
            fields.get("festivals"),
            Some("Nirjala Ekadashi, Gayatri Jayanti")
        );
        assert_eq!(fields.get("paksha"), Some("Shukla"));
        // Unrecognized variable names are ignored.
        assert_eq!(fields.get("unrelated"), None);
    }

    #[test]
    fn html_pattern_strategy_reads_tables_and_labels() {
        // ---
        let fields = extract_fields(TABLE_PAGE);
        assert_eq!(fields.get("tithi"), Some("Panchami"));
        assert_eq!(fields.get("nakshatra"), Some("Rohini"));
        assert_eq!(fields.get("sunrise"), Some("05:24"));
        assert_eq!(fields.get("sunset"), Some("19:21"));
        assert_eq!(fields.get("rahu_kaal"), Some("17:37 - 19:21"));
        assert_eq!(fields.get("yoga"), Some("Siddhi"));
        assert_eq!(fields.get("yoga_end_time"), Some("21:10"));
        assert_eq!(fields.get("rashi"), Some("Meena"));
    }

    #[test]
    fn script_variables_win_key_collisions() {
        // ---
        let page = format!("{SCRIPT_PAGE}{TABLE_PAGE}");
        let fields = extract_fields(&page);
        // Script says Ekadashi, table says Panchami; script wins.
        assert_eq!(fields.get("tithi"), Some("Ekadashi"));
        // Fields only the table carries still come through.
        assert_eq!(fields.get("sunrise"), Some("05:24"));
    }

    #[test]
    fn placeholders_and_markup_are_rejected() {
        // ---
        let page = r#"
            <tr><td>Tithi</td><td>--</td></tr>
            <tr><td>Nakshatra</td><td>Loading...</td></tr>
            <script>var pn_yoga = "null";</script>
        "#;
        let fields = extract_fields(page);
        assert_eq!(fields.get("tithi"), None);
        assert_eq!(fields.get("nakshatra"), None);
        assert_eq!(fields.get("yoga"), None);
        assert!(fields.is_empty());
    }

    #[test]
    fn empty_page_yields_empty_map_not_error() {
        assert!(extract_fields("").is_empty());
        assert!(extract_fields("<html><body>nothing here</body></html>").is_empty());
    }
}
