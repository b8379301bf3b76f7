//! Panchang assembler: orchestrates the extractor and the fallback
//! calculator and merges their output into one `PanchangRecord`.
//!
//! Merge policy is scraped-nonempty wins, calculated fills every gap, and
//! table metadata attaches to whichever name won. The assembler never raises
//! to its caller: a dead authority site just means the whole record comes
//! from the calculated path. Per request the flow is
//! `TryExtract -> FillFromFallback -> Assembled`; the only retries are the
//! fetcher's own.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::extract::{self, ExtractedFields};
use crate::fallback::{self, CalculatedDay};
use crate::models::{
    AuspiciousTimes, DayTimings, DoshaInterval, ElementPeriod, EndDay, InauspiciousTimes,
    Location, Masa, MoonData, PanchangRecord, Provenance, Severity,
};
use crate::sources::{self, LocationQuery};
use crate::timeutil::{minutes_to_time, time_to_minutes, window, MINUTES_PER_DAY};
use crate::{tables, AppState};

// ---

/// Build the record for one request, consulting the process cache first.
/// Infallible toward the caller by design.
pub async fn assemble(state: &AppState, date: NaiveDate, query: &LocationQuery) -> PanchangRecord {
    // ---
    let location = sources::resolve_location(&state.http, &state.config, query).await;
    let key = cache_key(date, &location);

    if let Some(hit) = state.cache.get(&key) {
        debug!("Cache hit for {key}");
        return hit;
    }

    let (sunrise, sunset) =
        sources::fetch_sun_times(&state.http, &state.config, &location, date).await;

    let extracted =
        match extract::fetch_page(&state.http, &state.config, date, &location.name).await {
            Ok(html) => extract::extract_fields(&html),
            Err(e) => {
                warn!("Source unusable, serving fully calculated panchang: {e}");
                ExtractedFields::default()
            }
        };

    let calc = fallback::calculate(date, sunrise, sunset);
    let record = merge_record(date, &location, &extracted, &calc);

    let scraped = record
        .sources
        .values()
        .filter(|p| **p == Provenance::Scraped)
        .count();
    info!(
        "Assembled panchang for {date} at {}: {scraped}/{} fields scraped",
        location.name,
        record.sources.len()
    );

    state.cache.put(&key, record.clone());
    record
}

fn cache_key(date: NaiveDate, location: &Location) -> String {
    // Two decimals is roughly a kilometre; close enough to share a record.
    format!(
        "{date}|{:.2}|{:.2}",
        location.latitude, location.longitude
    )
}

// ---

/// Everything needed to merge one of the four transiting elements.
struct ElementSpec {
    key: &'static str,
    end_key: &'static str,
    calc_index: usize,
    calc_end: i64,
    name_for: fn(usize) -> &'static str,
    meta_for: fn(&str) -> &'static tables::ElementMeta,
    position_of: fn(&str) -> Option<usize>,
}

/// Pure merge of extractor output and calculator output. Exposed so the
/// pipeline can be exercised without any network in tests.
pub fn merge_record(
    date: NaiveDate,
    location: &Location,
    extracted: &ExtractedFields,
    calc: &CalculatedDay,
) -> PanchangRecord {
    // ---
    let mut sources: BTreeMap<String, Provenance> = BTreeMap::new();

    // Sunrise/sunset drive the rollover rule, so settle them first.
    let sunrise = merge_clock(extracted, "sunrise", calc.sunrise, &mut sources);
    let sunset = merge_clock(extracted, "sunset", calc.sunset, &mut sources);
    let moonrise = merge_clock(extracted, "moonrise", calc.moonrise, &mut sources);
    let moonset = merge_clock(extracted, "moonset", calc.moonset, &mut sources);

    let day_length = (sunset - sunrise).rem_euclid(MINUTES_PER_DAY);
    let timings = DayTimings {
        sunrise: minutes_to_time(sunrise),
        sunset: minutes_to_time(sunset),
        solar_noon: minutes_to_time((sunrise + sunset) / 2),
        moonrise: minutes_to_time(moonrise),
        moonset: minutes_to_time(moonset),
        day_length: crate::timeutil::duration_hhmm(day_length),
        night_length: crate::timeutil::duration_hhmm(MINUTES_PER_DAY - day_length),
    };

    let specs = [
        ElementSpec {
            key: "tithi",
            end_key: "tithi_end_time",
            calc_index: calc.tithi_index,
            calc_end: calc.tithi_end,
            name_for: tables::tithi_name,
            meta_for: tables::tithi_meta,
            position_of: tables::tithi_position,
        },
        ElementSpec {
            key: "nakshatra",
            end_key: "nakshatra_end_time",
            calc_index: calc.nakshatra_index,
            calc_end: calc.nakshatra_end,
            name_for: tables::nakshatra_name,
            meta_for: tables::nakshatra_meta,
            position_of: tables::nakshatra_position,
        },
        ElementSpec {
            key: "yoga",
            end_key: "yoga_end_time",
            calc_index: calc.yoga_index,
            calc_end: calc.yoga_end,
            name_for: tables::yoga_name,
            meta_for: tables::yoga_meta,
            position_of: tables::yoga_position,
        },
        ElementSpec {
            key: "karana",
            end_key: "karana_end_time",
            calc_index: calc.karana_index,
            calc_end: calc.karana_end,
            name_for: tables::karana_name,
            meta_for: tables::karana_meta,
            position_of: tables::karana_position,
        },
    ];

    let [tithi, nakshatra, yoga, karana] =
        specs.map(|spec| merge_element(spec, sunrise, extracted, &mut sources));

    // The effective tithi cycle position decides paksha when the page did
    // not state one.
    let tithi_position = tables::tithi_position(&tithi.name).unwrap_or(calc.tithi_index);

    let rashi_name = match extracted.get("rashi") {
        Some(name) => {
            sources.insert("rashi".into(), Provenance::Scraped);
            name.to_string()
        }
        None => {
            sources.insert("rashi".into(), Provenance::Calculated);
            tables::rashi_name(calc.rashi_index).to_string()
        }
    };
    let rashi_meta = tables::rashi_meta(&rashi_name);
    let moon_data = MoonData {
        rashi: rashi_name,
        rashi_lord: rashi_meta.lord.to_string(),
        element: rashi_meta.element.to_string(),
        phase: calc.phase.to_string(),
        illumination_percent: calc.illumination_percent,
    };
    sources.insert("moon_phase".into(), Provenance::Calculated);

    let auspicious_times = AuspiciousTimes {
        abhijit: merge_window(extracted, "abhijit", calc.abhijit.format(), &mut sources),
        brahma_muhurat: calc.brahma_muhurat.format(),
        amrit_kaal: calc.amrit_kaal.format(),
    };
    sources.insert("brahma_muhurat".into(), Provenance::Calculated);
    sources.insert("amrit_kaal".into(), Provenance::Calculated);

    let inauspicious_times = InauspiciousTimes {
        rahu_kaal: merge_window(extracted, "rahu_kaal", calc.rahu_kaal.format(), &mut sources),
        gulika_kaal: merge_window(
            extracted,
            "gulika_kaal",
            calc.gulika_kaal.format(),
            &mut sources,
        ),
        yama_ganda: merge_window(
            extracted,
            "yama_ganda",
            calc.yama_ganda.format(),
            &mut sources,
        ),
    };

    let masa = merge_masa(extracted, calc, tithi_position, &mut sources);

    let festivals = match extracted.get("festivals") {
        Some(list) => {
            sources.insert("festivals".into(), Provenance::Scraped);
            let set: BTreeSet<String> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            set.into_iter().collect()
        }
        None => {
            sources.insert("festivals".into(), Provenance::Calculated);
            calc.festivals.clone()
        }
    };
    sources.insert("vrats".into(), Provenance::Calculated);

    // Affliction intervals always come from the calculated windows, whose
    // construction guarantees sorted, non-overlapping coverage.
    let dosha_intervals = calc
        .dosha_spans
        .iter()
        .map(|span| DoshaInterval {
            start: minutes_to_time(span.start),
            end: minutes_to_time(span.end),
            tags: span.tags.clone(),
            severity: Severity::from_tags(&span.tags),
        })
        .collect();
    sources.insert("dosha_intervals".into(), Provenance::Calculated);

    PanchangRecord {
        date: date.to_string(),
        weekday: date.format("%A").to_string(),
        location: location.clone(),
        tithi,
        nakshatra,
        yoga,
        karana,
        timings,
        moon_data,
        auspicious_times,
        inauspicious_times,
        masa,
        festivals,
        vrats: calc.vrats.clone(),
        dosha_intervals,
        sources,
    }
}

// ---

fn merge_element(
    spec: ElementSpec,
    sunrise: i64,
    extracted: &ExtractedFields,
    sources: &mut BTreeMap<String, Provenance>,
) -> ElementPeriod {
    // ---
    let (name, name_prov) = match extracted.get(spec.key) {
        Some(name) => (name.to_string(), Provenance::Scraped),
        None => (
            (spec.name_for)(spec.calc_index).to_string(),
            Provenance::Calculated,
        ),
    };
    sources.insert(spec.key.to_string(), name_prov);

    let scraped_end = extracted
        .get(spec.end_key)
        .and_then(|t| time_to_minutes(t).ok());
    let (end_minutes, end_prov) = match scraped_end {
        Some(m) => (m as i64, Provenance::Scraped),
        None => (spec.calc_end.rem_euclid(MINUTES_PER_DAY), Provenance::Calculated),
    };
    sources.insert(spec.end_key.to_string(), end_prov);

    // Rollover convention: a transition before sunrise happens tomorrow.
    let end_day = if end_minutes < sunrise {
        EndDay::Tomorrow
    } else {
        EndDay::Today
    };

    let next_index = (spec.position_of)(&name)
        .map(|p| p + 1)
        .unwrap_or(spec.calc_index + 1);
    let meta = (spec.meta_for)(&name);

    ElementPeriod {
        name,
        end_time: minutes_to_time(end_minutes),
        end_day,
        next_name: (spec.name_for)(next_index).to_string(),
        deity: meta.deity.to_string(),
        lord: meta.lord.to_string(),
        meaning: meta.meaning.to_string(),
    }
}

/// Scraped clock time wins when it parses; otherwise the calculated value.
fn merge_clock(
    extracted: &ExtractedFields,
    key: &str,
    calc_minutes: i64,
    sources: &mut BTreeMap<String, Provenance>,
) -> i64 {
    // ---
    match extracted.get(key).and_then(|t| time_to_minutes(t).ok()) {
        Some(m) => {
            sources.insert(key.to_string(), Provenance::Scraped);
            m as i64
        }
        None => {
            sources.insert(key.to_string(), Provenance::Calculated);
            calc_minutes.rem_euclid(MINUTES_PER_DAY)
        }
    }
}

/// Scraped `"HH:MM - HH:MM"` window wins when both ends parse.
fn merge_window(
    extracted: &ExtractedFields,
    key: &str,
    calc_window: String,
    sources: &mut BTreeMap<String, Provenance>,
) -> String {
    // ---
    let scraped = extracted.get(key).and_then(|raw| {
        let (start, end) = raw.split_once('-')?;
        let start = time_to_minutes(start.trim()).ok()?;
        let end = time_to_minutes(end.trim()).ok()?;
        Some(window(start as i64, end as i64))
    });

    match scraped {
        Some(w) => {
            sources.insert(key.to_string(), Provenance::Scraped);
            w
        }
        None => {
            sources.insert(key.to_string(), Provenance::Calculated);
            calc_window
        }
    }
}

fn merge_masa(
    extracted: &ExtractedFields,
    calc: &CalculatedDay,
    tithi_position: usize,
    sources: &mut BTreeMap<String, Provenance>,
) -> Masa {
    // ---
    let scraped_masa = extracted.get("masa").and_then(|name| {
        tables::MASA
            .iter()
            .position(|m| m.eq_ignore_ascii_case(name.trim()))
    });
    let (masa_index, masa_prov) = match scraped_masa {
        Some(i) => (i, Provenance::Scraped),
        None => (calc.masa_index, Provenance::Calculated),
    };
    sources.insert("masa".into(), masa_prov);

    let paksha = match extracted.get("paksha") {
        Some(p) if p.eq_ignore_ascii_case("Shukla") => {
            sources.insert("paksha".into(), Provenance::Scraped);
            "Shukla".to_string()
        }
        Some(p) if p.eq_ignore_ascii_case("Krishna") => {
            sources.insert("paksha".into(), Provenance::Scraped);
            "Krishna".to_string()
        }
        _ => {
            sources.insert("paksha".into(), Provenance::Calculated);
            tables::paksha_for(tithi_position).to_string()
        }
    };

    Masa {
        name: tables::MASA[masa_index].to_string(),
        paksha,
        ayana: calc.ayana.to_string(),
        ritu: tables::RITU[masa_index / 2].to_string(),
    }
}
