//! End-to-end pipeline tests, exercised without any network: the
//! source-unavailable path is simulated by handing the assembler an empty
//! extraction map, exactly what it uses after the fetcher gives up.

use chrono::NaiveDate;
use serde_json::Value;

use panchang_api::assemble::merge_record;
use panchang_api::extract::ExtractedFields;
use panchang_api::fallback;
use panchang_api::models::{PanchangRecord, Provenance};
use panchang_api::sources;
use panchang_api::tables;
use panchang_api::timeutil::time_to_minutes;

// ---

const TITHI_NAMES: &[&str] = &[
    "Pratipada", "Dwitiya", "Tritiya", "Chaturthi", "Panchami", "Shashthi",
    "Saptami", "Ashtami", "Navami", "Dashami", "Ekadashi", "Dwadashi",
    "Trayodashi", "Chaturdashi", "Purnima", "Amavasya",
];

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Assemble with the authority site unreachable: empty extraction, so the
/// calculated path supplies everything.
fn assemble_offline(day: &str, sunrise: u32, sunset: u32) -> PanchangRecord {
    // ---
    let day = date(day);
    let location = sources::lookup_city("New Delhi").unwrap();
    let calc = fallback::calculate(day, sunrise, sunset);
    merge_record(day, &location, &ExtractedFields::default(), &calc)
}

fn parse_window(s: &str) -> (u32, u32) {
    let (start, end) = s.split_once(" - ").expect("window separator");
    (
        time_to_minutes(start).expect("window start"),
        time_to_minutes(end).expect("window end"),
    )
}

/// Recursively assert the serialized record has no nulls and no empty
/// strings anywhere.
fn assert_fully_populated(value: &Value, path: &str) {
    // ---
    match value {
        Value::Null => panic!("null at {path}"),
        Value::String(s) => assert!(!s.is_empty(), "empty string at {path}"),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                assert_fully_populated(item, &format!("{path}[{i}]"));
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                assert_fully_populated(v, &format!("{path}.{k}"));
            }
        }
        _ => {}
    }
}

// ---

#[test]
fn source_unavailable_still_yields_a_complete_record() {
    // ---
    // New Delhi midsummer: sunrise 05:24, sunset 19:21.
    let record = assemble_offline("2025-06-22", 324, 1161);

    assert_eq!(record.date, "2025-06-22");
    assert_eq!(record.weekday, "Sunday");
    assert_eq!(record.location.name, "New Delhi");

    let json = serde_json::to_value(&record).unwrap();
    assert_fully_populated(&json, "record");

    // The tithi name must come from the fixed enumeration.
    assert!(
        TITHI_NAMES.contains(&record.tithi.name.as_str()),
        "unexpected tithi {:?}",
        record.tithi.name
    );

    // Rahu Kaal is a well-formed window inside the sunrise-sunset span.
    let (start, end) = parse_window(&record.inauspicious_times.rahu_kaal);
    assert!(start < end);
    assert!(start >= 324 && end <= 1161);

    // Everything was filled from the calculator.
    assert!(record
        .sources
        .values()
        .all(|p| *p == Provenance::Calculated));
}

#[test]
fn merge_prefers_scraped_and_fills_the_rest() {
    // ---
    // 2025-01-26 is day-of-year 26, which the fallback maps to Revati.
    let day = date("2025-01-26");
    let location = sources::lookup_city("New Delhi").unwrap();
    let calc = fallback::calculate(day, 430, 1070);
    assert_eq!(tables::nakshatra_name(calc.nakshatra_index), "Revati");

    let extracted = ExtractedFields::from_pairs([("tithi", "Ekadashi")]);
    let record = merge_record(day, &location, &extracted, &calc);

    // Scraped wins...
    assert_eq!(record.tithi.name, "Ekadashi");
    assert_eq!(record.sources["tithi"], Provenance::Scraped);
    // ...and the gap is filled from the calculator.
    assert_eq!(record.nakshatra.name, "Revati");
    assert_eq!(record.sources["nakshatra"], Provenance::Calculated);
}

#[test]
fn assembled_output_is_deterministic() {
    // ---
    let a = serde_json::to_string(&assemble_offline("2025-06-22", 324, 1161)).unwrap();
    let b = serde_json::to_string(&assemble_offline("2025-06-22", 324, 1161)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn abhijit_stays_inside_the_day_across_seasons() {
    // ---
    for (day, sunrise, sunset) in [
        ("2025-01-10", 430u32, 1048u32), // short winter day
        ("2025-06-22", 324, 1161),       // long summer day
        ("2025-09-23", 366, 1092),       // equinox
    ] {
        let record = assemble_offline(day, sunrise, sunset);
        let (start, end) = parse_window(&record.auspicious_times.abhijit);
        assert!(start > sunrise, "{day}: abhijit starts before sunrise");
        assert!(end < sunset, "{day}: abhijit ends after sunset");

        let noon = (sunrise + sunset) / 2;
        let center = (start + end) / 2;
        assert!(
            (center as i64 - noon as i64).abs() <= 1,
            "{day}: abhijit off-center"
        );
    }
}

#[test]
fn dosha_intervals_are_sorted_and_disjoint() {
    // ---
    for day in ["2025-06-22", "2025-06-23", "2025-06-24", "2025-06-25"] {
        let record = assemble_offline(day, 324, 1161);
        assert!(!record.dosha_intervals.is_empty());

        let parsed: Vec<(u32, u32)> = record
            .dosha_intervals
            .iter()
            .map(|i| {
                (
                    time_to_minutes(&i.start).unwrap(),
                    time_to_minutes(&i.end).unwrap(),
                )
            })
            .collect();

        for pair in parsed.windows(2) {
            assert!(pair[0].0 <= pair[1].0, "{day}: not sorted");
            assert!(pair[0].1 <= pair[1].0, "{day}: overlapping");
        }
    }
}

#[test]
fn scraped_page_fields_flow_through_to_the_record() {
    // ---
    // A page shaped like the authority site, run through the real extractor
    // and then the real merge.
    let page = r#"
        <script>var pn_tithi = "Ekadashi"; var pn_tithi_end_time = "04:10";</script>
        <table>
          <tr><td>Nakshatra</td><td>Rohini</td></tr>
          <tr><td>Sunrise</td><td>05:24</td></tr>
          <tr><td>Sunset</td><td>19:21</td></tr>
        </table>
        <p>Rahu Kaal : 17:37 - 19:21</p>
    "#;
    let extracted = panchang_api::extract::extract_fields(page);

    let day = date("2025-06-22");
    let location = sources::lookup_city("New Delhi").unwrap();
    let calc = fallback::calculate(day, 324, 1161);
    let record = merge_record(day, &location, &extracted, &calc);

    assert_eq!(record.tithi.name, "Ekadashi");
    assert_eq!(record.tithi.deity, "Vishwadeva");
    // 04:10 is before sunrise, so the transition is tomorrow.
    assert_eq!(record.tithi.end_time, "04:10");
    assert_eq!(serde_json::to_value(record.tithi.end_day).unwrap(), "tomorrow");

    assert_eq!(record.nakshatra.name, "Rohini");
    assert_eq!(record.nakshatra.lord, "Moon");
    assert_eq!(record.timings.sunrise, "05:24");
    assert_eq!(record.inauspicious_times.rahu_kaal, "17:37 - 19:21");
    assert_eq!(record.sources["sunrise"], Provenance::Scraped);
    assert_eq!(record.sources["yoga"], Provenance::Calculated);
}
