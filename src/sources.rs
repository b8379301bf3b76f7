//! Outbound collaborators: location resolution and sunrise/sunset lookup.
//!
//! Both are treated as black boxes and both degrade gracefully — a failed
//! geocode yields a coordinate-labelled location and a failed sun-time
//! lookup yields flat local defaults, so the pipeline above stays total.

use chrono::{DateTime, NaiveDate, Timelike};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::Location;

// ---

/// How the request named its place.
#[derive(Debug, Clone)]
pub enum LocationQuery {
    City(String),
    Coords { lat: f64, lon: f64 },
}

/// Sunrise/sunset defaults (local minutes) when the collaborator is down.
const DEFAULT_SUNRISE: u32 = 360; // 06:00
const DEFAULT_SUNSET: u32 = 1110; // 18:30

/// Built-in gazetteer: (name, country, lat, lon, tz offset minutes).
/// Covers the cities the frontend offers; anything else goes through the
/// reverse-geocoding service.
const GAZETTEER: &[(&str, &str, f64, f64, i32)] = &[
    ("New Delhi", "India", 28.6139, 77.2090, 330),
    ("Mumbai", "India", 19.0760, 72.8777, 330),
    ("Kolkata", "India", 22.5726, 88.3639, 330),
    ("Chennai", "India", 13.0827, 80.2707, 330),
    ("Bengaluru", "India", 12.9716, 77.5946, 330),
    ("Hyderabad", "India", 17.3850, 78.4867, 330),
    ("Pune", "India", 18.5204, 73.8567, 330),
    ("Ahmedabad", "India", 23.0225, 72.5714, 330),
    ("Jaipur", "India", 26.9124, 75.7873, 330),
    ("Varanasi", "India", 25.3176, 82.9739, 330),
    ("Ujjain", "India", 23.1793, 75.7849, 330),
    ("London", "United Kingdom", 51.5074, -0.1278, 0),
    ("New York", "United States", 40.7128, -74.0060, -300),
];

// ---

pub fn lookup_city(name: &str) -> Option<Location> {
    // ---
    let name = name.trim();
    GAZETTEER
        .iter()
        .find(|(city, ..)| city.eq_ignore_ascii_case(name))
        .map(|&(city, country, lat, lon, tz)| Location {
            name: city.to_string(),
            country: country.to_string(),
            latitude: lat,
            longitude: lon,
            tz_offset_minutes: tz,
        })
}

/// Resolve a request's location. Total: every branch lands on a usable
/// `Location`, falling back to the configured default city and finally to a
/// coordinate-labelled place.
pub async fn resolve_location(
    http: &reqwest::Client,
    cfg: &Config,
    query: &LocationQuery,
) -> Location {
    // ---
    match query {
        LocationQuery::City(name) => lookup_city(name).unwrap_or_else(|| {
            debug!("City {name:?} not in gazetteer, using default city");
            lookup_city(&cfg.default_city).unwrap_or_else(|| fallback_location(28.6139, 77.2090))
        }),
        LocationQuery::Coords { lat, lon } => reverse_geocode(http, cfg, *lat, *lon).await,
    }
}

/// Ask the reverse-geocoding collaborator for (lat, lon) -> place. Any
/// failure degrades to a coordinate-labelled location.
async fn reverse_geocode(http: &reqwest::Client, cfg: &Config, lat: f64, lon: f64) -> Location {
    // ---
    let url = format!(
        "{}?latitude={lat}&longitude={lon}&localityLanguage=en",
        cfg.geocode_api_url
    );

    let body: Option<serde_json::Value> = match http.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => resp.json().await.ok(),
        Ok(resp) => {
            warn!("Reverse geocode returned status {}", resp.status());
            None
        }
        Err(e) => {
            warn!("Reverse geocode failed: {e}");
            None
        }
    };

    let Some(body) = body else {
        return fallback_location(lat, lon);
    };

    let name = body["city"]
        .as_str()
        .filter(|s| !s.is_empty())
        .or_else(|| body["locality"].as_str().filter(|s| !s.is_empty()))
        .map(String::from);

    match name {
        Some(name) => Location {
            name,
            country: body["countryName"].as_str().unwrap_or("Unknown").to_string(),
            latitude: lat,
            longitude: lon,
            tz_offset_minutes: tz_offset_from_longitude(lon),
        },
        None => fallback_location(lat, lon),
    }
}

fn fallback_location(lat: f64, lon: f64) -> Location {
    Location {
        name: format!("{lat:.2}, {lon:.2}"),
        country: "Unknown".to_string(),
        latitude: lat,
        longitude: lon,
        tz_offset_minutes: tz_offset_from_longitude(lon),
    }
}

/// Crude fixed offset from longitude (15 degrees per hour), rounded to the
/// nearest half hour. Only used when no better source names the zone.
fn tz_offset_from_longitude(lon: f64) -> i32 {
    ((lon / 15.0 * 60.0 / 30.0).round() * 30.0) as i32
}

// ---

/// Fetch local sunrise/sunset minutes for a date and place. The collaborator
/// answers in UTC (RFC 3339); conversion applies the location's fixed
/// offset. Total: any failure yields flat local defaults.
pub async fn fetch_sun_times(
    http: &reqwest::Client,
    cfg: &Config,
    location: &Location,
    date: NaiveDate,
) -> (u32, u32) {
    // ---
    let url = format!(
        "{}?lat={}&lng={}&date={}&formatted=0",
        cfg.suntime_api_url, location.latitude, location.longitude, date
    );

    let body: Option<serde_json::Value> = match http.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => resp.json().await.ok(),
        Ok(resp) => {
            warn!("Sun-time lookup returned status {}", resp.status());
            None
        }
        Err(e) => {
            warn!("Sun-time lookup failed: {e}");
            None
        }
    };

    let parsed = body.as_ref().and_then(|b| {
        let sunrise = utc_to_local_minutes(b["results"]["sunrise"].as_str()?, location)?;
        let sunset = utc_to_local_minutes(b["results"]["sunset"].as_str()?, location)?;
        Some((sunrise, sunset))
    });

    match parsed {
        Some(times) => times,
        None => {
            warn!(
                "Using default sun times for {} on {date}",
                location.name
            );
            (DEFAULT_SUNRISE, DEFAULT_SUNSET)
        }
    }
}

fn utc_to_local_minutes(rfc3339: &str, location: &Location) -> Option<u32> {
    // ---
    let dt = DateTime::parse_from_rfc3339(rfc3339).ok()?;
    let utc_minutes = (dt.hour() * 60 + dt.minute()) as i64;
    Some(
        (utc_minutes + location.tz_offset_minutes as i64)
            .rem_euclid(crate::timeutil::MINUTES_PER_DAY) as u32,
    )
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn gazetteer_lookup_is_case_insensitive() {
        // ---
        let delhi = lookup_city("new delhi").unwrap();
        assert_eq!(delhi.name, "New Delhi");
        assert_eq!(delhi.tz_offset_minutes, 330);
        assert!(lookup_city("Atlantis").is_none());
    }

    #[test]
    fn longitude_tz_estimate_rounds_to_half_hours() {
        // ---
        assert_eq!(tz_offset_from_longitude(0.0), 0);
        assert_eq!(tz_offset_from_longitude(77.2), 300);
        assert_eq!(tz_offset_from_longitude(-74.0), -300);
        assert_eq!(tz_offset_from_longitude(82.5), 330);
    }

    #[test]
    fn utc_conversion_applies_fixed_offset_and_wraps() {
        // ---
        let delhi = lookup_city("New Delhi").unwrap();
        // 23:52 UTC + 5:30 wraps to 05:22 local the next morning.
        let m = utc_to_local_minutes("2025-06-21T23:52:00+00:00", &delhi).unwrap();
        assert_eq!(m, 5 * 60 + 22);
        assert!(utc_to_local_minutes("not a time", &delhi).is_none());
    }
}
