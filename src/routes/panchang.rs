//! The `/panchang` endpoint: one GET, one JSON `PanchangRecord`.
//!
//! Defaults are today's date and the configured default city. By policy the
//! handler answers 200 with a best-effort record even when every external
//! collaborator is down; the only client error is a date or coordinate
//! parameter that cannot be read at all.

use std::sync::Arc;

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use crate::sources::LocationQuery;
use crate::{assemble, AppState};

// ---

pub fn router() -> Router<Arc<AppState>> {
    // ---
    Router::new().route("/panchang", get(handler))
}

/// Query parameters for `/panchang`. `city` wins when both it and
/// coordinates are supplied; a lone `lat` or `lon` is rejected.
#[derive(Debug, Deserialize)]
pub struct PanchangQuery {
    /// ISO date, default today.
    date: Option<String>,
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

async fn handler(
    Query(params): Query<PanchangQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // ---
    info!("GET /panchang - {params:?}");

    let date = match &params.date {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json("date must be YYYY-MM-DD"),
                )
                    .into_response();
            }
        },
        None => Utc::now().date_naive(),
    };

    let query = match (&params.city, params.lat, params.lon) {
        (Some(city), _, _) => LocationQuery::City(city.clone()),
        (None, Some(lat), Some(lon)) => LocationQuery::Coords { lat, lon },
        (None, None, None) => LocationQuery::City(state.config.default_city.clone()),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json("provide city, or both lat and lon"),
            )
                .into_response();
        }
    };

    let record = assemble::assemble(&state, date, &query).await;
    (StatusCode::OK, Json(record)).into_response()
}
