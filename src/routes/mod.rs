use std::sync::Arc;

use axum::Router;

use crate::AppState;

mod health;
mod panchang;

// ---

pub fn router(state: Arc<AppState>) -> Router {
    // ---
    Router::new()
        .merge(panchang::router())
        .merge(health::router())
        .with_state(state)
}
