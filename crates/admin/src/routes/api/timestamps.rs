//! Timestamp normalization API.
//!
//! Lets form front-ends round-trip whatever a user typed through the same
//! lenient parser the store endpoints use.

use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};

use onboarding_core::timestamp::{
    DISPLAY_DATE_TIME, parse_flexible, to_display_string, to_input_string,
};
use onboarding_core::{CanonicalTimestamp, TemporalValue};

use crate::state::AppState;

/// Build the timestamps router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/timestamps/normalize", post(normalize))
}

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    #[serde(default)]
    pub value: TemporalValue,
    /// `strftime` pattern for `display`; defaults to date and time.
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    /// `null` when the value is missing or unrecognised.
    pub canonical: Option<CanonicalTimestamp>,
    pub display: String,
    pub input: String,
}

/// Normalize a timestamp in any supported shape.
pub async fn normalize(Json(body): Json<NormalizeRequest>) -> Json<NormalizeResponse> {
    let canonical = parse_flexible(&body.value);
    let pattern = body.pattern.as_deref().unwrap_or(DISPLAY_DATE_TIME);

    Json(NormalizeResponse {
        canonical,
        display: to_display_string(canonical, pattern),
        input: to_input_string(canonical),
    })
}
