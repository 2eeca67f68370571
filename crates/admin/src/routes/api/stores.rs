//! Store API handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use onboarding_core::StoreId;
use onboarding_core::timestamp::{DISPLAY_DATE_TIME, to_display_string, to_input_string};

use crate::error::AppError;
use crate::models::{Store, StoreCandidate, StoreChanges, StoreFilter};
use crate::services::{CreateStoreInput, SaveOutcome};
use crate::state::AppState;

/// Build the stores router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores", get(list_stores).post(create_store))
        .route("/api/stores/duplicates", post(check_duplicates))
        .route("/api/stores/{id}", get(get_store).patch(update_store))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Request for an ad-hoc duplicate check.
#[derive(Debug, Deserialize)]
pub struct DuplicatesRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: String,
    /// The store being edited, if any.
    #[serde(default)]
    pub exclude_id: Option<StoreId>,
}

/// Duplicate check result.
///
/// `checked` is false when the store directory could not be queried; the
/// UI shows a warning instead of blocking.
#[derive(Debug, Serialize)]
pub struct DuplicatesResponse {
    pub checked: bool,
    pub matches: Vec<StoreCandidate>,
}

/// Partial update plus duplicate confirmation.
#[derive(Debug, Deserialize)]
pub struct UpdateStoreRequest {
    #[serde(flatten)]
    pub changes: StoreChanges,
    #[serde(default)]
    pub confirm_duplicates: bool,
}

/// A store with its launch date pre-formatted for display and form inputs.
#[derive(Debug, Serialize)]
pub struct StoreView {
    #[serde(flatten)]
    pub store: Store,
    pub launch_display: String,
    pub launch_input: String,
}

impl From<Store> for StoreView {
    fn from(store: Store) -> Self {
        Self {
            launch_display: to_display_string(store.launch_at, DISPLAY_DATE_TIME),
            launch_input: to_input_string(store.launch_at),
            store,
        }
    }
}

fn saved(outcome: SaveOutcome<Store>) -> Result<StoreView, AppError> {
    match outcome {
        SaveOutcome::Saved(store) => Ok(store.into()),
        SaveOutcome::NeedsConfirmation(matches) => {
            Err(AppError::DuplicateConfirmationRequired(matches))
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Check a store name against existing stores in the same region.
///
/// Never fails: an unavailable store table yields `checked: false`.
#[instrument(skip(state, body), fields(name = %body.name, region = %body.region))]
pub async fn check_duplicates(
    State(state): State<AppState>,
    Json(body): Json<DuplicatesRequest>,
) -> Json<DuplicatesResponse> {
    let check = state
        .detector()
        .check(&body.name, &body.region, body.exclude_id.as_ref())
        .await;

    Json(DuplicatesResponse {
        checked: check.was_checked(),
        matches: check.into_matches(),
    })
}

/// List stores.
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
#[instrument(skip(state))]
pub async fn list_stores(
    State(state): State<AppState>,
    Query(filter): Query<StoreFilter>,
) -> Result<Json<Vec<StoreView>>, AppError> {
    let stores = state.stores().list(&filter).await?;
    Ok(Json(stores.into_iter().map(StoreView::from).collect()))
}

/// Create a store.
///
/// # Errors
///
/// Returns 400 for invalid input and 409 with the similar stores when the
/// save needs confirmation.
#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create_store(
    State(state): State<AppState>,
    Json(body): Json<CreateStoreInput>,
) -> Result<(StatusCode, Json<StoreView>), AppError> {
    let outcome = state.stores().create(&body).await?;
    Ok((StatusCode::CREATED, Json(saved(outcome)?)))
}

/// Get a store by ID.
///
/// # Errors
///
/// Returns 404 if the store does not exist.
#[instrument(skip(state))]
pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
) -> Result<Json<StoreView>, AppError> {
    let store = state.stores().get(&id).await?;
    Ok(Json(store.into()))
}

/// Update a store.
///
/// # Errors
///
/// Returns 400 for invalid fields or a disallowed stage transition, 404 for
/// an unknown store, and 409 with the similar stores when a rename needs
/// confirmation.
#[instrument(skip(state, body))]
pub async fn update_store(
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
    Json(body): Json<UpdateStoreRequest>,
) -> Result<Json<StoreView>, AppError> {
    let outcome = state
        .stores()
        .update(&id, &body.changes, body.confirm_duplicates)
        .await?;
    Ok(Json(saved(outcome)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use onboarding_core::{CanonicalTimestamp, Region, StoreStage};

    use super::*;
    use crate::routes::test_support::{json_body, json_request, unreachable_state};

    fn app() -> Router {
        router().with_state(unreachable_state())
    }

    #[tokio::test]
    async fn test_duplicates_blank_name_is_checked_without_database() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/stores/duplicates",
                &json!({"name": "  ", "region": "Gauteng"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body, json!({"checked": true, "matches": []}));
    }

    #[tokio::test]
    async fn test_duplicates_soft_fails_when_database_is_down() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/stores/duplicates",
                &json!({"name": "Corner Cafe", "region": "Gauteng", "exclude_id": "abc"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["checked"], json!(false));
        assert_eq!(body["matches"], json!([]));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input_before_database() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/stores",
                &json!({"name": "", "region": "Gauteng"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("name is required"));

        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/stores",
                &json!({"name": "Corner Cafe", "region": "Atlantis"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_store_hides_database_errors() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/stores/abc")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[test]
    fn test_update_request_flattens_changes() {
        let request: UpdateStoreRequest = serde_json::from_value(json!({
            "stage": "warm",
            "launch_at": null,
            "confirm_duplicates": true
        }))
        .unwrap();

        assert!(request.confirm_duplicates);
        assert_eq!(request.changes.stage, Some(StoreStage::Warm));
        assert!(request.changes.launch_at.is_some());
        assert!(request.changes.name.is_none());
    }

    #[test]
    fn test_store_view_formats_launch() {
        let created = CanonicalTimestamp::new(1_700_000_000, 0).unwrap();
        let store = Store {
            id: StoreId::new("store-1"),
            name: "Corner Cafe".to_string(),
            region: Region::Gauteng,
            stage: StoreStage::Lead,
            contact_name: None,
            contact_email: None,
            notes: None,
            launch_at: None,
            created_at: created,
            updated_at: created,
        };

        let view = serde_json::to_value(StoreView::from(store)).unwrap();
        assert_eq!(view["id"], json!("store-1"));
        assert_eq!(view["region"], json!("Gauteng"));
        assert_eq!(view["launch_display"], json!("Not set"));
        assert_eq!(view["launch_input"], json!(""));
    }
}
