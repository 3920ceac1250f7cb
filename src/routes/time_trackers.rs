//! Time tracker route handlers
//!
//! Collection routes are guarded by a capability check, instance routes by
//! ownership of the tracker.

use super::{location, ValidatedJson};
use crate::auth::{require_capability, Owned, OwnedResource, Permissions};
use crate::error::{ApiResult, AppError};
use crate::models::{CreateTimeTrackerRequest, TimeTracker, TimeTrackerUpdate};
use crate::state::{AppState, SharedState};
use axum::{
    extract::{OriginalUri, State},
    handler::Handler,
    http::{header, HeaderMap, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{debug, info};
use uuid::Uuid;

impl OwnedResource for TimeTracker {
    const KIND: &'static str = "Time tracker";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    async fn load(state: &AppState, id: Uuid) -> Result<Option<Self>, AppError> {
        state.time_trackers.find_by_id(id).await
    }
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/",
            get(find_all.layer(from_fn_with_state(Permissions::READ, require_capability)))
                .post(create.layer(from_fn_with_state(Permissions::CREATE, require_capability))),
        )
        .route("/{id}", get(find).put(update).delete(delete))
}

/// GET /api/v1/timeTrackers
pub async fn find_all(State(state): State<SharedState>) -> ApiResult<Json<Vec<TimeTracker>>> {
    let trackers = state.time_trackers.list().await?;
    debug!("Listing {} time trackers", trackers.len());
    Ok(Json(trackers))
}

/// GET /api/v1/timeTrackers/{id}
pub async fn find(Owned(tracker): Owned<TimeTracker>) -> Json<TimeTracker> {
    Json(tracker)
}

/// POST /api/v1/timeTrackers
pub async fn create(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<CreateTimeTrackerRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = Uuid::parse_str(&req.user_id)
        .map_err(|_| AppError::Validation(format!("userId '{}' is not a valid id", req.user_id)))?;

    if state.accounts.find_by_id(user_id).await?.is_none() {
        return Err(AppError::Validation(format!("Account {} does not exist", user_id)));
    }

    let tracker = state.time_trackers.create(user_id).await?;
    info!("Time tracker {} created for account {}", tracker.id, user_id);

    let location = location(&headers, uri.path(), tracker.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(tracker)))
}

/// PUT /api/v1/timeTrackers/{id}
pub async fn update(
    State(state): State<SharedState>,
    Owned(tracker): Owned<TimeTracker>,
    ValidatedJson(changes): ValidatedJson<TimeTrackerUpdate>,
) -> ApiResult<StatusCode> {
    state.time_trackers.update(tracker.id, &changes).await?;
    debug!("Time tracker {} updated", tracker.id);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/timeTrackers/{id}
pub async fn delete(
    State(state): State<SharedState>,
    Owned(tracker): Owned<TimeTracker>,
) -> ApiResult<StatusCode> {
    state.time_trackers.delete(tracker.id).await?;
    info!("Time tracker {} deleted", tracker.id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::auth::{Permissions, TokenSubject};
    use axum::http::{header, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use uuid::Uuid;

    async fn tracker_id_of(state: &crate::state::SharedState, user_id: &str) -> String {
        state
            .time_trackers
            .find_by_user(user_id.parse().unwrap())
            .await
            .unwrap()
            .unwrap()
            .id
            .to_string()
    }

    fn token_for(state: &crate::state::SharedState, user_id: &str, level: Permissions) -> String {
        state
            .tokens
            .issue(&TokenSubject {
                user_id: user_id.to_string(),
                time_tracker_id: None,
                username: "someone".to_string(),
                email: "someone@x.com".to_string(),
                permission_level: level,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_owner_can_read_update_delete() {
        let state = test_state();
        let app = test_app(state.clone());
        let (alice, token) = register_and_login(&app, "alice").await;
        let tracker = tracker_id_of(&state, &alice).await;
        let uri = format!("/api/v1/timeTrackers/{}", tracker);

        let response = send(&app, "GET", &uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], tracker.as_str());
        assert_eq!(body["userId"], alice.as_str());
        assert_eq!(body["totalSedentaryTime"], 0.0);

        let response = send(
            &app,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "totalSedentaryTime": 90.5, "userId": Uuid::new_v4() })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let body = body_json(send(&app, "GET", &uri, Some(&token), None).await).await;
        assert_eq!(body["totalSedentaryTime"], 90.5);
        assert_eq!(body["totalBreakTime"], 0.0);
        // userId is not on the allow-list.
        assert_eq!(body["userId"], alice.as_str());

        let response = send(&app, "DELETE", &uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "GET", &uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_foreign_tracker_is_403_even_with_all_bits() {
        let state = test_state();
        let app = test_app(state.clone());
        let (alice, _) = register_and_login(&app, "alice").await;
        let (bob, bob_token) = register_and_login(&app, "bob").await;
        let uri = format!("/api/v1/timeTrackers/{}", tracker_id_of(&state, &alice).await);

        for method in ["GET", "PUT", "DELETE"] {
            let response = send(&app, method, &uri, Some(&bob_token), Some(json!({}))).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", method);
        }

        let admin_token = token_for(&state, &bob, Permissions::all());
        let response = send(&app, "GET", &uri, Some(&admin_token), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_tracker_is_404_for_anyone() {
        let state = test_state();
        let app = test_app(state.clone());
        let (_, token) = register_and_login(&app, "alice").await;
        let admin_token = token_for(&state, &Uuid::new_v4().to_string(), Permissions::all());
        let nobody_token = token_for(&state, &Uuid::new_v4().to_string(), Permissions::empty());

        for uri in [
            format!("/api/v1/timeTrackers/{}", Uuid::new_v4()),
            "/api/v1/timeTrackers/doesNotExist".to_string(),
        ] {
            for token in [&token, &admin_token, &nobody_token] {
                for method in ["GET", "PUT", "DELETE"] {
                    let response = send(&app, method, &uri, Some(token), Some(json!({}))).await;
                    assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} {}", method, uri);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_list_requires_read() {
        let state = test_state();
        let app = test_app(state.clone());
        let (alice, token) = register_and_login(&app, "alice").await;

        let response = send(&app, "GET", "/api/v1/timeTrackers", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

        let no_read = token_for(&state, &alice, Permissions::CREATE | Permissions::UPDATE);
        let response = send(&app, "GET", "/api/v1/timeTrackers", Some(&no_read), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_requires_create_and_rejects_duplicates() {
        let state = test_state();
        let app = test_app(state.clone());
        let (alice, token) = register_and_login(&app, "alice").await;

        // Registration already made alice's tracker.
        let response = send(
            &app,
            "POST",
            "/api/v1/timeTrackers",
            Some(&token),
            Some(json!({ "userId": alice })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let read_only = token_for(&state, &alice, Permissions::READ);
        let response = send(
            &app,
            "POST",
            "/api/v1/timeTrackers",
            Some(&read_only),
            Some(json!({ "userId": alice })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_returns_location() {
        let state = test_state();
        let app = test_app(state.clone());
        let (alice, token) = register_and_login(&app, "alice").await;

        // Free the slot so a new tracker can be made.
        let old = tracker_id_of(&state, &alice).await;
        state.time_trackers.delete(old.parse().unwrap()).await.unwrap();

        let response = send(
            &app,
            "POST",
            "/api/v1/timeTrackers",
            Some(&token),
            Some(json!({ "userId": alice })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = body_json(response).await;
        let id = body["id"].as_str().unwrap();
        assert_eq!(
            location,
            format!("http://localhost:3000/api/v1/timeTrackers/{}", id)
        );
        assert_eq!(body["userId"], alice.as_str());
    }

    #[tokio::test]
    async fn test_create_validation() {
        let state = test_state();
        let app = test_app(state.clone());
        let (_, token) = register_and_login(&app, "alice").await;

        let bodies = [
            json!({}),
            json!({ "userId": "not-a-uuid" }),
            json!({ "userId": Uuid::new_v4() }),
        ];
        for body in bodies {
            let response =
                send(&app, "POST", "/api/v1/timeTrackers", Some(&token), Some(body.clone())).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
        }
    }

    #[tokio::test]
    async fn test_update_rejects_negative_totals() {
        let state = test_state();
        let app = test_app(state.clone());
        let (alice, token) = register_and_login(&app, "alice").await;
        let uri = format!("/api/v1/timeTrackers/{}", tracker_id_of(&state, &alice).await);

        let response = send(
            &app,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "totalBreakTime": -3 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
