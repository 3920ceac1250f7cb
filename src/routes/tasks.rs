//! Task route handlers
//!
//! Tasks are not owned by an account; every route is guarded by the coarse
//! capability check only.

use super::{location, ValidatedJson};
use crate::auth::{require_capability, Permissions};
use crate::error::{ApiResult, AppError};
use crate::models::{Task, TaskInput};
use crate::state::SharedState;
use axum::{
    extract::{OriginalUri, Path, State},
    handler::Handler,
    http::{header, HeaderMap, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/",
            get(find_all.layer(from_fn_with_state(Permissions::READ, require_capability)))
                .post(create.layer(from_fn_with_state(Permissions::CREATE, require_capability))),
        )
        .route(
            "/{id}",
            get(find.layer(from_fn_with_state(Permissions::READ, require_capability)))
                .put(update.layer(from_fn_with_state(Permissions::UPDATE, require_capability)))
                .delete(delete.layer(from_fn_with_state(Permissions::DELETE, require_capability))),
        )
}

fn task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Task {} not found", raw)))
}

/// GET /api/v1/tasks
pub async fn find_all(State(state): State<SharedState>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list().await?))
}

/// GET /api/v1/tasks/{id}
pub async fn find(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task = state
        .tasks
        .find_by_id(task_id(&id)?)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;
    Ok(Json(task))
}

/// POST /api/v1/tasks
pub async fn create(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<TaskInput>,
) -> ApiResult<impl IntoResponse> {
    let task = state.tasks.create(&input).await?;
    info!("Task {} created", task.id);

    let location = location(&headers, uri.path(), task.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(task)))
}

/// PUT /api/v1/tasks/{id}
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<TaskInput>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.update(task_id(&id)?, &input).await?;
    Ok(Json(task))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(task_id(&id)?).await?;
    info!("Task {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::auth::{Permissions, TokenSubject};
    use crate::state::SharedState;
    use axum::http::{header, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use uuid::Uuid;

    fn token_with(state: &SharedState, level: Permissions) -> String {
        state
            .tokens
            .issue(&TokenSubject {
                user_id: Uuid::new_v4().to_string(),
                time_tracker_id: None,
                username: "worker".to_string(),
                email: "worker@x.com".to_string(),
                permission_level: level,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_task_lifecycle() {
        let state = test_state();
        let app = test_app(state.clone());
        let token = token_with(&state, Permissions::all());

        let response = send(
            &app,
            "POST",
            "/api/v1/tasks",
            Some(&token),
            Some(json!({ "description": "write report" })),
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
        let created = body_json(response).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(location, format!("http://localhost:3000/api/v1/tasks/{}", id));
        assert_eq!(created["done"], false);

        let uri = format!("/api/v1/tasks/{}", id);
        let response = send(
            &app,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "description": "write report", "done": true })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["done"], true);

        let response = send(&app, "GET", "/api/v1/tasks", Some(&token), None).await;
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

        let response = send(&app, "DELETE", &uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "GET", &uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_capability_per_method() {
        let state = test_state();
        let app = test_app(state.clone());
        let task = state
            .tasks
            .create(&crate::models::TaskInput {
                description: "existing".to_string(),
                done: false,
            })
            .await
            .unwrap();
        let uri = format!("/api/v1/tasks/{}", task.id);
        let body = json!({ "description": "changed" });

        // The default registered level lacks DELETE.
        let default_level = token_with(&state, Permissions::DEFAULT_ACCOUNT);
        let response = send(&app, "DELETE", &uri, Some(&default_level), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let response = send(&app, "PUT", &uri, Some(&default_level), Some(body.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let read_only = token_with(&state, Permissions::READ);
        let response = send(&app, "GET", &uri, Some(&read_only), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&app, "POST", "/api/v1/tasks", Some(&read_only), Some(body.clone())).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let response = send(&app, "PUT", &uri, Some(&read_only), Some(body)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let delete_only = token_with(&state, Permissions::DELETE);
        let response = send(&app, "GET", "/api/v1/tasks", Some(&delete_only), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let response = send(&app, "DELETE", &uri, Some(&delete_only), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_missing_and_invalid() {
        let state = test_state();
        let app = test_app(state.clone());
        let token = token_with(&state, Permissions::all());

        for uri in [format!("/api/v1/tasks/{}", Uuid::new_v4()), "/api/v1/tasks/nope".to_string()] {
            let response = send(&app, "GET", &uri, Some(&token), None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
            let response = send(&app, "DELETE", &uri, Some(&token), None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }

        let response = send(
            &app,
            "POST",
            "/api/v1/tasks",
            Some(&token),
            Some(json!({ "description": "" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
