//! Account lookup routes
//!
//! An account counts as owned by itself, so `/users/{id}` only answers for
//! the caller's own id.

use crate::auth::{Owned, OwnedResource};
use crate::error::AppError;
use crate::models::{Account, AccountResponse};
use crate::state::{AppState, SharedState};
use axum::{routing::get, Json, Router};
use uuid::Uuid;

impl OwnedResource for Account {
    const KIND: &'static str = "Account";

    fn owner_id(&self) -> Uuid {
        self.id
    }

    async fn load(state: &AppState, id: Uuid) -> Result<Option<Self>, AppError> {
        state.accounts.find_by_id(id).await
    }
}

pub fn routes() -> Router<SharedState> {
    Router::new().route("/{id}", get(find))
}

/// GET /api/v1/users/{id}
pub async fn find(Owned(account): Owned<Account>) -> Json<AccountResponse> {
    Json(account.into())
}
