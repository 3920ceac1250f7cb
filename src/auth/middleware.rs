//! Authentication and authorization middleware
//!
//! `authenticate` turns a bearer token into a [`Principal`] stored in the
//! request extensions. After it, a route is guarded either by
//! `require_capability` (coarse, bitmask only) or by taking an [`Owned`]
//! extractor, which loads the targeted resource and checks that the
//! principal owns it.

use crate::auth::{has_capability, Claims, Permissions};
use crate::error::AppError;
use crate::state::{AppState, SharedState};
use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::future::Future;
use tracing::debug;
use uuid::Uuid;

/// The authenticated identity of the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub permission_level: Permissions,
    pub time_tracker_id: Option<String>,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        let permission_level = claims.permissions();
        Self {
            user_id: claims.user_id,
            username: claims.username,
            email: claims.email,
            permission_level,
            time_tracker_id: claims.time_tracker_id,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("No principal attached to request".to_string()))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AppError> {
    let value = header
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Authorization header is not valid text".to_string()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AppError::Unauthenticated("Malformed authorization header".to_string()))?;

    if scheme != "Bearer" {
        return Err(AppError::Unauthenticated(format!(
            "Invalid authentication scheme '{}'",
            scheme
        )));
    }
    if token.is_empty() || token.contains(' ') {
        return Err(AppError::Unauthenticated("Malformed bearer token".to_string()));
    }

    Ok(token)
}

/// Verify the bearer token and attach the principal to the request
pub async fn authenticate(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers().get(AUTHORIZATION))?;
    let claims = state
        .tokens
        .verify(token)
        .map_err(|e| {
            let cause = if e.is_expired() { "Access token expired".to_string() } else { e.to_string() };
            AppError::Unauthenticated(cause)
        })?;

    let principal = Principal::from(claims);
    debug!(
        user_id = %principal.user_id,
        username = %principal.username,
        email = %principal.email,
        time_tracker_id = ?principal.time_tracker_id,
        level = principal.permission_level.level(),
        "Request authenticated"
    );

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Coarse check: does the principal hold `required` at all?
pub fn authorize(principal: Option<&Principal>, required: Permissions) -> Result<(), AppError> {
    match principal {
        Some(p) if has_capability(p.permission_level, required) => Ok(()),
        Some(p) => Err(AppError::Forbidden(format!(
            "User {} (level {}) lacks {:?}",
            p.user_id,
            p.permission_level.level(),
            required
        ))),
        None => Err(AppError::Forbidden("No principal on request".to_string())),
    }
}

/// Route middleware for the coarse check. The required capability is the
/// middleware state: `from_fn_with_state(Permissions::READ, require_capability)`.
pub async fn require_capability(
    State(required): State<Permissions>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(request.extensions().get::<Principal>(), required)?;
    Ok(next.run(request).await)
}

/// A stored resource that belongs to exactly one account
pub trait OwnedResource: Sized + Send {
    /// Name used in error messages
    const KIND: &'static str;

    fn owner_id(&self) -> Uuid;

    fn load(state: &AppState, id: Uuid) -> impl Future<Output = Result<Option<Self>, AppError>> + Send;
}

/// Ownership check against an already loaded resource
pub fn ensure_owner<R: OwnedResource>(
    principal: Option<&Principal>,
    resource: &R,
) -> Result<(), AppError> {
    let owner = resource.owner_id();
    match principal {
        Some(p) if Uuid::parse_str(&p.user_id).ok() == Some(owner) => Ok(()),
        Some(p) => Err(AppError::Forbidden(format!(
            "User {} does not own {} owned by {}",
            p.user_id,
            R::KIND,
            owner
        ))),
        None => Err(AppError::Forbidden("No principal on request".to_string())),
    }
}

/// Load the resource named by `raw_id` and check the principal owns it.
///
/// A missing resource is reported before ownership is looked at, so a
/// caller learns `NotFound` for unknown ids regardless of who they are.
pub async fn authorize_resource<R: OwnedResource>(
    state: &AppState,
    principal: Option<&Principal>,
    raw_id: &str,
) -> Result<R, AppError> {
    let not_found = || AppError::NotFound(format!("{} {} not found", R::KIND, raw_id));

    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    let resource = R::load(state, id).await?.ok_or_else(not_found)?;

    ensure_owner(principal, &resource)?;
    Ok(resource)
}

/// Extractor for instance routes: yields the resource at `/{id}` once the
/// current principal is known to own it.
#[derive(Debug)]
pub struct Owned<R>(pub R);

impl<R: OwnedResource> FromRequestParts<SharedState> for Owned<R> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state).await?;
        let principal = parts.extensions.get::<Principal>().cloned();

        let resource = authorize_resource::<R>(state, principal.as_ref(), &raw_id).await?;
        Ok(Owned(resource))
    }
}
