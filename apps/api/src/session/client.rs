use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;
use crate::session::auth::AuthService;
use crate::session::store::ScopedKvStore;
use crate::state::AppState;

pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Identifies the calling client. All of its session state lives under its
/// own key namespace, the way browser-local storage is private to one browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Validation(format!("{CLIENT_ID_HEADER} header is required")))?;

        Uuid::parse_str(raw.trim())
            .map(ClientId)
            .map_err(|_| AppError::Validation(format!("{CLIENT_ID_HEADER} must be a UUID")))
    }
}

/// Identity service bound to one client's namespace.
pub fn auth_for(state: &AppState, client: ClientId) -> AuthService<ScopedKvStore> {
    AuthService::new(ScopedKvStore::new(state.kv.clone(), client.0))
}

/// Gate for everything behind sign-in. Guests pass.
pub async fn require_user(state: &AppState, client: ClientId) -> Result<User, AppError> {
    auth_for(state, client)
        .current_user()
        .await?
        .ok_or(AppError::Unauthorized)
}
