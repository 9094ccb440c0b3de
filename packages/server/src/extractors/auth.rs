use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated caller extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Permission checks happen via `require_permission()` in the handler body.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Returns `Ok(())` if the user has the given permission, `Err(PermissionDenied)` otherwise.
    pub fn require_permission(&self, permission: &str) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let state = AppState::from_ref(state);
        let claims = jwt::verify(token, &state.config.auth.jwt_secret).map_err(|e| {
            tracing::debug!("Rejected token: {e}");
            AppError::TokenInvalid
        })?;

        Ok(AuthUser {
            user_id: claims.uid,
            username: claims.sub,
            role: claims.role,
            permissions: claims.permissions,
        })
    }
}
