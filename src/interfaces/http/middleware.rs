//! Authentication middleware for Axum
//!
//! Verifies the bearer token, resolves its `sub` (member e-mail) through the
//! member directory and stores the resulting [`Caller`] in the request
//! extensions for handlers to pick up.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use super::common::ApiResponse;
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    UnknownMember,
    DirectoryUnavailable,
}

/// Authentication state containing JWT config and the member directory
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    pub repos: Arc<dyn RepositoryProvider>,
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(&auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    let claims = match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            return match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    auth_error_response(AuthError::ExpiredToken)
                }
                _ => auth_error_response(AuthError::InvalidToken),
            };
        }
    };

    match auth_state.repos.members().find_by_email(&claims.sub).await {
        Ok(Some(member)) => {
            request.extensions_mut().insert(member.caller());
            next.run(request).await
        }
        Ok(None) => {
            debug!(email = %claims.sub, "Token subject is not a known member");
            auth_error_response(AuthError::UnknownMember)
        }
        Err(e) => {
            error!(error = %e, "Member lookup failed during authentication");
            auth_error_response(AuthError::DirectoryUnavailable)
        }
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::UnknownMember => (StatusCode::UNAUTHORIZED, "Unknown member"),
        AuthError::DirectoryUnavailable => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        ),
    };
    let code = if status == StatusCode::UNAUTHORIZED {
        "unauthorized"
    } else {
        "internal_error"
    };

    (status, Json(ApiResponse::<()>::error(message, code))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_token("Basic abc"), None);
        assert_eq!(extract_token("Bearer   "), None);
    }
}
