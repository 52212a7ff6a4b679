//! Cookie-based authentication middleware.
//!
//! Pulls the candidate token from the auth cookie, verifies it, resolves the
//! principal, and attaches it to the request. A missing or empty cookie
//! passes through as anonymous; route-level checks reject later if the route
//! requires authentication. An invalid token short-circuits with 401 and a
//! clearing `Set-Cookie` so the client discards the stale credential.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use projector_auth::{JwtSigner, resolve};

use crate::context::PrincipalContext;
use crate::cookie::{CLEAR_AUTH_COOKIE, extract_token};

#[derive(Clone)]
pub struct AuthState {
    pub signer: Arc<JwtSigner>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = candidate_token(req.headers()) else {
        // No credential presented: anonymous.
        return next.run(req).await;
    };

    let verified = match state.signer.verify(&token) {
        Ok(claims) => claims,
        Err(reason) => {
            tracing::warn!(%reason, "token verification failed");
            return unauthorized_and_clear_cookie();
        }
    };

    let principal = match resolve(&verified) {
        Ok(principal) => principal,
        Err(reason) => {
            tracing::warn!(%reason, "token subject resolution failed");
            return unauthorized_and_clear_cookie();
        }
    };

    req.extensions_mut().insert(PrincipalContext::new(principal));
    next.run(req).await
}

fn candidate_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(header::COOKIE)?.to_str().ok()?;
    extract_token(header).map(str::to_owned)
}

/// 401 plus the cookie-clearing header: logout-on-invalid-token.
///
/// The body stays empty and the status identical across failure modes so
/// the reason is never leaked to the client.
fn unauthorized_and_clear_cookie() -> Response {
    let mut response = StatusCode::UNAUTHORIZED.into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static(CLEAR_AUTH_COOKIE),
    );
    response
}
