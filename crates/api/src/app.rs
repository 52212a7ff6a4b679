//! Router assembly and auth handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower::ServiceBuilder;

use projector_auth::JwtSigner;

use crate::context::PrincipalContext;
use crate::directory::{RoleDirectory, UserDirectory};
use crate::middleware::{AuthState, auth_middleware};
use crate::service::AuthService;

/// Build the application router.
///
/// The auth middleware wraps every route: requests carrying an invalid
/// cookie are rejected (and the cookie cleared) regardless of target, while
/// requests with no cookie pass through anonymous and are judged per route.
pub fn build_app(
    signer: Arc<JwtSigner>,
    users: Arc<dyn UserDirectory>,
    roles: Arc<dyn RoleDirectory>,
    token_max_age_secs: u64,
) -> Router {
    let service = Arc::new(AuthService::new(
        users,
        roles,
        signer.clone(),
        token_max_age_secs,
    ));
    let auth_state = AuthState { signer };

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile", get(profile))
        .layer(
            ServiceBuilder::new()
                .layer(Extension(service))
                .layer(axum::middleware::from_fn_with_state(
                    auth_state,
                    auth_middleware,
                )),
        )
}

async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// `POST /api/auth/login`: 204 with a `Set-Cookie` on success, 401 with no
/// body on any authentication failure.
async fn login(
    Extension(service): Extension<Arc<AuthService>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    match service.login(&body.email, &body.password).await {
        Ok(cookie) => {
            (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response()
        }
        Err(reason) => {
            tracing::warn!(%reason, "login rejected");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

/// `GET /api/auth/profile`: the current principal's authority set as a JSON
/// array. Any authenticated user may read their own authorities.
async fn profile(context: Option<Extension<PrincipalContext>>) -> Response {
    let context = context.map(|Extension(ctx)| ctx);
    match AuthService::current_authorities(context.as_ref()) {
        Ok(authorities) => (StatusCode::OK, Json(authorities)).into_response(),
        Err(_) => StatusCode::UNAUTHORIZED.into_response(),
    }
}
