//! Login orchestration and authority exposure.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;

use projector_auth::{JwtSigner, Role, UserClaims};

use crate::context::PrincipalContext;
use crate::cookie::build_auth_cookie;
use crate::directory::{DirectoryError, RoleDirectory, UserDirectory};

/// Authentication failure, as surfaced to the HTTP layer.
///
/// Every variant maps to a generic 401: the client never learns whether the
/// email was unknown, the password wrong, or something broke downstream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("internal authentication error")]
    Internal,
}

/// Upper bound on the configured token lifetime (ten years). Keeps the
/// expiry arithmetic in range whatever the environment supplies.
const MAX_TOKEN_AGE_SECS: i64 = 315_360_000;

/// Orchestrates login and exposes the current principal's authorities.
pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    roles: Arc<dyn RoleDirectory>,
    signer: Arc<JwtSigner>,
    token_max_age_secs: i64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        roles: Arc<dyn RoleDirectory>,
        signer: Arc<JwtSigner>,
        token_max_age_secs: u64,
    ) -> Self {
        let token_max_age_secs = i64::try_from(token_max_age_secs)
            .map_or(MAX_TOKEN_AGE_SECS, |secs| secs.min(MAX_TOKEN_AGE_SECS));

        Self {
            users,
            roles,
            signer,
            token_max_age_secs,
        }
    }

    /// Authenticate credentials and produce the `Set-Cookie` value carrying
    /// a fresh token.
    ///
    /// Flow: verify credentials → load roles → aggregate authorities →
    /// issue token → build cookie. Any step failure short-circuits; nothing
    /// is retried.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .users
            .verify_credentials(email, password)
            .await
            .map_err(|err| match err {
                DirectoryError::CredentialsRejected => AuthError::InvalidCredentials,
                DirectoryError::Unavailable(reason) => {
                    tracing::error!(%reason, "user directory unavailable during login");
                    AuthError::Internal
                }
            })?;

        let roles = self
            .roles
            .roles_for_user(user.id)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "role lookup failed during login");
                AuthError::Internal
            })?;

        let authorities = aggregate_authorities(&roles);
        let claims = UserClaims::new(user.clone(), authorities);

        let token = self
            .signer
            .issue(&claims, Duration::seconds(self.token_max_age_secs))
            .map_err(|err| {
                tracing::error!(error = %err, "token issuance failed");
                AuthError::Internal
            })?;

        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(build_auth_cookie(&token, self.token_max_age_secs))
    }

    /// The authority set of the current request's principal.
    pub fn current_authorities(
        context: Option<&PrincipalContext>,
    ) -> Result<BTreeSet<String>, AuthError> {
        context
            .map(|ctx| ctx.authorities().clone())
            .ok_or(AuthError::NotAuthenticated)
    }
}

/// Union every role's authorities into one flat, deduplicated, sorted list.
///
/// Lexicographic order keeps the token payload byte-stable across re-logins
/// with unchanged roles.
pub fn aggregate_authorities(roles: &[Role]) -> Vec<String> {
    let union: BTreeSet<&String> = roles.iter().flat_map(|role| role.authorities()).collect();
    union.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use async_trait::async_trait;
    use projector_auth::{UserIdentity, resolve};
    use projector_core::{RoleId, UserId};

    fn role(id: i64, name: &str, compact: &str) -> Role {
        Role::from_compact(RoleId::new(id), name, compact)
    }

    #[test]
    fn aggregation_unions_dedupes_and_sorts() {
        let roles = vec![
            role(1, "Editors", "USER_EDIT,ROLE_EDIT"),
            role(2, "Viewers", "USER_VIEW,USER_EDIT"),
        ];
        assert_eq!(
            aggregate_authorities(&roles),
            vec!["ROLE_EDIT", "USER_EDIT", "USER_VIEW"]
        );
    }

    #[test]
    fn aggregation_of_no_roles_is_empty() {
        assert!(aggregate_authorities(&[]).is_empty());
    }

    fn service_with(directory: InMemoryDirectory) -> AuthService {
        let directory = Arc::new(directory);
        AuthService::new(
            directory.clone(),
            directory,
            Arc::new(JwtSigner::generate().unwrap()),
            3600,
        )
    }

    fn token_from_cookie(cookie: &str) -> &str {
        cookie
            .strip_prefix("X-Auth=")
            .and_then(|rest| rest.split(';').next())
            .unwrap()
    }

    #[tokio::test]
    async fn login_embeds_union_of_role_authorities() {
        let mut directory = InMemoryDirectory::seeded();
        directory.assign_role(UserId::new(1), role(2, "RoleAdmins", "ROLE_VIEW,USER_VIEW"));
        let service = service_with(directory);

        let cookie = service.login("admin", "admin").await.unwrap();
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=3600"));

        let verified = service
            .signer
            .verify(token_from_cookie(&cookie))
            .unwrap();
        let principal = resolve(&verified).unwrap();
        assert_eq!(principal.identity().id, UserId::new(1));

        let expected: BTreeSet<String> = ["ROLE_VIEW", "USER_EDIT", "USER_VIEW"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(principal.authorities(), &expected);
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let service = service_with(InMemoryDirectory::seeded());
        assert_eq!(
            service.login("admin", "wrong").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn unknown_user_reports_the_same_failure_as_wrong_password() {
        let service = service_with(InMemoryDirectory::seeded());
        let unknown = service.login("ghost", "admin").await.unwrap_err();
        let wrong = service.login("admin", "wrong").await.unwrap_err();
        assert_eq!(unknown, wrong);
    }

    #[tokio::test]
    async fn roleless_user_gets_empty_authority_token() {
        let mut directory = InMemoryDirectory::seeded();
        directory.add_user(UserId::new(2), "plain@example.com", "pw");
        let service = service_with(directory);

        let cookie = service.login("plain@example.com", "pw").await.unwrap();
        let verified = service
            .signer
            .verify(token_from_cookie(&cookie))
            .unwrap();
        assert!(resolve(&verified).unwrap().authorities().is_empty());
    }

    #[tokio::test]
    async fn oversized_max_age_is_clamped() {
        let directory = Arc::new(InMemoryDirectory::seeded());
        let service = AuthService::new(
            directory.clone(),
            directory,
            Arc::new(JwtSigner::generate().unwrap()),
            u64::MAX,
        );

        let cookie = service.login("admin", "admin").await.unwrap();
        assert!(cookie.contains("Max-Age=315360000"));
        assert!(service.signer.verify(token_from_cookie(&cookie)).is_ok());
    }

    struct BrokenRoles;

    #[async_trait]
    impl RoleDirectory for BrokenRoles {
        async fn roles_for_user(&self, _user_id: UserId) -> Result<Vec<Role>, DirectoryError> {
            Err(DirectoryError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn downstream_failure_maps_to_internal() {
        let service = AuthService::new(
            Arc::new(InMemoryDirectory::seeded()),
            Arc::new(BrokenRoles),
            Arc::new(JwtSigner::generate().unwrap()),
            3600,
        );
        assert_eq!(
            service.login("admin", "admin").await,
            Err(AuthError::Internal)
        );
    }

    #[test]
    fn current_authorities_requires_a_principal() {
        assert_eq!(
            AuthService::current_authorities(None),
            Err(AuthError::NotAuthenticated)
        );

        let claims = UserClaims::new(
            UserIdentity::new(UserId::new(1), "admin"),
            vec!["USER_VIEW".to_string()],
        );
        let envelope = projector_auth::TokenClaims {
            sub: claims.to_subject().unwrap(),
            iss: "projector".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        let context = PrincipalContext::new(resolve(&envelope).unwrap());
        let authorities = AuthService::current_authorities(Some(&context)).unwrap();
        assert!(authorities.contains("USER_VIEW"));
    }
}
