//! Request-scoped authentication context.

use std::collections::BTreeSet;
use std::sync::Arc;

use projector_auth::Principal;

/// Principal context for a request (resolved identity + authorities).
///
/// Inserted by the auth middleware; absent for anonymous requests.
/// Route-level permission checks go through [`PrincipalContext::has_authority`].
#[derive(Debug, Clone)]
pub struct PrincipalContext {
    principal: Arc<Principal>,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal: Arc::new(principal),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        self.principal.authorities()
    }

    pub fn has_authority(&self, name: &str) -> bool {
        self.principal.has_authority(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projector_auth::{TokenClaims, UserClaims, UserIdentity, resolve};
    use projector_core::UserId;

    fn context() -> PrincipalContext {
        let claims = UserClaims::new(
            UserIdentity::new(UserId::new(3), "viewer@example.com"),
            vec!["USER_VIEW".to_string()],
        );
        let envelope = TokenClaims {
            sub: claims.to_subject().unwrap(),
            iss: "projector".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        PrincipalContext::new(resolve(&envelope).unwrap())
    }

    #[test]
    fn exposes_principal_and_authority_checks() {
        let ctx = context();
        assert_eq!(ctx.principal().identity().id, UserId::new(3));
        assert!(ctx.has_authority("USER_VIEW"));
        assert!(!ctx.has_authority("USER_EDIT"));
        assert_eq!(ctx.authorities().len(), 1);
    }

    #[test]
    fn clones_share_the_principal() {
        let ctx = context();
        let cloned = ctx.clone();
        assert!(Arc::ptr_eq(&ctx.principal, &cloned.principal));
    }
}
