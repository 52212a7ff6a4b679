//! Principal resolution: verified claims → request-scoped identity.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::claims::{TokenClaims, UserClaims, UserIdentity};

/// The resolved, request-scoped authenticated identity.
///
/// Created once per request from a verified token; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    identity: UserIdentity,
    authorities: BTreeSet<String>,
}

impl Principal {
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    pub fn has_authority(&self, name: &str) -> bool {
        self.authorities.contains(name)
    }
}

/// Resolution failure.
///
/// Deliberately carries no detail: the client-visible outcome must be
/// indistinguishable from a signature failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("unknown credential")]
    UnknownCredential,
}

/// Parse the verified envelope's subject payload into a [`Principal`].
///
/// The authority list is deduplicated here even though issuance already
/// sorts and deduplicates: resolution must not trust that invariant blindly,
/// for forward compatibility with other issuers of the same envelope.
pub fn resolve(claims: &TokenClaims) -> Result<Principal, PrincipalError> {
    let user_claims =
        UserClaims::from_subject(&claims.sub).map_err(|_| PrincipalError::UnknownCredential)?;

    Ok(Principal {
        identity: user_claims.user,
        authorities: user_claims.authorities.into_iter().collect(),
    })
}
