//! Claims payloads: what a token carries and how.
//!
//! The token is a generic signed envelope ([`TokenClaims`]); the structured
//! identity/authority payload ([`UserClaims`]) rides inside the envelope's
//! `sub` field as a JSON string and is decoded independently, so payload
//! fields can evolve without touching envelope verification.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use projector_core::UserId;

/// Minimized identity view embedded in tokens.
///
/// Never carries the password hash or any other credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
}

impl UserIdentity {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// The structured payload embedded as the token subject.
///
/// `authorities` is deduplicated and lexicographically sorted at
/// construction, so re-logins with unchanged roles produce byte-identical
/// subject payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub user: UserIdentity,
    pub authorities: Vec<String>,
}

impl UserClaims {
    pub fn new(user: UserIdentity, authorities: impl IntoIterator<Item = String>) -> Self {
        let deduplicated: BTreeSet<String> = authorities.into_iter().collect();
        Self {
            user,
            authorities: deduplicated.into_iter().collect(),
        }
    }

    /// Serialize to the compact JSON string placed in the token subject.
    pub fn to_subject(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a token subject string back into claims.
    pub fn from_subject(subject: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(subject)
    }
}

/// Registered claims of the signed envelope.
///
/// `sub` holds the [`UserClaims`] JSON string; the remaining fields are the
/// standard issuer/timing claims the verifier checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}
