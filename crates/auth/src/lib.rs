//! `projector-auth`: pure authentication/authorization domain.
//!
//! This crate owns token issuance and verification, the authority
//! vocabulary, the role/authority model, and principal resolution. It is
//! intentionally decoupled from HTTP and storage: cookie transport and
//! user/role lookups live in the API layer behind collaborator traits.

pub mod authority;
pub mod claims;
pub mod principal;
pub mod role;
pub mod signer;

pub use authority::Authority;
pub use claims::{TokenClaims, UserClaims, UserIdentity};
pub use principal::{Principal, PrincipalError, resolve};
pub use role::Role;
pub use signer::{IssueError, JwtSigner, KeyError, TokenError};
