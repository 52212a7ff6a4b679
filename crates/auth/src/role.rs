//! Role model: a named bundle of authorities.
//!
//! Roles are persisted with their authorities in a compact comma-separated
//! string; in memory they are a set. This module owns that conversion plus
//! the validation the role-management boundary applies before a grant.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use projector_core::{DomainError, DomainResult, RoleId};

use crate::Authority;

/// A named, persisted bundle of authorities assignable to users.
///
/// Consumed read-only by the login flow; CRUD lives with the role-management
/// subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    authorities: BTreeSet<String>,
}

impl Role {
    pub fn new(id: RoleId, name: impl Into<String>, authorities: BTreeSet<String>) -> Self {
        Self {
            id,
            name: name.into(),
            authorities,
        }
    }

    /// Build a role from the persisted compact form.
    ///
    /// The compact form is comma-separated and whitespace-tolerant; an empty
    /// or blank string yields an empty authority set.
    pub fn from_compact(id: RoleId, name: impl Into<String>, compact: &str) -> Self {
        let authorities = compact
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();

        Self::new(id, name, authorities)
    }

    /// The persisted compact form, `None` when the role grants nothing.
    pub fn to_compact(&self) -> Option<String> {
        if self.authorities.is_empty() {
            None
        } else {
            Some(
                self.authorities
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            )
        }
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    /// Validate a requested authority set against the assignable subset of
    /// the vocabulary. Applied by the role-management boundary before a
    /// create/update; the login path trusts stored roles.
    pub fn validate_assignable(authorities: &BTreeSet<String>) -> DomainResult<()> {
        let invalid: Vec<&str> = authorities
            .iter()
            .map(String::as_str)
            .filter(|name| !Authority::from_name(name).is_ok_and(|a| a.is_assignable()))
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "invalid authorities: {}",
                invalid.join(", ")
            )))
        }
    }
}
