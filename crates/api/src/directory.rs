//! Collaborator seams for user and role lookups.
//!
//! The auth service consumes these read-only: credential verification and
//! the role set assigned to a user. Real deployments back them with the
//! relational store; dev and tests use the seeded in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;

use projector_auth::{Role, UserIdentity};
use projector_core::{RoleId, UserId};

/// Lookup failure at the directory boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Unknown email or wrong password. One variant for both on purpose:
    /// callers must not be able to enumerate accounts.
    #[error("invalid username or password")]
    CredentialsRejected,

    /// Backing store failure.
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Verifies login credentials and yields the minimized identity view.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, DirectoryError>;
}

/// Yields the roles assigned to a user.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn roles_for_user(&self, user_id: UserId) -> Result<Vec<Role>, DirectoryError>;
}

fn sha256_hex(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

struct StoredUser {
    identity: UserIdentity,
    pass_hash: String,
}

/// In-memory directory for dev and tests.
pub struct InMemoryDirectory {
    users: Vec<StoredUser>,
    roles_by_user: HashMap<UserId, Vec<Role>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            roles_by_user: HashMap::new(),
        }
    }

    /// The standard dev fixture: `admin`/`admin` holding the SUPERADMIN
    /// role with `USER_VIEW` and `USER_EDIT`.
    pub fn seeded() -> Self {
        let mut directory = Self::new();
        let admin = directory.add_user(UserId::new(1), "admin", "admin");
        directory.assign_role(
            admin,
            Role::from_compact(RoleId::new(1), "SUPERADMIN", "USER_VIEW,USER_EDIT"),
        );
        directory
    }

    pub fn add_user(&mut self, id: UserId, email: &str, password: &str) -> UserId {
        self.users.push(StoredUser {
            identity: UserIdentity::new(id, email.to_lowercase()),
            pass_hash: sha256_hex(password),
        });
        id
    }

    pub fn assign_role(&mut self, user_id: UserId, role: Role) {
        self.roles_by_user.entry(user_id).or_default().push(role);
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, DirectoryError> {
        let login = email.to_lowercase();
        let user = self
            .users
            .iter()
            .find(|u| u.identity.email == login)
            .ok_or(DirectoryError::CredentialsRejected)?;

        if user.pass_hash == sha256_hex(password) {
            Ok(user.identity.clone())
        } else {
            Err(DirectoryError::CredentialsRejected)
        }
    }
}

#[async_trait]
impl RoleDirectory for InMemoryDirectory {
    async fn roles_for_user(&self, user_id: UserId) -> Result<Vec<Role>, DirectoryError> {
        Ok(self.roles_by_user.get(&user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_admin_authenticates() {
        let directory = InMemoryDirectory::seeded();
        let identity = directory.verify_credentials("admin", "admin").await.unwrap();
        assert_eq!(identity.id, UserId::new(1));
        assert_eq!(identity.email, "admin");
    }

    #[tokio::test]
    async fn email_lookup_is_case_folded() {
        let directory = InMemoryDirectory::seeded();
        assert!(directory.verify_credentials("ADMIN", "admin").await.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let directory = InMemoryDirectory::seeded();
        let wrong_password = directory
            .verify_credentials("admin", "nope")
            .await
            .unwrap_err();
        let unknown_user = directory
            .verify_credentials("ghost", "admin")
            .await
            .unwrap_err();
        assert_eq!(wrong_password, unknown_user);
    }

    #[tokio::test]
    async fn user_without_roles_has_empty_role_set() {
        let mut directory = InMemoryDirectory::seeded();
        let lonely = directory.add_user(UserId::new(2), "lonely@example.com", "pw");
        assert!(directory.roles_for_user(lonely).await.unwrap().is_empty());
    }
}
