//! The fixed authority vocabulary.
//!
//! An authority is a single named permission (e.g. `USER_VIEW`). Tokens and
//! roles carry authorities as plain strings; this enum is the closed set of
//! names those strings are validated against.

use serde::{Deserialize, Serialize};

use projector_core::{DomainError, DomainResult};

/// A known permission name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Authority {
    UserView,
    UserEdit,
    RoleView,
    RoleEdit,
    RoadmapView,
    RoadmapEdit,
    FeatureView,
    FeatureEdit,
    TaskView,
    TaskEdit,
    FaView,
    FaEdit,
}

impl Authority {
    /// Every authority in the vocabulary.
    pub const ALL: [Authority; 12] = [
        Authority::UserView,
        Authority::UserEdit,
        Authority::RoleView,
        Authority::RoleEdit,
        Authority::RoadmapView,
        Authority::RoadmapEdit,
        Authority::FeatureView,
        Authority::FeatureEdit,
        Authority::TaskView,
        Authority::TaskEdit,
        Authority::FaView,
        Authority::FaEdit,
    ];

    /// The subset of authorities that may be granted to a role through the
    /// role-management surface. The rest of the vocabulary exists for
    /// per-route checks but is not assignable there.
    pub const ASSIGNABLE: [Authority; 4] = [
        Authority::UserView,
        Authority::UserEdit,
        Authority::RoleView,
        Authority::RoleEdit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::UserView => "USER_VIEW",
            Authority::UserEdit => "USER_EDIT",
            Authority::RoleView => "ROLE_VIEW",
            Authority::RoleEdit => "ROLE_EDIT",
            Authority::RoadmapView => "ROADMAP_VIEW",
            Authority::RoadmapEdit => "ROADMAP_EDIT",
            Authority::FeatureView => "FEATURE_VIEW",
            Authority::FeatureEdit => "FEATURE_EDIT",
            Authority::TaskView => "TASK_VIEW",
            Authority::TaskEdit => "TASK_EDIT",
            Authority::FaView => "FA_VIEW",
            Authority::FaEdit => "FA_EDIT",
        }
    }

    /// Look up an authority by its wire name.
    pub fn from_name(name: &str) -> DomainResult<Authority> {
        Authority::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == name)
            .ok_or_else(|| DomainError::validation(format!("unknown authority: {name}")))
    }

    pub fn is_assignable(&self) -> bool {
        Authority::ASSIGNABLE.contains(self)
    }
}

impl core::fmt::Display for Authority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Authority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Authority::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for authority in Authority::ALL {
            assert_eq!(Authority::from_name(authority.as_str()).unwrap(), authority);
        }
    }

    #[test]
    fn serde_form_matches_wire_names() {
        for authority in Authority::ALL {
            let json = serde_json::to_string(&authority).unwrap();
            assert_eq!(json, format!("\"{}\"", authority.as_str()));
            assert_eq!(serde_json::from_str::<Authority>(&json).unwrap(), authority);
        }
    }

    #[test]
    fn unknown_name_rejected() {
        let err = Authority::from_name("USER_DELETE").unwrap_err();
        assert!(err.to_string().contains("USER_DELETE"));
    }

    #[test]
    fn assignable_subset_is_administrative() {
        assert!(Authority::UserEdit.is_assignable());
        assert!(Authority::RoleView.is_assignable());
        assert!(!Authority::RoadmapEdit.is_assignable());
        assert!(!Authority::FaView.is_assignable());
    }
}
