//! Project role names and the gates derived from them.
//!
//! Role strings must match the `role_type` values stored in
//! `project_members` (see `20260301000002_create_project_members.sql`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_SCRUM_MASTER: &str = "SCRUM_MASTER";
pub const ROLE_DEVELOPER: &str = "DEVELOPER";
pub const ROLE_PRODUCT_OWNER: &str = "PRODUCT_OWNER";

/// A member's role within one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    ScrumMaster,
    Developer,
    ProductOwner,
}

impl Role {
    /// The stored string form of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::ScrumMaster => ROLE_SCRUM_MASTER,
            Role::Developer => ROLE_DEVELOPER,
            Role::ProductOwner => ROLE_PRODUCT_OWNER,
        }
    }

    /// Only the facilitator may provision a new retrospective session.
    pub fn can_provision_retrospective(self) -> bool {
        match self {
            Role::ScrumMaster => true,
            Role::Developer | Role::ProductOwner => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_SCRUM_MASTER => Ok(Role::ScrumMaster),
            ROLE_DEVELOPER => Ok(Role::Developer),
            ROLE_PRODUCT_OWNER => Ok(Role::ProductOwner),
            other => Err(format!(
                "Unknown role '{other}'. Must be one of: {ROLE_SCRUM_MASTER}, {ROLE_DEVELOPER}, {ROLE_PRODUCT_OWNER}"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_roles() {
        assert_eq!("SCRUM_MASTER".parse::<Role>(), Ok(Role::ScrumMaster));
        assert_eq!("DEVELOPER".parse::<Role>(), Ok(Role::Developer));
        assert_eq!("PRODUCT_OWNER".parse::<Role>(), Ok(Role::ProductOwner));
    }

    #[test]
    fn test_parse_rejects_unknown_and_wrong_case() {
        assert!("scrum_master".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        let err = "ADMIN".parse::<Role>().unwrap_err();
        assert!(err.contains("Unknown role"));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for role in [Role::ScrumMaster, Role::Developer, Role::ProductOwner] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn test_only_scrum_master_provisions() {
        assert!(Role::ScrumMaster.can_provision_retrospective());
        assert!(!Role::Developer.can_provision_retrospective());
        assert!(!Role::ProductOwner.can_provision_retrospective());
    }

    #[test]
    fn test_serde_uses_stored_strings() {
        let json = serde_json::to_string(&Role::ProductOwner).unwrap();
        assert_eq!(json, r#""PRODUCT_OWNER""#);
    }
}
