//! Project membership model.

use scrumboard_core::roles::Role;
use scrumboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `project_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectMember {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    /// Name shown for this member within the project.
    pub display_name: Option<String>,
    /// Stored role string, e.g. `"SCRUM_MASTER"`.
    pub role_type: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectMember {
    /// Parse the stored role string.
    pub fn role(&self) -> Result<Role, String> {
        self.role_type.parse()
    }
}
