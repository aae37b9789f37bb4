//! Repository for the `project_members` table.

use scrumboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::project_member::ProjectMember;

/// Column list for `project_members` queries.
const COLUMNS: &str = "id, project_id, user_id, display_name, role_type, created_at, updated_at";

/// Lookups of a user's membership within a project.
pub struct ProjectMemberRepo;

impl ProjectMemberRepo {
    /// Find `user_id`'s membership row in `project_id`, if any.
    pub async fn find_for_user(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<ProjectMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_members WHERE project_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
