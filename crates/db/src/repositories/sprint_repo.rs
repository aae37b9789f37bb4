//! Repository for the `sprints` table.

use scrumboard_core::retrospective::bootstrap::SESSION_NAME_PARAM;
use scrumboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::sprint::Sprint;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, name, description, start_date, end_date, goal, \
                       capacity, status, retrospective_url, created_at, updated_at";

/// Read access to sprints plus the one write the retrospective owns.
pub struct SprintRepo;

impl SprintRepo {
    /// Find a sprint by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Sprint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sprints WHERE id = $1");
        sqlx::query_as::<_, Sprint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Sprints whose stored retrospective URL mentions session `name`.
    ///
    /// A substring match; callers compare the full credentials.
    pub async fn find_by_retrospective_session(
        pool: &PgPool,
        name: &str,
    ) -> Result<Vec<Sprint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sprints \
             WHERE retrospective_url IS NOT NULL \
             AND position($1 IN retrospective_url) > 0"
        );
        sqlx::query_as::<_, Sprint>(&query)
            .bind(format!("{SESSION_NAME_PARAM}={name}"))
            .fetch_all(pool)
            .await
    }

    /// Store the retrospective path on a sprint that does not have one yet.
    ///
    /// Returns the updated row, or `None` if the sprint does not exist or a
    /// URL was already stored (the first provisioning wins).
    pub async fn set_retrospective_url(
        pool: &PgPool,
        id: DbId,
        url: &str,
    ) -> Result<Option<Sprint>, sqlx::Error> {
        let query = format!(
            "UPDATE sprints SET retrospective_url = $2 \
             WHERE id = $1 AND retrospective_url IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sprint>(&query)
            .bind(id)
            .bind(url)
            .fetch_optional(pool)
            .await
    }
}
