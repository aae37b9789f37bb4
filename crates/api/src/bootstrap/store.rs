//! [`SprintStore`] backed by the `sprints` table.

use async_trait::async_trait;
use scrumboard_core::error::CoreError;
use scrumboard_core::types::DbId;
use scrumboard_db::repositories::SprintRepo;
use scrumboard_db::DbPool;

use super::SprintStore;
use crate::error::{AppError, AppResult};

pub struct PgSprintStore {
    pool: DbPool,
}

impl PgSprintStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SprintStore for PgSprintStore {
    async fn retrospective_url(&self, sprint_id: DbId) -> AppResult<Option<String>> {
        let sprint = SprintRepo::find_by_id(&self.pool, sprint_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Sprint",
                id: sprint_id,
            })?;
        Ok(sprint.retrospective_url)
    }

    async fn set_retrospective_url(&self, sprint_id: DbId, url: &str) -> AppResult<String> {
        if let Some(sprint) = SprintRepo::set_retrospective_url(&self.pool, sprint_id, url).await? {
            return Ok(sprint.retrospective_url.unwrap_or_else(|| url.to_string()));
        }

        // Lost the race to another writer, or the sprint is gone.
        self.retrospective_url(sprint_id).await?.ok_or_else(|| {
            AppError::InternalError(format!(
                "Sprint {sprint_id} refused the retrospective URL but has none stored"
            ))
        })
    }
}
