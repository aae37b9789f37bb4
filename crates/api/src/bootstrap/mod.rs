//! Entering a sprint's retrospective: join the stored session or provision
//! a new one and persist its URL onto the sprint.
//!
//! The sprint store and the session substrate are traits so the workflow
//! can be driven against fakes in tests; [`store::PgSprintStore`] and
//! [`RoomRegistry`](crate::rooms::RoomRegistry) are the production
//! implementations.

pub mod store;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use scrumboard_core::error::CoreError;
use scrumboard_core::retrospective::bootstrap::{
    absolute_url, plan_entry, retrospective_path_from_join_url, EntryPlan,
};
use scrumboard_core::roles::Role;
use scrumboard_core::types::DbId;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::{AppError, AppResult};
use crate::rooms::RoomRegistry;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Where sprints keep their retrospective URL.
#[async_trait]
pub trait SprintStore: Send + Sync {
    /// The stored URL, `None` if no session was provisioned yet.
    /// Fails with `NotFound` for an unknown sprint.
    async fn retrospective_url(&self, sprint_id: DbId) -> AppResult<Option<String>>;

    /// Store `url` unless the sprint already has one, and return whichever
    /// URL the sprint ends up with.
    async fn set_retrospective_url(&self, sprint_id: DbId, url: &str) -> AppResult<String>;
}

/// Something that can create realtime sessions.
#[async_trait]
pub trait SessionProvisioner: Send + Sync {
    /// Start a session. The channel yields its join URL once published.
    async fn create_session(&self) -> watch::Receiver<Option<String>>;
}

#[async_trait]
impl SessionProvisioner for RoomRegistry {
    async fn create_session(&self) -> watch::Receiver<Option<String>> {
        RoomRegistry::create_session(self).await
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Where the caller should go next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapOutcome {
    /// Absolute URL of the retrospective page.
    pub navigate_to: String,
    /// Path stored on the sprint.
    pub retrospective_url: String,
    /// `true` if this call created the session.
    pub provisioned: bool,
}

// ---------------------------------------------------------------------------
// SessionBootstrap
// ---------------------------------------------------------------------------

pub struct SessionBootstrap {
    sprints: Arc<dyn SprintStore>,
    provisioner: Arc<dyn SessionProvisioner>,
    public_base_url: String,
    /// `None` sets no bound of its own; over HTTP the router's request
    /// timeout still applies and drops the wait with a 408.
    provision_timeout: Option<Duration>,
    /// Sprints with a provisioning in progress.
    in_flight: Mutex<HashSet<DbId>>,
}

/// Clears a sprint's in-progress flag when dropped, on every exit path.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<DbId>>,
    sprint_id: DbId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.sprint_id);
    }
}

impl SessionBootstrap {
    pub fn new(
        sprints: Arc<dyn SprintStore>,
        provisioner: Arc<dyn SessionProvisioner>,
        public_base_url: impl Into<String>,
        provision_timeout: Option<Duration>,
    ) -> Self {
        Self {
            sprints,
            provisioner,
            public_base_url: public_base_url.into(),
            provision_timeout,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Enter the retrospective of `sprint_id` with the caller's `role`.
    ///
    /// Joins the stored session when there is one. Otherwise a Scrum master
    /// provisions a session, waits for its join URL, stores the rewritten
    /// path on the sprint, and is sent there; anyone else gets `Forbidden`.
    pub async fn enter(&self, sprint_id: DbId, role: Role) -> AppResult<BootstrapOutcome> {
        let existing = self.sprints.retrospective_url(sprint_id).await?;

        match plan_entry(role, existing.as_deref()) {
            EntryPlan::Join(path) => Ok(self.outcome(path, false)),
            EntryPlan::Unavailable => Err(CoreError::Forbidden(
                "The retrospective has not been started yet; ask the Scrum master to start it"
                    .into(),
            )
            .into()),
            EntryPlan::Provision => self.provision(sprint_id).await,
        }
    }

    /// Whether a provisioning for `sprint_id` is currently running.
    pub fn is_provisioning(&self, sprint_id: DbId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&sprint_id)
    }

    async fn provision(&self, sprint_id: DbId) -> AppResult<BootstrapOutcome> {
        let _guard = self.claim(sprint_id)?;

        let mut join_urls = self.provisioner.create_session().await;
        let join_url = self.await_join_url(&mut join_urls).await?;

        let path = retrospective_path_from_join_url(&join_url).ok_or_else(|| {
            AppError::InternalError(format!("Join URL has no retrospective route: {join_url}"))
        })?;

        let stored = self
            .sprints
            .set_retrospective_url(sprint_id, &path)
            .await
            .inspect_err(|e| {
                tracing::error!(sprint_id, error = %e, "Failed to store retrospective URL");
            })?;

        let provisioned = stored == path;
        if provisioned {
            tracing::info!(sprint_id, retrospective_url = %stored, "Retrospective session provisioned");
        } else {
            tracing::warn!(sprint_id, "Sprint already had a retrospective URL, joining it instead");
        }
        Ok(self.outcome(stored, provisioned))
    }

    fn claim(&self, sprint_id: DbId) -> AppResult<InFlightGuard<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(sprint_id) {
            return Err(CoreError::Conflict(format!(
                "A retrospective session for sprint {sprint_id} is already being created"
            ))
            .into());
        }
        Ok(InFlightGuard {
            in_flight: &self.in_flight,
            sprint_id,
        })
    }

    async fn await_join_url(
        &self,
        join_urls: &mut watch::Receiver<Option<String>>,
    ) -> AppResult<String> {
        let published = match self.provision_timeout {
            Some(limit) => tokio::time::timeout(limit, join_urls.wait_for(Option::is_some))
                .await
                .map_err(|_| {
                    CoreError::Unavailable(format!(
                        "No join URL for the new session within {}s",
                        limit.as_secs()
                    ))
                })?
                .map(|url| (*url).clone()),
            None => join_urls
                .wait_for(Option::is_some)
                .await
                .map(|url| (*url).clone()),
        };

        published
            .ok()
            .flatten()
            .ok_or_else(|| {
                CoreError::Unavailable("The session closed before publishing a join URL".into())
                    .into()
            })
    }

    fn outcome(&self, path: String, provisioned: bool) -> BootstrapOutcome {
        BootstrapOutcome {
            navigate_to: absolute_url(&self.public_base_url, &path),
            retrospective_url: path,
            provisioned,
        }
    }
}
