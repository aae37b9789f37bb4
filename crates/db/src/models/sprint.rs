//! Sprint entity model.
//!
//! Sprint CRUD belongs to the planning views; this crate only reads sprints
//! and writes their `retrospective_url`.

use chrono::NaiveDate;
use scrumboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A sprint row from the `sprints` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sprint {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub goal: Option<String>,
    pub capacity: i32,
    /// One of `Planned`, `In Progress`, `Completed`.
    pub status: String,
    /// Path of the sprint's retrospective session, set once when provisioned.
    pub retrospective_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
