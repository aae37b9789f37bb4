//! User account model.
//!
//! Accounts are created by the external identity provider; this table only
//! mirrors the fields the board needs.

use scrumboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
