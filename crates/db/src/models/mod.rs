//! Domain model structs and DTOs.
//!
//! Each submodule holds a `FromRow` + `Serialize` struct matching one
//! database row.

pub mod event;
pub mod project_member;
pub mod sprint;
pub mod user;
