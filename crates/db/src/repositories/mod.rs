//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod event_repo;
pub mod project_member_repo;
pub mod sprint_repo;
pub mod user_repo;

pub use event_repo::EventRepo;
pub use project_member_repo::ProjectMemberRepo;
pub use sprint_repo::SprintRepo;
pub use user_repo::UserRepo;
