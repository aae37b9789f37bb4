//! Domain types shared by every scrumboard crate.
//!
//! This crate has no internal dependencies: the retrospective board model,
//! the reaction state machine, the realtime wire protocol and the session
//! bootstrap rules all live here so that the API, the repositories and the
//! tests agree on one definition.

pub mod error;
pub mod retrospective;
pub mod roles;
pub mod types;
