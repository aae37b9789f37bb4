//! Scrumboard API server library.
//!
//! Exposes config, state, error handling, routes, the retrospective rooms and
//! session bootstrap so integration tests and the binary entrypoint can both
//! reach them.

pub mod auth;
pub mod background;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod rooms;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
