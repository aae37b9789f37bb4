//! Scrumboard domain events.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the event envelope published by the API.
//! - [`EventPersistence`]: background subscriber that writes every event
//!   to the `events` table.
//! - [`names`]: the event names seeded in `event_types`.

pub mod bus;
pub mod names;
pub mod persistence;

pub use bus::{DomainEvent, EventBus};
pub use persistence::EventPersistence;
