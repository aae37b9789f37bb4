//! WebSocket transport for retrospective sessions.
//!
//! [`WsManager`] tracks every open socket for heartbeat and shutdown; the
//! per-session fan-out lives in [`crate::rooms`].

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::{retrospective_ws_handler, JoinParams};
pub use heartbeat::start_heartbeat;
pub use manager::{WsManager, WsSender};
