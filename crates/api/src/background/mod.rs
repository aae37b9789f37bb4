//! Background tasks.
//!
//! Each submodule provides a long-running async function meant to be
//! spawned with `tokio::spawn`; all stop when their [`CancellationToken`]
//! is cancelled.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod room_reaper;
