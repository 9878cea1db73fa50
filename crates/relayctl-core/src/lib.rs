//! Core library for the relayctl control panel.
//!
//! Everything needed to run a panel over ESP relay devices lives here: the
//! device registry, the HTTP exchange client, the command dispatcher, the
//! periodic refresh scheduler, the activity log, and roster persistence.
//! Front ends (the bundled CLI, or any embedder) plug in through the traits
//! in [`hooks`] and drive the [`dispatcher::Dispatcher`].

pub mod activity;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod hooks;
pub mod protocol;
pub mod registry;
pub mod scheduler;
pub mod storage;

pub use error::{CoreError, Result};
