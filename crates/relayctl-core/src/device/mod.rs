//! Device communication layer.
//!
//! Provides bounded HTTP exchanges against individual relay devices.

pub mod client;
