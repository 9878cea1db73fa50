//! Protocol layer for device communication.
//!
//! This module maps relay actions to the devices' HTTP endpoints and
//! normalizes their mixed JSON/plain-text responses.

pub mod commands;
pub mod response;
