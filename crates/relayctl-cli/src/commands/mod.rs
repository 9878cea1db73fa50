//! Command implementations.

pub mod control;
pub mod roster;
pub mod status;
pub mod sync;
pub mod watch;

pub use control::{run_off, run_on, run_toggle};
pub use roster::{run_add, run_list, run_remove};
pub use status::{run_status, run_test};
pub use sync::run_sync;
pub use watch::run_watch;
