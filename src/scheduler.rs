pub(crate) mod daemon;
pub mod jobs;

pub use daemon::spawn_refresh_daemons;
pub use jobs::{JobContext, Scheduler};
