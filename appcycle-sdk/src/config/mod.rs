//! Configuration types for lifecycle dispatch.
//!
//! These are the validated values the dispatcher runs with. Reading them from
//! files is the host's job.

mod definition;
mod dispatcher;

pub use definition::{AppConfigPage, AppDefinition};
pub use dispatcher::{DEFAULT_CLOCK_SKEW_SECS, DEFAULT_KEYSERVER_URL, DispatcherConfig};
