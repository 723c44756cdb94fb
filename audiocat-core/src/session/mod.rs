//! Polling sessions over the device capability traits.
//!
//! Everything here is single-threaded: blocking operations are explicit
//! poll loops that sleep [`POLL_INTERVAL`] between attempts.

use std::time::Duration;

use crate::models::error::AudioError;

pub mod capture;
pub mod flow;
pub mod stream;

/// Sleep between device polls in every blocking loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Log a failed device call before handing it back to the caller.
pub(crate) fn logged<T>(result: Result<T, AudioError>) -> Result<T, AudioError> {
    result.inspect_err(|e| log::error!("{e}"))
}
