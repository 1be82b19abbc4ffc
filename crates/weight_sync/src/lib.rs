//! Daily Garmin Connect to Notion weight sync.
//!
//! [`pipeline::run_sync`] fetches one day of body composition data, looks up the
//! dated row in the Notion database and creates, updates or leaves it alone
//! through [`reconcile::Reconciler`].

pub mod cli;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod reconcile;
mod test_utils;

pub use error::{SyncError, SyncResult};
pub use pipeline::{SyncOptions, SyncReport, run, run_sync};
pub use reconcile::{Outcome, Reconciler, convert, needs_update};
