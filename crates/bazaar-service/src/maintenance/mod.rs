//! Offline maintenance jobs run from the CLI.

pub mod backfill;
pub mod retry;

pub use backfill::{BackfillReport, CountryBackfill};
pub use retry::retry_with_delay;
