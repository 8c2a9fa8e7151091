//! Storage provider implementations.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalStorageProvider;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;

/// Reject object keys that could escape their folder.
pub(crate) fn check_segment(kind: &str, value: &str) -> AppResult<()> {
    let bad = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if bad {
        return Err(AppError::validation(format!("Invalid object {kind}: '{value}'")));
    }
    Ok(())
}

/// Join a public base URL and an object key.
pub(crate) fn public_url(base: &str, folder: &str, name: &str) -> String {
    format!("{}/{folder}/{name}", base.trim_end_matches('/'))
}
