//! Product country backfill configuration.

use serde::{Deserialize, Serialize};

/// Settings for the `backfill countries` maintenance job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillConfig {
    /// Countries assigned to products without one.
    #[serde(default = "default_countries")]
    pub countries: Vec<String>,
    /// Products updated per transaction.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Retries per batch after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            countries: default_countries(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

fn default_countries() -> Vec<String> {
    [
        "Algeria",
        "Bahrain",
        "Comoros",
        "Djibouti",
        "Egypt",
        "Iraq",
        "Jordan",
        "Kuwait",
        "Lebanon",
        "Libya",
        "Mauritania",
        "Morocco",
        "Oman",
        "Palestine",
        "Qatar",
        "Saudi Arabia",
        "Somalia",
        "Sudan",
        "Syria",
        "Tunisia",
        "United Arab Emirates",
        "Yemen",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

fn default_batch_size() -> usize {
    500
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2000
}
