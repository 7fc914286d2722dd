//! Journal configuration.

use serde::{Deserialize, Serialize};

/// Where the journal file lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Directory for `journal.jsonl`. Created on open if missing.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}
