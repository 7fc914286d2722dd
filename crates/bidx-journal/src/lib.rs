//! Write-ahead journal for the bidx auction engine.
//!
//! Every mutation is appended here before it is applied in memory, so a
//! restarted coordinator resumes with exactly the version, sequence, and
//! status it last committed. JSON Lines format (.jsonl) for robustness:
//! - Each line is a complete JSON object
//! - Partial file corruption only affects individual lines
//! - An interrupted append leaves a torn tail that replay can drop

pub mod config;
pub mod error;
pub mod reader;
pub mod record;
pub mod writer;

pub use config::JournalConfig;
pub use error::{JournalError, JournalResult};
pub use reader::JournalReader;
pub use record::JournalRecord;
pub use writer::JournalWriter;
