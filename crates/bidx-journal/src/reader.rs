//! Journal replay.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::JournalConfig;
use crate::error::{JournalError, JournalResult};
use crate::record::JournalRecord;
use crate::writer::JOURNAL_FILE;

/// Reads the journal back in append order.
pub struct JournalReader {
    path: PathBuf,
}

impl JournalReader {
    #[must_use]
    pub fn open(config: &JournalConfig) -> Self {
        Self {
            path: Path::new(&config.data_dir).join(JOURNAL_FILE),
        }
    }

    /// Replay every committed record.
    ///
    /// A missing file is an empty journal (first boot). A line that fails
    /// to parse is tolerated only at the tail: it is the residue of an
    /// append interrupted before it committed, and the mutation it would
    /// have described was never applied. Anywhere else it is corruption.
    pub fn replay(&self) -> JournalResult<Vec<JournalRecord>> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No journal file, starting empty");
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let lines: Vec<String> = BufReader::new(file).lines().collect::<Result<_, _>>()?;

        let mut records = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalRecord>(line) {
                Ok(record) => records.push(record),
                Err(source) if i == lines.len() - 1 => {
                    warn!(line = i + 1, %source, "Dropping torn journal tail");
                    break;
                }
                Err(source) => {
                    return Err(JournalError::Corrupt {
                        line: i + 1,
                        source,
                    });
                }
            }
        }

        info!(
            path = %self.path.display(),
            records = records.len(),
            "Journal replayed"
        );
        Ok(records)
    }

    /// Path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::JournalWriter;
    use bidx_core::{AuctionId, IncrementPolicy, ListingTerms, Money, SellerId};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> JournalConfig {
        JournalConfig {
            data_dir: dir.path().to_str().unwrap().to_string(),
        }
    }

    fn created(n: u32) -> JournalRecord {
        JournalRecord::AuctionCreated {
            auction_id: AuctionId::from(format!("auc_{n}").as_str()),
            seller_id: SellerId::from("s1"),
            terms: ListingTerms::new(
                Money::new(dec!(1000)),
                None,
                IncrementPolicy::absolute(Money::new(dec!(100))),
            ),
            at: Utc.with_ymd_and_hms(2026, 3, 1, n, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_missing_file_is_empty_journal() {
        let dir = TempDir::new().unwrap();
        let records = JournalReader::open(&config(&dir)).replay().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_torn_tail_is_dropped() {
        let dir = TempDir::new().unwrap();
        {
            let mut writer = JournalWriter::open(&config(&dir)).unwrap();
            writer.append(&created(0)).unwrap();
            writer.append(&created(1)).unwrap();
        }
        // Simulate a crash mid-append: half a JSON object, no newline.
        let path = dir.path().join(JOURNAL_FILE);
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap();
        write!(file, "{{\"op\":\"bid_acc").unwrap();

        let records = JournalReader::open(&config(&dir)).replay().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_corrupt_middle_line_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(JOURNAL_FILE);
        {
            let mut writer = JournalWriter::open(&config(&dir)).unwrap();
            writer.append(&created(0)).unwrap();
        }
        {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&path)
                .unwrap();
            writeln!(file, "not json").unwrap();
        }
        {
            let mut writer = JournalWriter::open(&config(&dir)).unwrap();
            writer.append(&created(1)).unwrap();
        }

        let err = JournalReader::open(&config(&dir)).replay().unwrap_err();
        assert!(matches!(err, JournalError::Corrupt { line: 2, .. }));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let dir = TempDir::new().unwrap();
        {
            let mut writer = JournalWriter::open(&config(&dir)).unwrap();
            writer.append(&created(0)).unwrap();
        }
        let path = dir.path().join(JOURNAL_FILE);
        {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&path)
                .unwrap();
            writeln!(file).unwrap();
        }
        {
            let mut writer = JournalWriter::open(&config(&dir)).unwrap();
            writer.append(&created(1)).unwrap();
        }

        let records = JournalReader::open(&config(&dir)).replay().unwrap();
        assert_eq!(records.len(), 2);
    }
}
