//! Append-only journal writer.
//!
//! Unlike a telemetry sink, a write-ahead log cannot buffer: `append`
//! flushes every record before returning, and the caller applies the
//! mutation in memory only after `append` succeeds.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::JournalConfig;
use crate::error::JournalResult;
use crate::record::JournalRecord;

pub(crate) const JOURNAL_FILE: &str = "journal.jsonl";

/// Appends journal records to `<data_dir>/journal.jsonl`.
///
/// Opens in append mode, so an existing journal is never truncated.
pub struct JournalWriter {
    path: PathBuf,
    writer: BufWriter<std::fs::File>,
    records_written: usize,
}

impl JournalWriter {
    /// Open (or create) the journal for appending.
    pub fn open(config: &JournalConfig) -> JournalResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let path = Path::new(&config.data_dir).join(JOURNAL_FILE);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        info!(path = %path.display(), "Opened journal (append mode)");

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    /// Append one record and flush it to disk.
    ///
    /// On error the record is not committed and the caller must not
    /// apply the corresponding mutation.
    pub fn append(&mut self, record: &JournalRecord) -> JournalResult<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        self.records_written += 1;
        Ok(())
    }

    /// Records appended by this writer instance.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!(?e, "Failed to flush journal on drop");
        }
    }
}
