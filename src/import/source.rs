use crate::error::InputError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Position of the channel URL in each row (Takeout layout: id, url, title).
pub const CHANNEL_URL_COLUMN: usize = 1;

/// One input row. Index 0 is the header row; data rows count from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRecord {
    pub index: usize,
    pub channel_ref: String,
}

impl SubscriptionRecord {
    pub fn new(index: usize, channel_ref: impl Into<String>) -> Self {
        Self {
            index,
            channel_ref: channel_ref.into(),
        }
    }
}

/// The "read all rows" capability. A failure here is fatal to the whole run.
pub trait RecordSource: Send + Sync {
    fn read_all(&self) -> Result<Vec<SubscriptionRecord>, InputError>;
}

/// Comma-separated file with a header row; every row must have the same number of fields.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvRecordSource {
    fn read_all(&self) -> Result<Vec<SubscriptionRecord>, InputError> {
        let file = std::fs::File::open(&self.path).map_err(|source| InputError::Open {
            path: self.path.clone(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_reader(file);

        let records = reader
            .records()
            .enumerate()
            .map(|(index, row)| {
                let row = row.map_err(|source| InputError::Parse {
                    path: self.path.clone(),
                    source,
                })?;
                let channel_ref = row.get(CHANNEL_URL_COLUMN).unwrap_or_default();
                Ok(SubscriptionRecord::new(index, channel_ref))
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        debug!(path = %self.path.display(), rows = records.len(), "input file read");
        Ok(records)
    }
}
