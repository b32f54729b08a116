//! Day-partitioned CSV storage.
//!
//! Every calendar day (UTC) gets its own file under the store root, named
//! `DD_MM_YYYY.<ext>`. Files are only ever appended to. Queries re-read the
//! whole partition; there is no cache and no index.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::codec;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::store::{filter_exceeding, find_extremes, RecordStore, SpeedExtremes};

/// Default partition file extension.
pub const DEFAULT_EXTENSION: &str = "csv";

/// Record store backed by one CSV file per day.
///
/// All writers sharing a lock are serialized, whichever partition they
/// target. Clones share the lock of the original. Readers never lock: a row
/// is appended with a single write, so a concurrent reader sees it either
/// whole or not at all.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory holding the partition files.
    root: PathBuf,
    /// Partition file extension, without the dot.
    extension: String,
    /// Serializes the open-append-close sequence of every save.
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open a store rooted at `root` with its own write lock.
    ///
    /// Creates the root directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::with_lock(root, Arc::new(Mutex::new(())))
    }

    /// Open a store rooted at `root` that shares `write_lock` with other
    /// stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn with_lock(root: impl AsRef<Path>, write_lock: Arc<Mutex<()>>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            std::fs::create_dir_all(&root).map_err(|source| Error::DirectoryCreate {
                path: root.clone(),
                source,
            })?;
        }

        info!("Record store opened at {}", root.display());
        Ok(Self {
            root,
            extension: DEFAULT_EXTENSION.to_string(),
            write_lock,
        })
    }

    /// Use `extension` for partition files instead of [`DEFAULT_EXTENSION`].
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Get the directory holding the partitions.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the lock serializing writes to this store.
    #[must_use]
    pub fn write_lock(&self) -> &Arc<Mutex<()>> {
        &self.write_lock
    }

    /// Path of the partition file for `day`.
    #[must_use]
    pub fn partition_path(&self, day: NaiveDate) -> PathBuf {
        self.root.join(format!("{}.{}", codec::day_key(day), self.extension))
    }

    /// Decode every row of the partition for `day`, in file order.
    fn scan(&self, day: NaiveDate) -> Result<impl Iterator<Item = Result<Record>>> {
        let path = self.partition_path(day);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::PartitionNotFound { day });
            }
            Err(err) => return Err(err.into()),
        };
        debug!("Scanning partition {}", path.display());

        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        Ok(reader.into_records().zip(1_u64..).map(|(row, index)| {
            let fields = row.map_err(|err| {
                let line = err.position().map_or(index, csv::Position::line);
                Error::from_csv(err, line)
            })?;
            let line = fields.position().map_or(index, csv::Position::line);
            codec::decode_fields(&fields).map_err(|source| Error::Format { line, source })
        }))
    }
}

impl RecordStore for FileStore {
    fn save(&self, record: &Record) -> Result<String> {
        let path = self.partition_path(record.day());
        let line = codec::encode_line(record)?;

        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(&line)?;

        debug!("Saved record {} to {}", record.id(), path.display());
        Ok(record.id().to_string())
    }

    fn query_exceeding(&self, day: NaiveDate, threshold: f64) -> Result<Vec<Record>> {
        let records = filter_exceeding(day, threshold, self.scan(day)?)?;
        debug!(
            "Found {} records on {} at or above {}",
            records.len(),
            day,
            threshold
        );
        Ok(records)
    }

    fn query_minmax(&self, day: NaiveDate) -> Result<SpeedExtremes> {
        find_extremes(day, self.scan(day)?)
    }
}
