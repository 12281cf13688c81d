//! Persistence collaborator for retry records.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::PaymentRecord;

/// Failures raised by a record store. The charge flow passes them through.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("record store csv failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Append-oriented storage of retry records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<PaymentRecord>, StoreError>;

    async fn save(&self, record: PaymentRecord) -> Result<(), StoreError>;
}

/// Records kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<Vec<PaymentRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_all(&self) -> Result<Vec<PaymentRecord>, StoreError> {
        Ok(self.records.lock().await.clone())
    }

    async fn save(&self, record: PaymentRecord) -> Result<(), StoreError> {
        self.records.lock().await.push(record);
        Ok(())
    }
}

/// Records appended to a csv file, one row per record.
///
/// The header is written when the file is first created.
#[derive(Debug)]
pub struct CsvRecordStore {
    path: PathBuf,
    // keeps readers off half-written rows
    io_lock: Mutex<()>,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(path: &Path) -> Result<Vec<PaymentRecord>, StoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(path)?;
        reader
            .deserialize::<PaymentRecord>()
            .map(|row| row.map_err(StoreError::from))
            .collect()
    }

    fn append(path: &Path, record: &PaymentRecord) -> Result<(), StoreError> {
        let is_new = path.metadata().map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for CsvRecordStore {
    async fn find_all(&self) -> Result<Vec<PaymentRecord>, StoreError> {
        let _guard = self.io_lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::read_all(&path))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }

    async fn save(&self, record: PaymentRecord) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::append(&path, &record))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}
