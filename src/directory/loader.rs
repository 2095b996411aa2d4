use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{error, info, warn};
use serde::Serialize;
use tokio::sync::Mutex;
use url::Url;

use super::mapper;
use super::store::{RecordStore, SourceKind};
use crate::errors::SourceError;
use crate::models::employee::EmployeeRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Excel { path: PathBuf },
    Sheets { url: Url },
    Csv { path: PathBuf },
}

impl DataSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            DataSource::Excel { .. } => SourceKind::Excel,
            DataSource::Sheets { .. } => SourceKind::Sheets,
            DataSource::Csv { .. } => SourceKind::Csv,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReloadOutcome {
    /// Fresh records from the configured source were swapped in.
    Loaded,
    /// The source failed and the existing snapshot was kept.
    KeptPrevious,
    /// The source failed on an empty store and the fallback file was loaded.
    Fallback,
    /// Neither the source nor the fallback produced any records.
    Empty,
}

#[derive(Serialize, Debug, Clone)]
pub struct ReloadReport {
    pub outcome: ReloadOutcome,
    pub source: SourceKind,
    pub count: usize,
    pub error: Option<String>,
}

pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 20 * 1024 * 1024;

/// Fetches employee data from the configured source and swaps it into a
/// `RecordStore`. Source failures never empty a populated store.
pub struct DirectoryLoader {
    source: DataSource,
    fallback_path: Option<PathBuf>,
    client: reqwest::Client,
    max_upload_bytes: usize,
    reload_lock: Mutex<()>,
}

impl DirectoryLoader {
    pub fn new(
        source: DataSource,
        fallback_path: Option<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(DirectoryLoader {
            source,
            fallback_path,
            client,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_SIZE,
            reload_lock: Mutex::new(()),
        })
    }

    /// Caps the size of files accepted by `load_upload`.
    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn upload_limit(&self) -> usize {
        self.max_upload_bytes
    }

    /// Reads and maps the configured source without touching any store.
    pub async fn fetch(&self) -> Result<Vec<EmployeeRecord>, SourceError> {
        let records = match &self.source {
            DataSource::Excel { path } => read_data_file(path).await?,
            DataSource::Csv { path } => {
                let text = read_file(path).await?;
                mapper::parse_csv(&String::from_utf8_lossy(&text))?
            }
            DataSource::Sheets { url } => {
                let text = self
                    .client
                    .get(url.clone())
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?;
                mapper::parse_csv(&text)?
            }
        };
        if records.is_empty() {
            return Err(SourceError::NoRecords);
        }
        Ok(records)
    }

    /// Loads the configured source into `store`. At most one reload runs at a time.
    pub async fn reload(&self, store: &RecordStore) -> ReloadReport {
        let _guard = self.reload_lock.lock().await;
        let kind = self.source.kind();

        let err = match self.fetch().await {
            Ok(records) => {
                let count = records.len();
                let version = store.replace(records, kind);
                info!("Loaded {} employees from {} (version {})", count, kind.as_str(), version);
                return ReloadReport {
                    outcome: ReloadOutcome::Loaded,
                    source: kind,
                    count,
                    error: None,
                };
            }
            Err(err) => err,
        };

        let current = store.snapshot();
        if !current.records.is_empty() {
            warn!(
                "Reload from {} failed ({}); keeping {} employees from {}",
                kind.as_str(),
                err,
                current.records.len(),
                current.source.as_str()
            );
            return ReloadReport {
                outcome: ReloadOutcome::KeptPrevious,
                source: current.source,
                count: current.records.len(),
                error: Some(err.to_string()),
            };
        }

        if let Some(path) = &self.fallback_path {
            match read_data_file(path).await {
                Ok(records) if !records.is_empty() => {
                    let count = records.len();
                    store.replace(records, SourceKind::Fallback);
                    warn!(
                        "Reload from {} failed ({}); loaded {} sample employees from {}",
                        kind.as_str(),
                        err,
                        count,
                        path.display()
                    );
                    return ReloadReport {
                        outcome: ReloadOutcome::Fallback,
                        source: SourceKind::Fallback,
                        count,
                        error: Some(err.to_string()),
                    };
                }
                Ok(_) => error!("Fallback data {} contains no valid employees", path.display()),
                Err(fallback_err) => {
                    error!("Fallback data {} unusable: {}", path.display(), fallback_err)
                }
            }
        }

        error!(
            "Reload from {} failed ({}) and no fallback data is available",
            kind.as_str(),
            err
        );
        ReloadReport {
            outcome: ReloadOutcome::Empty,
            source: SourceKind::None,
            count: 0,
            error: Some(err.to_string()),
        }
    }

    /// Replaces the store with an uploaded export. Nothing changes if the
    /// upload holds no valid rows.
    pub async fn load_upload(
        &self,
        store: &RecordStore,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ReloadReport, SourceError> {
        let _guard = self.reload_lock.lock().await;
        let records = parse_blocking(file_name.to_string(), bytes.to_vec()).await?;
        if records.is_empty() {
            return Err(SourceError::NoRecords);
        }
        let count = records.len();
        store.replace(records, SourceKind::Upload);
        info!("Loaded {} employees from uploaded file {}", count, file_name);
        Ok(ReloadReport {
            outcome: ReloadOutcome::Loaded,
            source: SourceKind::Upload,
            count,
            error: None,
        })
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, SourceError> {
    tokio::fs::read(path).await.map_err(|source| SourceError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

async fn read_data_file(path: &Path) -> Result<Vec<EmployeeRecord>, SourceError> {
    let bytes = read_file(path).await?;
    parse_blocking(path.to_string_lossy().into_owned(), bytes).await
}

/// Workbook decoding is CPU-bound; keep it off the async workers.
async fn parse_blocking(name: String, bytes: Vec<u8>) -> Result<Vec<EmployeeRecord>, SourceError> {
    tokio::task::spawn_blocking(move || parse_by_name(&name, &bytes)).await?
}

/// Picks the parser from the file extension.
pub fn parse_by_name(file_name: &str, bytes: &[u8]) -> Result<Vec<EmployeeRecord>, SourceError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => mapper::parse_xlsx(bytes),
        Some("csv") | Some("txt") => mapper::parse_csv(&String::from_utf8_lossy(bytes)),
        _ => Err(SourceError::UnsupportedFormat(file_name.to_string())),
    }
}
