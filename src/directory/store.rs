use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::employee::EmployeeRecord;

/// Where the records of a snapshot came from.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Excel,
    Sheets,
    Csv,
    Upload,
    Fallback,
    /// Nothing has been loaded yet.
    None,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Excel => "excel",
            SourceKind::Sheets => "sheets",
            SourceKind::Csv => "csv",
            SourceKind::Upload => "upload",
            SourceKind::Fallback => "fallback",
            SourceKind::None => "none",
        }
    }
}

/// Immutable view of the directory at one point in time.
#[derive(Debug)]
pub struct Snapshot {
    pub records: Vec<EmployeeRecord>,
    pub version: u64,
    pub source: SourceKind,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn find_by_code(&self, code: &str) -> Option<&EmployeeRecord> {
        self.records.iter().find(|r| r.emp_code == code)
    }
}

/// Process-wide owner of the employee records.
///
/// Writers build a complete `Snapshot` and swap the pointer; the lock is held
/// only for the swap, so readers never observe a partially replaced set.
pub struct RecordStore {
    current: RwLock<Arc<Snapshot>>,
}

impl RecordStore {
    pub fn new() -> Self {
        RecordStore {
            current: RwLock::new(Arc::new(Snapshot {
                records: Vec::new(),
                version: 0,
                source: SourceKind::None,
                loaded_at: Utc::now(),
            })),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            // The guarded value is a single Arc, so a poisoned lock still holds a whole snapshot.
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Swaps in a new record set and returns its version.
    pub fn replace(&self, records: Vec<EmployeeRecord>, source: SourceKind) -> u64 {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let version = guard.version + 1;
        *guard = Arc::new(Snapshot {
            records,
            version,
            source,
            loaded_at: Utc::now(),
        });
        version
    }

    /// Copy of the current records.
    pub fn all(&self) -> Vec<EmployeeRecord> {
        self.snapshot().records.clone()
    }

    pub fn find_by_code(&self, code: &str) -> Option<EmployeeRecord> {
        self.snapshot().find_by_code(code).cloned()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.snapshot().find_by_code(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.snapshot().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.replace(Vec::new(), SourceKind::None);
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}
