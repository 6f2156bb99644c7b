//! Result aggregator
//!
//! Owns the ordered collection of completed-request records for a batch run
//! and keeps the on-disk summary current: every append rewrites the full
//! JSON document, so a crash mid-batch loses at most the request in flight.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::coach::ResultRecord;

/// Aggregate statistics over a batch.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    /// Number of requests processed (one record each)
    pub total_attempts: usize,
    pub successful: usize,
    pub failed: usize,
    /// Mean retry count across all records
    pub retry_rate: f64,
}

#[derive(Serialize)]
struct BatchDocument<'a> {
    timestamp: String,
    results: &'a [ResultRecord],
    summary: Summary,
}

/// Accumulates records in input order and persists after every append.
pub struct ResultStore {
    path: PathBuf,
    records: Vec<ResultRecord>,
}

impl ResultStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: Vec::new(),
        }
    }

    /// Appends one record and flushes the whole collection to disk.
    pub fn append(&mut self, record: ResultRecord) -> Result<()> {
        self.records.push(record);
        self.flush()
    }

    pub fn summary(&self) -> Summary {
        let successful = self.records.iter().filter(|r| r.passed()).count();
        let failed = self.records.len() - successful;
        let retry_rate = if self.records.is_empty() {
            0.0
        } else {
            let total: u32 = self.records.iter().map(|r| r.outcome.retry_count).sum();
            f64::from(total) / self.records.len() as f64
        };

        Summary {
            total_attempts: self.records.len(),
            successful,
            failed,
            retry_rate,
        }
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    fn flush(&self) -> Result<()> {
        let document = BatchDocument {
            timestamp: Utc::now().to_rfc3339(),
            results: &self.records,
            summary: self.summary(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let content =
            serde_json::to_string_pretty(&document).context("Failed to serialize results")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::{Attempt, AttemptStatus, FinalStatus, Outcome};

    fn record(passed: bool, retry_count: u32) -> ResultRecord {
        let status = if passed {
            AttemptStatus::Passed
        } else {
            AttemptStatus::TestFailed
        };
        ResultRecord {
            request: "some request".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            attempts: vec![Attempt {
                ordinal: retry_count,
                status,
                kind: None,
                diagnostic: String::new(),
                artifact: None,
            }],
            outcome: Outcome {
                final_status: if passed {
                    FinalStatus::Passed
                } else {
                    FinalStatus::Failed
                },
                retry_count,
            },
        }
    }

    #[test]
    fn test_flush_after_every_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let mut store = ResultStore::new(path.clone());

        store.append(record(true, 0)).unwrap();
        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["results"].as_array().unwrap().len(), 1);

        store.append(record(false, 1)).unwrap();
        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_summary_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ResultStore::new(dir.path().join("results.json"));

        // Two first-attempt passes and one exhausted request.
        store.append(record(true, 0)).unwrap();
        store.append(record(true, 0)).unwrap();
        store.append(record(false, 1)).unwrap();

        let summary = store.summary();
        assert_eq!(summary.total_attempts, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert!((summary.retry_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let mut store = ResultStore::new(path.clone());
        store.append(record(true, 0)).unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(doc["timestamp"].is_string());
        assert_eq!(doc["summary"]["successful"], 1);
        let first = &doc["results"][0];
        assert_eq!(first["final_status"], "passed");
        assert_eq!(first["retry_count"], 0);
        assert_eq!(first["attempts"][0]["status"], "passed");
    }

    #[test]
    fn test_empty_store_summary() {
        let store = ResultStore::new(PathBuf::from("/tmp/unused.json"));
        let summary = store.summary();
        assert_eq!(summary.total_attempts, 0);
        assert_eq!(summary.retry_rate, 0.0);
    }
}
