use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::Utc;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use super::sink::CompletionSink;
use super::types::{CompletionLog, CompletionRecord, NewCompletion, Review, STORE_VERSION};

/// Completion records kept in a single JSON document on local disk.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the log; a missing file is an empty log
    pub fn load(&self) -> Result<CompletionLog> {
        if !self.path.exists() {
            return Ok(CompletionLog::new());
        }

        let file = File::open(&self.path).with_context(|| {
            format!("Failed to open completion store at {}", self.path.display())
        })?;

        let log: CompletionLog =
            serde_json::from_reader(file).context("Failed to load completion store")?;

        if log.version != STORE_VERSION {
            anyhow::bail!("Unsupported completion store version: {}", log.version);
        }

        Ok(log)
    }

    fn save(&self, log: &CompletionLog) -> Result<()> {
        // Ensure store directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory {}", parent.display())
            })?;
        }

        let mut file = AtomicWriteFile::open(&self.path).with_context(|| {
            format!("Failed to open atomic write file at {}", self.path.display())
        })?;

        serde_json::to_writer_pretty(&mut file, log)
            .context("Failed to serialize completion store")?;

        // Nothing replaces the old file until commit
        file.commit().context("Failed to save completion store")?;

        Ok(())
    }

    /// Append a new record and return its id
    pub fn insert(&self, completion: &NewCompletion) -> Result<String> {
        let mut log = self.load()?;
        let id = Uuid::new_v4().to_string();
        log.records.push(CompletionRecord {
            id: id.clone(),
            completion: completion.clone(),
            review: None,
        });
        self.save(&log)?;

        info!(record_id = %id, path = %self.path.display(), "stored completion");
        Ok(id)
    }

    /// All records, oldest first
    pub fn list(&self) -> Result<Vec<CompletionRecord>> {
        Ok(self.load()?.records)
    }

    /// Look up a record by id or unique id prefix
    pub fn get(&self, id: &str) -> Result<Option<CompletionRecord>> {
        Ok(self.load()?.find(id).cloned())
    }

    /// Attach the review annotation to a stored record.
    ///
    /// A record can be reviewed once, and not by the person who completed it.
    pub fn attach_review(
        &self,
        id: &str,
        reviewer: &str,
        notes: Option<String>,
    ) -> Result<CompletionRecord> {
        let reviewer = reviewer.trim();
        if reviewer.is_empty() {
            anyhow::bail!("Reviewer name must not be empty");
        }

        // Resolve a prefix to the full id first
        let mut log = self.load()?;
        let record_id = match log.find(id) {
            Some(record) => record.id.clone(),
            None => anyhow::bail!("No completion record matches '{}'", id),
        };

        let record = log
            .records
            .iter_mut()
            .find(|r| r.id == record_id)
            .context("Completion record disappeared while reviewing")?;

        if let Some(existing) = &record.review {
            anyhow::bail!(
                "Completion {} was already reviewed by {}",
                record.id,
                existing.reviewer
            );
        }
        if record.completion.completed_by.as_deref() == Some(reviewer) {
            anyhow::bail!("A completion cannot be reviewed by the person who submitted it");
        }

        record.review = Some(Review {
            reviewer: reviewer.to_string(),
            notes,
            reviewed_at: Utc::now(),
        });
        let reviewed = record.clone();
        self.save(&log)?;

        info!(record_id = %reviewed.id, reviewer, "attached review");
        Ok(reviewed)
    }
}

impl CompletionSink for LocalStore {
    async fn create(&self, completion: &NewCompletion) -> Result<String> {
        self.insert(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{ItemResult, ItemStatus, OverallStatus};

    fn completion(by: Option<&str>) -> NewCompletion {
        NewCompletion {
            checklist_id: "opening".to_string(),
            items: vec![ItemResult {
                item_id: "door".to_string(),
                value: "yes".to_string(),
                notes: None,
                status: ItemStatus::Pass,
            }],
            notes: None,
            score: 100,
            overall_status: OverallStatus::Pass,
            completed_by: by.map(str::to_string),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("completions.json"));

        let id = store.insert(&completion(Some("sam"))).unwrap();
        let record = store.get(&id).unwrap().unwrap();
        assert_eq!(record.completion, completion_with_time(&record));
        assert!(record.review.is_none());

        let prefix = &id[..8];
        assert_eq!(store.get(prefix).unwrap().unwrap().id, id);
    }

    fn completion_with_time(record: &CompletionRecord) -> NewCompletion {
        let mut expected = completion(Some("sam"));
        expected.completed_at = record.completion.completed_at;
        expected
    }

    #[test]
    fn test_list_preserves_insert_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("completions.json"));
        let first = store.insert(&completion(None)).unwrap();
        let second = store.insert(&completion(None)).unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested/completions.json"));
        assert!(store.list().unwrap().is_empty());
        assert!(store.get("anything").unwrap().is_none());
    }

    #[test]
    fn test_review_once_by_other_person() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("completions.json"));
        let id = store.insert(&completion(Some("sam"))).unwrap();

        let err = store.attach_review(&id, "sam", None).unwrap_err();
        assert!(err.to_string().contains("person who submitted"));

        let reviewed = store
            .attach_review(&id, "alex", Some("temps look right".to_string()))
            .unwrap();
        let review = reviewed.review.unwrap();
        assert_eq!(review.reviewer, "alex");
        assert_eq!(review.notes.as_deref(), Some("temps look right"));

        let err = store.attach_review(&id, "jo", None).unwrap_err();
        assert!(err.to_string().contains("already reviewed by alex"));

        let stored = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.review.unwrap().reviewer, "alex");
    }

    #[test]
    fn test_review_unknown_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("completions.json"));
        let err = store.attach_review("missing", "alex", None).unwrap_err();
        assert!(err.to_string().contains("No completion record"));
    }

    #[tokio::test]
    async fn test_create_through_sink() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("completions.json"));
        let id = store.create(&completion(None)).await.unwrap();
        assert!(store.get(&id).unwrap().is_some());
    }
}
