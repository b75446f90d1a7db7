use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Process-unique identifier of a work item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemId(String);

impl WorkItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// A matched reference/foreign pair queued for later processing.
///
/// The output path always mirrors the reference filename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    pub reference_video: PathBuf,
    pub foreign_video: PathBuf,
    pub output_video: PathBuf,
    pub first_segment_adjust: f64,
    pub last_segment_adjust: f64,
    pub skip_subtitles: bool,
    pub status: JobStatus,
}

/// Source of work item identifiers.
///
/// Implementations must never hand out the same id twice for their lifetime.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> WorkItemId;
}

/// Random v4 UUIDs. The default for a [`crate::matcher::Matcher`].
#[derive(Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> WorkItemId {
        WorkItemId(Uuid::new_v4().to_string())
    }
}

/// Monotonic counter ids (`job-1`, `job-2`, ...), reproducible across runs.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::with_prefix("job")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> WorkItemId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        WorkItemId(format!("{}-{}", self.prefix, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids_count_up() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.next_id().as_str(), "job-1");
        assert_eq!(ids.next_id().as_str(), "job-2");

        let custom = SequentialIdGenerator::with_prefix("sync");
        assert_eq!(custom.next_id().to_string(), "sync-1");
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let ids = UuidIdGenerator;
        let seen: HashSet<_> = (0..100).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&JobStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(JobStatus::default(), JobStatus::Pending);
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }
}
