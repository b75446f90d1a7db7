use tokio::sync::watch;
use tracing::info;

use crate::work_item::{JobStatus, WorkItem, WorkItemId};

/// Receives ownership of matched work items.
pub trait WorkQueue {
    fn add_to_queue(&mut self, items: Vec<WorkItem>);
}

/// In-memory queue on the executor side.
///
/// Subscribers see the number of queued items every time it changes.
#[derive(Debug)]
pub struct JobQueue {
    items: Vec<WorkItem>,
    changes: watch::Sender<usize>,
}

impl JobQueue {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            items: Vec::new(),
            changes,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.changes.subscribe()
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter().filter(|item| item.status == JobStatus::Pending)
    }

    /// Update the status of a queued item. Returns `false` for unknown ids.
    pub fn set_status(&mut self, id: &WorkItemId, status: JobStatus) -> bool {
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.status = status;
                true
            }
            None => false,
        }
    }

    /// Take every queued item, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<WorkItem> {
        let drained = std::mem::take(&mut self.items);
        if !drained.is_empty() {
            self.notify();
        }
        drained
    }

    fn notify(&self) {
        self.changes.send_replace(self.items.len());
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue for JobQueue {
    fn add_to_queue(&mut self, items: Vec<WorkItem>) {
        if items.is_empty() {
            return;
        }
        info!("Queued {} work items", items.len());
        self.items.extend(items);
        self.notify();
    }
}

impl WorkQueue for Vec<WorkItem> {
    fn add_to_queue(&mut self, items: Vec<WorkItem>) {
        self.extend(items);
    }
}
