use std::path::Path;

use tokio::sync::watch;
use tracing::{error, info};

use crate::config::{FolderSelection, SyncOptions};
use crate::error::{FolderRole, MatchError, Result};
use crate::host::DirectoryLister;
use crate::matcher::{MatchOutcome, Matcher, PreviewRow};
use crate::queue::WorkQueue;
use crate::rule_set::RuleSet;
use crate::work_item::WorkItem;

/// Host-side state around the matcher: the picked folders, the editable
/// rules and the result of the last successful pass.
///
/// Subscribers see the number of pending items whenever the pending list
/// changes: after a pass, when a failed pass clears it, and after queueing.
pub struct MatchSession<L> {
    pub folders: FolderSelection,
    pub rules: RuleSet,
    pub options: SyncOptions,
    lister: L,
    matcher: Matcher,
    outcome: MatchOutcome,
    changes: watch::Sender<usize>,
}

impl<L: DirectoryLister> MatchSession<L> {
    pub fn new(lister: L) -> Self {
        Self::with_matcher(lister, Matcher::new())
    }

    pub fn with_matcher(lister: L, matcher: Matcher) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            folders: FolderSelection::default(),
            rules: RuleSet::default(),
            options: SyncOptions::default(),
            lister,
            matcher,
            outcome: MatchOutcome::default(),
            changes,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.changes.subscribe()
    }

    pub fn preview(&self) -> &[PreviewRow] {
        &self.outcome.preview
    }

    pub fn pending(&self) -> &[WorkItem] {
        &self.outcome.work_items
    }

    /// Run one match pass over the current folders and rules.
    ///
    /// Checks folders first, then rules, then lists both folders. On any error
    /// the previous preview and pending items are dropped.
    pub async fn run_match_pass(&mut self) -> Result<&MatchOutcome> {
        let had_pending = !self.outcome.work_items.is_empty();
        self.outcome = MatchOutcome::default();

        match self.try_match_pass().await {
            Ok(outcome) => {
                self.outcome = outcome;
                self.notify();
                Ok(&self.outcome)
            }
            Err(e) => {
                error!("Match pass failed: {}", e);
                if had_pending {
                    self.notify();
                }
                Err(e)
            }
        }
    }

    async fn try_match_pass(&mut self) -> Result<MatchOutcome> {
        let folders = self.folders.build()?;
        let rules = self.rules.compiled()?;

        let (reference_names, foreign_names) = tokio::try_join!(
            list_folder(&self.lister, FolderRole::Reference, &folders.reference),
            list_folder(&self.lister, FolderRole::Foreign, &folders.foreign),
        )?;

        info!(
            "Listed {} reference and {} foreign entries",
            reference_names.len(),
            foreign_names.len()
        );

        Ok(self.matcher.match_collections(
            &reference_names,
            &foreign_names,
            rules,
            &folders,
            &self.options,
        ))
    }

    /// Hand every pending item to `queue`. The session keeps the preview but
    /// no longer holds any work items afterwards.
    pub fn queue_pending<Q: WorkQueue + ?Sized>(&mut self, queue: &mut Q) -> usize {
        let items = std::mem::take(&mut self.outcome.work_items);
        let count = items.len();
        if count > 0 {
            queue.add_to_queue(items);
            self.notify();
        }
        count
    }

    fn notify(&self) {
        self.changes.send_replace(self.outcome.work_items.len());
    }
}

async fn list_folder<L: DirectoryLister>(
    lister: &L,
    role: FolderRole,
    path: &Path,
) -> Result<Vec<String>> {
    lister
        .list_directory(path)
        .await
        .map_err(|source| MatchError::DirectoryRead {
            role,
            path: path.to_path_buf(),
            source,
        })
}
