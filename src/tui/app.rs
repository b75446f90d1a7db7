use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::widgets::{ListState, ScrollbarState};
use tokio::sync::watch;

use crate::config::MatchProfile;
use crate::error::FolderRole;
use crate::host::DirectoryLister;
use crate::matcher::PreviewRow;
use crate::queue::JobQueue;
use crate::session::MatchSession;
use super::models::{Focus, PassStats, StatusMessage};

const FOLDER_ORDER: [FolderRole; 3] = [FolderRole::Reference, FolderRole::Foreign, FolderRole::Output];

pub struct App<L> {
    pub session: MatchSession<L>,
    pub queue: JobQueue,
    queue_changes: watch::Receiver<usize>,
    pub reference_input: String,
    pub foreign_input: String,
    pub output_input: String,
    pub focus: Focus,
    pub list_state: ListState,
    pub scroll_state: ScrollbarState,
    pub show_help: bool,
    pub stats: PassStats,
    pub queued_total: usize,
    pub status_message: Option<StatusMessage>,
    pub status_message_time: Option<Instant>,
}

impl<L: DirectoryLister> App<L> {
    pub fn new(session: MatchSession<L>) -> Self {
        let queue = JobQueue::new();
        let queue_changes = queue.subscribe();

        let input_for = |role| {
            session
                .folders
                .get(role)
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default()
        };
        let reference_input = input_for(FolderRole::Reference);
        let foreign_input = input_for(FolderRole::Foreign);
        let output_input = input_for(FolderRole::Output);

        Self {
            session,
            queue,
            queue_changes,
            reference_input,
            foreign_input,
            output_input,
            focus: Focus::Folder(FolderRole::Reference),
            list_state: ListState::default(),
            scroll_state: ScrollbarState::default(),
            show_help: false,
            stats: PassStats::default(),
            queued_total: 0,
            status_message: None,
            status_message_time: None,
        }
    }

    pub fn with_profile(lister: L, profile: MatchProfile) -> Self {
        let mut session = MatchSession::new(lister);
        session.folders = profile.folders;
        session.rules = profile.rules;
        session.options = profile.options;
        Self::new(session)
    }

    pub fn preview(&self) -> &[PreviewRow] {
        self.session.preview()
    }

    pub fn folder_input(&self, role: FolderRole) -> &str {
        match role {
            FolderRole::Reference => &self.reference_input,
            FolderRole::Foreign => &self.foreign_input,
            FolderRole::Output => &self.output_input,
        }
    }

    fn folder_input_mut(&mut self, role: FolderRole) -> &mut String {
        match role {
            FolderRole::Reference => &mut self.reference_input,
            FolderRole::Foreign => &mut self.foreign_input,
            FolderRole::Output => &mut self.output_input,
        }
    }

    // Focus cycles folders, then rules, then the preview list.
    fn focus_order(&self) -> Vec<Focus> {
        FOLDER_ORDER
            .iter()
            .map(|role| Focus::Folder(*role))
            .chain((0..self.session.rules.len()).map(Focus::Rule))
            .chain(std::iter::once(Focus::Preview))
            .collect()
    }

    pub fn focus_next(&mut self) {
        let order = self.focus_order();
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(pos + 1) % order.len()];
    }

    pub fn focus_previous(&mut self) {
        let order = self.focus_order();
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(pos + order.len() - 1) % order.len()];
    }

    pub fn input_char(&mut self, c: char) {
        match self.focus {
            Focus::Folder(role) => self.folder_input_mut(role).push(c),
            Focus::Rule(index) => {
                if let Some(rule) = self.session.rules.rules().get(index) {
                    let mut text = rule.clone();
                    text.push(c);
                    self.session.rules.replace_rule(index, text);
                }
            }
            Focus::Preview => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Focus::Folder(role) => {
                self.folder_input_mut(role).pop();
            }
            Focus::Rule(index) => {
                if let Some(rule) = self.session.rules.rules().get(index) {
                    let mut text = rule.clone();
                    text.pop();
                    self.session.rules.replace_rule(index, text);
                }
            }
            Focus::Preview => {}
        }
    }

    pub fn add_rule(&mut self) {
        let index = self.session.rules.add_rule();
        self.focus = Focus::Rule(index);
    }

    pub fn remove_focused_rule(&mut self) {
        if let Focus::Rule(index) = self.focus {
            if let Some(removed) = self.session.rules.remove_rule(index) {
                self.set_status_message(format!("Removed rule #{}: {}", index, removed), false);
            }
            self.focus = match self.session.rules.len() {
                0 => Focus::Folder(FolderRole::Output),
                len => Focus::Rule(index.min(len - 1)),
            };
        }
    }

    /// Copy the folder inputs into the session. Blank inputs count as unset.
    pub fn sync_folders(&mut self) {
        for role in FOLDER_ORDER {
            let input = self.folder_input(role).trim();
            let dir = if input.is_empty() {
                None
            } else {
                Some(PathBuf::from(input))
            };
            self.session.folders.set(role, dir);
        }
    }

    pub async fn run_match(&mut self) {
        self.sync_folders();

        let result = self
            .session
            .run_match_pass()
            .await
            .map(|outcome| PassStats {
                total: outcome.preview.len(),
                matched: outcome.matched_count(),
                unmatched: outcome.unmatched_count(),
            });

        match result {
            Ok(stats) => {
                self.set_status_message(
                    format!("Matched {} of {} reference videos", stats.matched, stats.total),
                    false,
                );
                self.stats = stats;
                self.list_state.select(if self.stats.total > 0 { Some(0) } else { None });
                self.scroll_state = ScrollbarState::new(self.stats.total);
            }
            Err(e) => {
                self.stats = PassStats::default();
                self.list_state.select(None);
                self.scroll_state = ScrollbarState::default();
                self.set_status_message(e.to_string(), true);
            }
        }
    }

    pub fn queue_matches(&mut self) {
        let count = self.session.queue_pending(&mut self.queue);
        if count == 0 {
            self.set_status_message("Nothing to queue; run a match first".to_string(), true);
        } else {
            self.set_status_message(format!("Queued {} jobs", count), false);
        }
        self.refresh_queue_count();
    }

    pub fn clear_queue(&mut self) {
        let drained = self.queue.drain();
        self.set_status_message(format!("Cleared {} queued jobs", drained.len()), false);
        self.refresh_queue_count();
    }

    pub fn refresh_queue_count(&mut self) {
        if self.queue_changes.has_changed().unwrap_or(false) {
            self.queued_total = *self.queue_changes.borrow_and_update();
        }
    }

    pub fn next(&mut self) {
        let len = self.preview().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i);
    }

    pub fn previous(&mut self) {
        let len = self.preview().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn set_status_message(&mut self, text: String, is_error: bool) {
        self.status_message = Some(StatusMessage { text, is_error });
        self.status_message_time = Some(Instant::now());
    }

    pub fn clear_status_message_if_expired(&mut self) {
        if let (Some(message), Some(time)) = (&self.status_message, self.status_message_time) {
            // Errors stay until the next action replaces them.
            if !message.is_error && time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}
