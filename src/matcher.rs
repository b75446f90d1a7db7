use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{MatchFolders, SyncOptions};
use crate::error::CompileError;
use crate::work_item::{IdGenerator, JobStatus, UuidIdGenerator, WorkItem};

/// Extensions a name must end with to take part in matching.
pub const VIDEO_EXTENSIONS: [&str; 5] = [".mkv", ".mp4", ".avi", ".mov", ".m4v"];

/// Case-insensitive, replace-all patterns in application order.
#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
    patterns: Vec<Regex>,
}

impl CompiledRules {
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Regex> {
        self.patterns.iter()
    }
}

/// Compile raw rule text. Blank rules are dropped; any invalid rule fails the
/// whole set so a pass never runs with only part of the rules.
pub fn compile_rules<S: AsRef<str>>(raw: &[S]) -> Result<CompiledRules, CompileError> {
    let mut patterns = Vec::with_capacity(raw.len());

    for (index, pattern) in raw.iter().enumerate() {
        let pattern = pattern.as_ref();
        if pattern.trim().is_empty() {
            continue;
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| CompileError {
                index,
                pattern: pattern.to_string(),
                source,
            })?;
        patterns.push(regex);
    }

    Ok(CompiledRules { patterns })
}

/// Lowercase the name, strip every rule match in order, then trim.
pub fn build_match_key(filename: &str, rules: &CompiledRules) -> String {
    let mut key = filename.to_lowercase();
    for pattern in rules.iter() {
        key = pattern.replace_all(&key, "").into_owned();
    }
    key.trim().to_string()
}

pub fn is_video_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Video names only, in their original order.
pub fn filter_videos<S: AsRef<str>>(names: &[S]) -> Vec<&str> {
    names
        .iter()
        .map(|n| n.as_ref())
        .filter(|n| is_video_file(n))
        .collect()
}

/// One row per reference video, matched or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    pub reference_name: String,
    pub foreign_name: Option<String>,
    pub key: String,
}

impl PreviewRow {
    pub fn is_matched(&self) -> bool {
        self.foreign_name.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub preview: Vec<PreviewRow>,
    pub work_items: Vec<WorkItem>,
}

impl MatchOutcome {
    pub fn matched_count(&self) -> usize {
        self.work_items.len()
    }

    pub fn unmatched_count(&self) -> usize {
        self.preview.len() - self.work_items.len()
    }
}

/// Joins reference and foreign names on their match keys.
///
/// Holds nothing but the id source, so one matcher can serve any number of
/// passes and never keeps the items it hands out.
pub struct Matcher {
    ids: Box<dyn IdGenerator>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::with_id_generator(Box::new(UuidIdGenerator))
    }

    pub fn with_id_generator(ids: Box<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    pub fn match_collections<R, F>(
        &self,
        reference_names: &[R],
        foreign_names: &[F],
        rules: &CompiledRules,
        folders: &MatchFolders,
        options: &SyncOptions,
    ) -> MatchOutcome
    where
        R: AsRef<str>,
        F: AsRef<str>,
    {
        let references = filter_videos(reference_names);
        let foreigns = filter_videos(foreign_names);

        // Later names overwrite earlier ones with the same key.
        let mut lookup: HashMap<String, &str> = HashMap::with_capacity(foreigns.len());
        for &name in &foreigns {
            let key = build_match_key(name, rules);
            if let Some(previous) = lookup.insert(key.clone(), name) {
                warn!(
                    "Foreign files '{}' and '{}' share key '{}'; keeping '{}'",
                    previous, name, key, name
                );
            }
        }

        let mut outcome = MatchOutcome::default();
        for name in references {
            let key = build_match_key(name, rules);
            let matched = lookup.get(key.as_str()).copied();
            debug!("'{}' -> key '{}' -> {:?}", name, key, matched);

            if let Some(foreign) = matched {
                outcome.work_items.push(WorkItem {
                    id: self.ids.next_id(),
                    reference_video: folders.reference.join(name),
                    foreign_video: folders.foreign.join(foreign),
                    output_video: folders.output.join(name),
                    first_segment_adjust: options.first_segment_adjust(),
                    last_segment_adjust: options.last_segment_adjust(),
                    skip_subtitles: options.skip_subtitles(),
                    status: JobStatus::Pending,
                });
            }

            outcome.preview.push(PreviewRow {
                reference_name: name.to_string(),
                foreign_name: matched.map(str::to_string),
                key,
            });
        }

        info!(
            "Matched {} of {} reference videos against {} foreign videos",
            outcome.matched_count(),
            outcome.preview.len(),
            foreigns.len()
        );

        outcome
    }

    /// Compile `raw_rules` and match in one step. A bad rule yields the error
    /// and nothing else.
    pub fn match_with_patterns<R, F, S>(
        &self,
        reference_names: &[R],
        foreign_names: &[F],
        raw_rules: &[S],
        folders: &MatchFolders,
        options: &SyncOptions,
    ) -> Result<MatchOutcome, CompileError>
    where
        R: AsRef<str>,
        F: AsRef<str>,
        S: AsRef<str>,
    {
        let rules = compile_rules(raw_rules)?;
        Ok(self.match_collections(reference_names, foreign_names, &rules, folders, options))
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}
