use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{FolderRole, MatchError};
use crate::rule_set::RuleSet;

/// Per-job processing parameters copied onto every work item.
///
/// Every field is optional; unset values fall back to `0.0`, `0.0` and `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Timing adjustment for the first segment, in seconds
    pub first_segment_adjust: Option<f64>,
    /// Timing adjustment for the last segment, in seconds
    pub last_segment_adjust: Option<f64>,
    pub skip_subtitles: Option<bool>,
}

impl SyncOptions {
    pub fn first_segment_adjust(&self) -> f64 {
        self.first_segment_adjust.unwrap_or(0.0)
    }

    pub fn last_segment_adjust(&self) -> f64 {
        self.last_segment_adjust.unwrap_or(0.0)
    }

    pub fn skip_subtitles(&self) -> bool {
        self.skip_subtitles.unwrap_or(false)
    }
}

/// The three folders a match pass works with, all known to be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFolders {
    pub reference: PathBuf,
    pub foreign: PathBuf,
    pub output: PathBuf,
}

impl MatchFolders {
    pub fn builder() -> FolderSelection {
        FolderSelection::new()
    }
}

/// Folders as picked by the user, any of which may still be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSelection {
    pub reference: Option<PathBuf>,
    pub foreign: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl FolderSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.reference = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn foreign<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.foreign = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn output<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn get(&self, role: FolderRole) -> Option<&Path> {
        match role {
            FolderRole::Reference => self.reference.as_deref(),
            FolderRole::Foreign => self.foreign.as_deref(),
            FolderRole::Output => self.output.as_deref(),
        }
    }

    pub fn set(&mut self, role: FolderRole, dir: Option<PathBuf>) {
        let slot = match role {
            FolderRole::Reference => &mut self.reference,
            FolderRole::Foreign => &mut self.foreign,
            FolderRole::Output => &mut self.output,
        };
        *slot = dir;
    }

    /// Roles that are still unset. An empty path counts as unset.
    pub fn missing(&self) -> Vec<FolderRole> {
        [FolderRole::Reference, FolderRole::Foreign, FolderRole::Output]
            .into_iter()
            .filter(|role| self.get(*role).is_none_or(|p| p.as_os_str().is_empty()))
            .collect()
    }

    pub fn build(&self) -> Result<MatchFolders, MatchError> {
        let missing = self.missing();
        match (&self.reference, &self.foreign, &self.output) {
            (Some(reference), Some(foreign), Some(output)) if missing.is_empty() => Ok(MatchFolders {
                reference: reference.clone(),
                foreign: foreign.clone(),
                output: output.clone(),
            }),
            _ => Err(MatchError::Configuration { missing }),
        }
    }
}

/// Everything needed to repeat a match pass, stored as JSON.
///
/// ```json
/// {
///   "folders": { "reference": "/media/en", "foreign": "/media/pt", "output": "/media/out" },
///   "rules": { "rules": ["\\.[a-z0-9]+$", "[-_.\\s]"] },
///   "options": { "first_segment_adjust": 0.5, "skip_subtitles": true }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchProfile {
    pub folders: FolderSelection,
    pub rules: RuleSet,
    pub options: SyncOptions,
}

impl MatchProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse profile {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("Failed to write profile {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_options_defaults() {
        let options = SyncOptions::default();
        assert_eq!(options.first_segment_adjust(), 0.0);
        assert_eq!(options.last_segment_adjust(), 0.0);
        assert!(!options.skip_subtitles());

        let parsed: SyncOptions = serde_json::from_str(r#"{"last_segment_adjust": -1.25}"#).unwrap();
        assert_eq!(parsed.first_segment_adjust(), 0.0);
        assert_eq!(parsed.last_segment_adjust(), -1.25);
    }

    #[test]
    fn test_folder_builder() {
        let folders = MatchFolders::builder()
            .reference("/media/en")
            .foreign("/media/pt")
            .output("/media/out")
            .build()
            .unwrap();

        assert_eq!(folders.reference, PathBuf::from("/media/en"));
        assert_eq!(folders.output, PathBuf::from("/media/out"));
    }

    #[test]
    fn test_folder_builder_reports_every_missing_folder() {
        let err = FolderSelection::new().foreign("").build().unwrap_err();
        match err {
            MatchError::Configuration { missing } => assert_eq!(
                missing,
                vec![FolderRole::Reference, FolderRole::Foreign, FolderRole::Output]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_profile_without_rules_uses_defaults() {
        let profile: MatchProfile =
            serde_json::from_str(r#"{"options": {"skip_subtitles": true}}"#).unwrap();
        assert_eq!(profile.rules, RuleSet::default());
        assert!(profile.options.skip_subtitles());
        assert!(profile.folders.reference.is_none());
    }
}
