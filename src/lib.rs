//! Pairs videos from a reference folder with videos from a foreign folder by
//! reducing each filename to a normalized key and joining on it.

pub mod config;
pub mod error;
pub mod host;
pub mod matcher;
pub mod queue;
pub mod rule_set;
pub mod session;
pub mod tui;
pub mod work_item;

pub use config::{FolderSelection, MatchFolders, MatchProfile, SyncOptions};
pub use error::{CompileError, FolderRole, MatchError};
pub use matcher::{build_match_key, compile_rules, CompiledRules, MatchOutcome, Matcher, PreviewRow};
pub use queue::{JobQueue, WorkQueue};
pub use rule_set::RuleSet;
pub use session::MatchSession;
pub use work_item::{IdGenerator, JobStatus, SequentialIdGenerator, UuidIdGenerator, WorkItem, WorkItemId};
