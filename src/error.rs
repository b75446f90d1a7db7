//! Error types for the matching engine.
//!
//! Every failure of a match pass maps to exactly one of these variants, and a
//! failed pass never leaves a preview or pending work items behind.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which of the three folders a match pass needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FolderRole {
    Reference,
    Foreign,
    Output,
}

impl fmt::Display for FolderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FolderRole::Reference => "reference",
            FolderRole::Foreign => "foreign",
            FolderRole::Output => "output",
        };
        f.write_str(name)
    }
}

/// A pattern rule that is not valid regular-expression syntax.
///
/// `index` is the position of the rule in the raw, editable rule list (blank
/// rules included), so it points at the row the user has to fix.
#[derive(Error, Debug, Clone)]
#[error("rule #{index} (`{pattern}`) is not a valid pattern: {source}")]
pub struct CompileError {
    pub index: usize,
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Errors that abort a match pass.
#[derive(Error, Debug)]
pub enum MatchError {
    /// One or more required folders are unset
    #[error("configuration error: {} folder not set", join_roles(.missing))]
    Configuration { missing: Vec<FolderRole> },

    /// A pattern rule failed to compile
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Listing one of the folders failed
    #[error("could not read {role} folder {}: {source}", .path.display())]
    DirectoryRead {
        role: FolderRole,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn join_roles(roles: &[FolderRole]) -> String {
    roles
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, MatchError>;
