//! Collaborators supplied by the host application: folder listing and folder
//! selection. The engine itself never touches the filesystem.

use std::collections::HashMap;
use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::FolderRole;

/// Lists the file names in a folder.
pub trait DirectoryLister {
    fn list_directory(&self, path: &Path) -> impl Future<Output = io::Result<Vec<String>>> + Send;
}

impl<L: DirectoryLister + ?Sized> DirectoryLister for &L {
    fn list_directory(&self, path: &Path) -> impl Future<Output = io::Result<Vec<String>>> + Send {
        (**self).list_directory(path)
    }
}

/// Lists regular files on the local filesystem.
///
/// Symlinks are followed, so a link to a video is listed like the video.
/// Dangling links and names that are not valid UTF-8 are skipped with a
/// warning: a lossy name would point at a file that does not exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectoryLister;

impl DirectoryLister for FsDirectoryLister {
    async fn list_directory(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();
            let metadata = match tokio::fs::metadata(&entry_path).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("Skipping dangling link {}", entry_path.display());
                    continue;
                }
                Err(e) => return Err(e),
            };
            if !metadata.is_file() {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!(
                    "Skipping {} in {}: name is not valid UTF-8",
                    raw.to_string_lossy(),
                    path.display()
                ),
            }
        }

        Ok(names)
    }
}

/// Listings that were read ahead of time, keyed by folder.
///
/// Unknown folders fail with `NotFound`, like a missing directory would.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectoryLister {
    folders: HashMap<PathBuf, Vec<String>>,
}

impl MemoryDirectoryLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder<P, S>(mut self, path: P, names: impl IntoIterator<Item = S>) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        self.folders
            .insert(path.into(), names.into_iter().map(Into::into).collect());
        self
    }
}

impl DirectoryLister for MemoryDirectoryLister {
    async fn list_directory(&self, path: &Path) -> io::Result<Vec<String>> {
        self.folders.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no listing for {}", path.display()),
            )
        })
    }
}

/// Asks the user for a folder. `None` means the user cancelled.
pub trait FolderPicker {
    fn select_directory(&self, role: FolderRole) -> Option<PathBuf>;
}

/// Prompts for a folder path on stdin; an empty line cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinFolderPicker;

impl FolderPicker for StdinFolderPicker {
    fn select_directory(&self, role: FolderRole) -> Option<PathBuf> {
        print!("Enter {} folder (blank to cancel): ", role);
        io::stdout().flush().ok()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        parse_folder_answer(&line)
    }
}

fn parse_folder_answer(line: &str) -> Option<PathBuf> {
    let trimmed = line.trim().trim_matches('"');
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_folder_answer() {
        assert_eq!(parse_folder_answer("\n"), None);
        assert_eq!(parse_folder_answer("  /media/en \n"), Some(PathBuf::from("/media/en")));
        assert_eq!(parse_folder_answer("\"C:\\Videos\"\r\n"), Some(PathBuf::from("C:\\Videos")));
    }
}
