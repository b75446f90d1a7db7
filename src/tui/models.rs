use crate::error::FolderRole;

/// Which input the keyboard is currently editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Folder(FolderRole),
    Rule(usize),
    Preview,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassStats {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}
