//! The working file set: an ordered, append-only collection of files awaiting upload.
//!
//! Mutation is crate-private. Callers change the set through
//! [`crate::session::UploadSession`], which resets feedback on every change.

use std::collections::BTreeMap;
use std::fmt;

use crate::contract::FileRef;

/// Where a batch of files came from. Only used to label log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSource {
    /// Files picked explicitly by the user.
    Selection,
    /// Files dropped onto the upload target.
    DragDrop,
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::Selection => f.write_str("selection"),
            FileSource::DragDrop => f.write_str("drag_drop"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingFileSet {
    files: Vec<FileRef>,
}

impl WorkingFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileRef> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[FileRef] {
        &self.files
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(FileRef::name).collect()
    }

    /// Names occurring more than once, in order of first appearance.
    ///
    /// Such files share one key in the server's report.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for file in &self.files {
            *seen.entry(file.name()).or_default() += 1;
        }
        let mut duplicates = Vec::new();
        for file in &self.files {
            let name = file.name();
            if seen.get(name).copied().unwrap_or(0) > 1 && !duplicates.contains(&name) {
                duplicates.push(name);
            }
        }
        duplicates
    }

    pub(crate) fn append<I>(&mut self, new_files: I) -> usize
    where
        I: IntoIterator<Item = FileRef>,
    {
        let before = self.files.len();
        self.files.extend(new_files);
        self.files.len() - before
    }

    pub(crate) fn clear(&mut self) {
        self.files.clear();
    }
}

impl<'a> IntoIterator for &'a WorkingFileSet {
    type Item = &'a FileRef;
    type IntoIter = std::slice::Iter<'a, FileRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
