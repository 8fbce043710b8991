use std::collections::BTreeSet;

use crate::catalog::FontCatalog;

/// File suffixes the pending set accepts, compared case-insensitively.
/// Collection formats are included since one .ttc/.otc file can back
/// several logical families.
pub const ACCEPTED_FONT_SUFFIXES: &[&str] = &[".ttf", ".otf", ".ttc", ".otc"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFontFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Local, uncommitted font edits: files to upload and family names
/// marked for removal. All operations are pure bookkeeping; nothing
/// here performs I/O or touches the catalog.
#[derive(Debug, Clone, Default)]
pub struct PendingChangeSet {
    additions: Vec<PendingFontFile>,
    deletions: BTreeSet<String>,
}

impl PendingChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues files for upload. Files with an unaccepted suffix and
    /// files whose name is already queued are dropped silently; the
    /// caller's file picker decides what to tell the user, not this
    /// set.
    pub fn add_files<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = PendingFontFile>,
    {
        for file in files {
            if !has_accepted_suffix(&file.file_name) {
                continue;
            }
            if self.additions.iter().any(|a| a.file_name == file.file_name) {
                continue;
            }
            self.additions.push(file);
        }
    }

    pub fn remove_addition(&mut self, file_name: &str) {
        self.additions.retain(|a| a.file_name != file_name);
    }

    pub fn clear_additions(&mut self) {
        self.additions.clear();
    }

    pub fn mark_for_deletion(&mut self, name: impl Into<String>) {
        self.deletions.insert(name.into());
    }

    pub fn unmark_for_deletion(&mut self, name: &str) {
        self.deletions.remove(name);
    }

    /// Marks every custom family currently in the catalog. Whether a
    /// marked name is actually deletable is decided at apply time, not
    /// here.
    pub fn mark_all_custom(&mut self, catalog: &FontCatalog) {
        for name in catalog.custom_names() {
            self.deletions.insert(name);
        }
    }

    /// The companion of [`mark_all_custom`](Self::mark_all_custom):
    /// unmarking is all-or-nothing and empties the whole deletion set.
    pub fn unmark_all(&mut self) {
        self.deletions.clear();
    }

    pub fn clear(&mut self) {
        self.additions.clear();
        self.deletions.clear();
    }

    pub fn additions(&self) -> &[PendingFontFile] {
        &self.additions
    }

    pub fn deletions(&self) -> impl Iterator<Item = &str> {
        self.deletions.iter().map(String::as_str)
    }

    pub fn addition_count(&self) -> usize {
        self.additions.len()
    }

    pub fn deletion_count(&self) -> usize {
        self.deletions.len()
    }

    pub fn is_marked_for_deletion(&self, name: &str) -> bool {
        self.deletions.contains(name)
    }

    /// True when nothing is queued; used to decide between an "apply
    /// pending changes" prompt and a plain "regenerate" prompt.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty()
    }
}

fn has_accepted_suffix(file_name: &str) -> bool {
    let lowered = file_name.to_ascii_lowercase();
    ACCEPTED_FONT_SUFFIXES
        .iter()
        .any(|suffix| lowered.ends_with(suffix))
}

#[cfg(test)]
#[path = "tests/pending_tests.rs"]
mod tests;
