use std::collections::BTreeSet;

use shared::domain::{FontOrigin, FontResource};

/// Read-mostly snapshot of the server's font catalog. User edits never
/// touch this directly; the pending change set is rendered as an
/// overlay on top of it, and the snapshot is only replaced by an
/// explicit refresh.
#[derive(Debug, Clone, Default)]
pub struct FontCatalog {
    resources: Vec<FontResource>,
}

impl FontCatalog {
    pub fn new(resources: Vec<FontResource>) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> &[FontResource] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FontResource> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn custom_names(&self) -> Vec<String> {
        self.resources
            .iter()
            .filter(|r| r.origin == FontOrigin::Custom)
            .map(|r| r.name.clone())
            .collect()
    }

    /// Resolves logical family names to the deduplicated set of
    /// physical files backing them. Names missing from the catalog
    /// contribute nothing.
    ///
    /// Only the *given* names are consulted: a file shared with a
    /// family that is not in `names` is still included. Deletion of a
    /// shared collection file therefore takes every family backed by
    /// it down with it.
    pub fn backing_files_for<'a, I>(&self, names: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut files = BTreeSet::new();
        for name in names {
            if let Some(resource) = self.get(name) {
                files.extend(resource.files.iter().cloned());
            }
        }
        files
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
