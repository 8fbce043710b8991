use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(JobId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontOrigin {
    Builtin,
    Custom,
}

/// Presentation capability flags for a font family. UI hints only;
/// nothing in the apply pipeline branches on these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontVariants {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub bold_italic: bool,
}

/// A logical font family known to the server-side store.
///
/// `files` lists the physical files backing the family. Collection
/// formats (.ttc/.otc) mean several families can point at the same
/// physical file, so file-level operations must dedupe across
/// families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontResource {
    pub name: String,
    pub origin: FontOrigin,
    pub files: Vec<String>,
    #[serde(default)]
    pub variants: FontVariants,
}

impl FontResource {
    pub fn is_custom(&self) -> bool {
        self.origin == FontOrigin::Custom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}
