use std::path::{Path, PathBuf};

use modelsort::normalized_file_name;

/// A scanned file: full path plus the NFC-normalized filename used for grouping.
/// Immutable once scanned; existence is re-checked before acting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path to the file.
    pub(crate) path: PathBuf,
    /// Normalized filename (composed Unicode form).
    pub(crate) name: String,
}

/// One set of sidecars sharing a matched extension within a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSet {
    /// The extension the duplicates matched (e.g. ".civitai.info").
    pub(crate) extension: String,
    /// Duplicate files in scan order.
    pub(crate) files: Vec<FileRecord>,
    /// Index into `files` of the copy to keep.
    pub(crate) keeper: usize,
}

/// Planned actions for one stem group. Pure classification:
/// nothing here touches the filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPlan {
    /// Sidecars with no model anywhere in the group; delete candidates.
    pub(crate) orphans: Vec<FileRecord>,
    /// Sidecar sets with more than one file for the same extension.
    pub(crate) duplicates: Vec<DuplicateSet>,
    /// Sidecars that are not co-located with the model.
    pub(crate) moves: Vec<FileRecord>,
    /// Directory of the group's first model file, when the group has one.
    pub(crate) target_dir: Option<PathBuf>,
}

impl FileRecord {
    pub(crate) fn new(path: PathBuf) -> Self {
        let name = normalized_file_name(&path);
        Self { path, name }
    }

    /// Parent directory of the file.
    pub(crate) fn parent(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

impl GroupPlan {
    /// True when the group has any pending orphan, duplicate, or move action.
    pub(crate) fn has_actions(&self) -> bool {
        !self.orphans.is_empty() || !self.duplicates.is_empty() || !self.moves.is_empty()
    }
}
