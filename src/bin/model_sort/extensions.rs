//! Filename classification by known model and sidecar extensions.

use std::cmp::Reverse;

use itertools::Itertools;

/// Extensions that mark a file as a trained-weights artifact.
pub const MODEL_EXTENSIONS: &[&str] = &[".safetensors", ".pth", ".bin", ".ckpt", ".gguf", ".pt", ".sft"];

/// Extensions that mark a file as metadata / preview / auxiliary content.
/// Covers the sidecar files written by Stability Matrix and LoRA Manager.
pub const SIDECAR_EXTENSIONS: &[&str] = &[
    ".preview.jpg",
    ".preview.png",
    ".preview.jpeg",
    ".civitai.info",
    ".cm-info.json",
    ".metadata.json",
    ".json",
    ".sha256",
    ".info",
    ".png",
    ".jpg",
    ".jpeg",
    ".yaml",
    ".txt",
    ".xml",
    ".webp",
    ".mp4",
];

/// Semantic category of a scanned file, determined purely from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Model,
    Sidecar,
    Other,
}

/// Known extensions with a merged list sorted for longest-match stripping.
#[derive(Debug, Clone)]
pub struct ExtensionSet {
    model: Vec<String>,
    sidecar: Vec<String>,
    /// All known extensions, longest first.
    /// Matching must try longer extensions before shorter ones
    /// ('.civitai.info' before '.info', '.preview.jpg' before '.jpg').
    all: Vec<String>,
}

impl ExtensionSet {
    /// Build the default extension set from the built-in lists.
    #[must_use]
    pub fn new() -> Self {
        let model: Vec<String> = MODEL_EXTENSIONS.iter().map(ToString::to_string).collect();
        let sidecar: Vec<String> = SIDECAR_EXTENSIONS.iter().map(ToString::to_string).collect();
        let all: Vec<String> = model
            .iter()
            .chain(sidecar.iter())
            .cloned()
            .sorted_by_key(|ext| (Reverse(ext.len()), ext.clone()))
            .collect();
        Self { model, sidecar, all }
    }

    /// Classify a filename as model, sidecar, or other.
    /// The model list is checked first, so it wins if a name could match both.
    #[must_use]
    pub fn classify(&self, filename: &str) -> FileKind {
        if self.model.iter().any(|ext| filename.ends_with(ext.as_str())) {
            FileKind::Model
        } else if self.sidecar.iter().any(|ext| filename.ends_with(ext.as_str())) {
            FileKind::Sidecar
        } else {
            FileKind::Other
        }
    }

    /// Split a filename into (stem, matched extension) using the longest known extension.
    /// Returns `None` when no known extension matches, which is an expected
    /// outcome for stray files rather than an error.
    #[must_use]
    pub fn split<'a>(&'a self, filename: &'a str) -> Option<(&'a str, &'a str)> {
        self.all
            .iter()
            .find(|ext| filename.ends_with(ext.as_str()))
            .map(|ext| (&filename[..filename.len() - ext.len()], ext.as_str()))
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new()
    }
}
