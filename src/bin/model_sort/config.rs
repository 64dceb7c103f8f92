//! Configuration for `ModelSort`.
//!
//! Handles reading configuration from CLI arguments and the user config file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use serde::Deserialize;

use modelsort::print_warning;

use crate::Args;

/// File names that are never grouped or acted on.
const DEFAULT_IGNORE_FILES: &[&str] = &["modelsort.json"];

/// Config from the user config file (`modelsort.json`).
///
/// All keys are additive to the built-in defaults.
#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    /// Filename suffixes to skip entirely.
    #[serde(default)]
    pub(crate) ignore_extensions: Vec<String>,
    /// Exact file names to skip entirely.
    #[serde(default)]
    pub(crate) ignore_files: Vec<String>,
    /// Directory basenames pruned during the scan.
    #[serde(default)]
    pub(crate) ignore_folders: Vec<String>,
    /// Exact stem or version-family base names to drop.
    #[serde(default)]
    pub(crate) ignore_groups: Vec<String>,
}

/// Exclusion rules built once at startup and passed by reference.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    pub(crate) extensions: HashSet<String>,
    pub(crate) files: HashSet<String>,
    pub(crate) folders: HashSet<String>,
    pub(crate) groups: HashSet<String>,
}

/// Final config created from CLI arguments and the user config file.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub(crate) confirm: bool,
    pub(crate) delete_duplicates: bool,
    pub(crate) delete_orphans: bool,
    pub(crate) ignore: IgnoreRules,
    pub(crate) move_files: bool,
    pub(crate) show_unknown: bool,
    pub(crate) verbose: bool,
    pub(crate) versions: bool,
}

impl UserConfig {
    /// Read user config from the first config file found.
    ///
    /// Checks next to the executable first, then `$HOME/.config/modelsort.json`.
    /// A missing file means defaults; a file that exists but cannot be read or
    /// parsed is reported and ignored so processing continues with defaults.
    pub(crate) fn load() -> Self {
        let candidates = [
            modelsort::config::EXE_CONFIG_PATH.as_deref(),
            modelsort::config::CONFIG_PATH.as_deref(),
        ];
        for path in candidates.into_iter().flatten() {
            match Self::read_file(path) {
                Ok(Some(config)) => {
                    println!("{}", format!("Loaded configuration from {}", path.display()).blue());
                    return config;
                }
                Ok(None) => {}
                Err(error) => {
                    print_warning!("{error}");
                    return Self::default();
                }
            }
        }
        Self::default()
    }

    /// Read and parse one candidate config file.
    /// Returns `Ok(None)` when the file does not exist.
    fn read_file(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_json_str(&content)
                .map(Some)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse configuration from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the JSON string is invalid.
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        serde_json::from_str::<Self>(json_str).map_err(|e| anyhow::anyhow!("Invalid JSON: {e}"))
    }
}

impl IgnoreRules {
    /// Merge built-in defaults with the user config (additive union).
    #[must_use]
    pub fn from_user_config(user_config: UserConfig) -> Self {
        let mut files: HashSet<String> = DEFAULT_IGNORE_FILES.iter().map(ToString::to_string).collect();
        files.extend(user_config.ignore_files);
        Self {
            extensions: user_config.ignore_extensions.into_iter().collect(),
            files,
            folders: user_config.ignore_folders.into_iter().collect(),
            groups: user_config.ignore_groups.into_iter().collect(),
        }
    }

    /// True when the file should be skipped by name or by extension suffix.
    pub(crate) fn skip_file(&self, filename: &str) -> bool {
        self.files.contains(filename) || self.extensions.iter().any(|ext| filename.ends_with(ext.as_str()))
    }

    /// True when a directory with this basename should be pruned from the scan.
    pub(crate) fn skip_folder(&self, basename: &str) -> bool {
        self.folders.contains(basename)
    }

    /// True when the stem or version-family base should be dropped.
    pub(crate) fn skip_group(&self, name: &str) -> bool {
        self.groups.contains(name)
    }
}

impl Config {
    /// Create config from given command line args and the user config file.
    #[must_use]
    pub fn from_args(args: Args) -> Self {
        let ignore = IgnoreRules::from_user_config(UserConfig::load());
        Self {
            confirm: args.confirm,
            delete_duplicates: args.delete_duplicates,
            delete_orphans: args.delete_orphans,
            ignore,
            move_files: args.move_files,
            show_unknown: args.show_unknown,
            verbose: args.verbose,
            versions: args.versions,
        }
    }

    /// True when any mutating flag was given; otherwise the run is a dry run.
    pub(crate) const fn mutating(&self) -> bool {
        self.move_files || self.delete_orphans || self.delete_duplicates
    }
}
