use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use itertools::Itertools;
use walkdir::WalkDir;

use modelsort::{print_error, print_warning};

use crate::Args;
use crate::config::Config;
use crate::extensions::{ExtensionSet, FileKind};
use crate::groups::{self, Groups, UNKNOWN_GROUP};
use crate::types::FileRecord;

pub struct ModelSort {
    config: Config,
    extensions: ExtensionSet,
    root: PathBuf,
}

/// Counters for the final summary.
#[derive(Debug, Default)]
struct RunTotals {
    duplicates_deleted: usize,
    files_moved: usize,
    orphans_deleted: usize,
}

impl ModelSort {
    /// Init new instance with CLI args.
    pub fn new(args: Args) -> Result<Self> {
        let root = modelsort::resolve_input_path(args.path.as_deref())?;
        let config = Config::from_args(args);
        Ok(Self {
            config,
            extensions: ExtensionSet::new(),
            root,
        })
    }

    /// Run sorting with given args.
    #[inline]
    pub fn run_with_args(args: Args) -> Result<()> {
        Self::new(args)?.run()
    }

    /// Scan the tree, group files, and report or apply actions.
    pub fn run(&self) -> Result<()> {
        // SIGINT aborts the whole run immediately, also mid-prompt
        ctrlc::set_handler(|| {
            println!("\n{}", "Aborted".red());
            std::process::exit(130);
        })?;

        println!("Scanning {}...", self.root.display());
        let files = self.gather_files();
        if files.is_empty() {
            println!("No files found");
            return Ok(());
        }

        let groups = groups::group_files(files, &self.extensions, &self.config.ignore);
        if self.config.versions {
            self.show_versions(&groups);
            Ok(())
        } else {
            self.clean(&groups)
        }
    }

    /// Collect all files under the root, pruning ignored directories.
    fn gather_files(&self) -> Vec<FileRecord> {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !self
                        .config
                        .ignore
                        .skip_folder(&modelsort::path_to_filename_string(entry.path()))
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(error) => {
                    print_warning!("Error scanning directory: {error}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| FileRecord::new(entry.into_path()))
            .collect()
    }

    /// Standard cleanup mode: report groups and apply orphan / duplicate /
    /// move actions according to the enabled flags.
    fn clean(&self, groups: &Groups) -> Result<()> {
        let mut totals = RunTotals::default();

        // Sort groups by stem for consistent output, unknown bucket last
        let mut stems: Vec<&String> = groups
            .keys()
            .filter(|stem| stem.as_str() != UNKNOWN_GROUP)
            .sorted()
            .collect();
        if let Some((unknown, _)) = groups.get_key_value(UNKNOWN_GROUP) {
            stems.push(unknown);
        }

        for stem in stems {
            let Some(files) = groups.get(stem) else {
                continue;
            };
            let plan = groups::plan_group(files, &self.extensions);
            let is_unknown = stem.as_str() == UNKNOWN_GROUP;
            let should_print =
                self.config.verbose || plan.has_actions() || (is_unknown && self.config.show_unknown);
            if !should_print {
                continue;
            }

            println!("\n{}", format!("Group: {stem}").magenta().bold());
            for file in files {
                println!(
                    "  - {} ({})",
                    self.highlight_extension(&file.name),
                    self.display_dir(file.parent())
                );
            }
            if is_unknown {
                Self::print_unknown_extensions(files);
            }

            if !plan.orphans.is_empty() {
                println!("  {} No model found", "[ORPHAN]".red());
                if self.config.delete_orphans {
                    for orphan in &plan.orphans {
                        if self.config.confirm
                            && !Self::confirm_action(&format!("Delete orphan {}?", orphan.name))?
                        {
                            continue;
                        }
                        println!("  {}", format!("Deleting orphan: {}", orphan.name).red());
                        match fs::remove_file(&orphan.path) {
                            Ok(()) => totals.orphans_deleted += 1,
                            Err(error) => print_error!("Failed to delete {}: {error}", orphan.name),
                        }
                    }
                }
            }

            for duplicates in &plan.duplicates {
                println!(
                    "  {} Found {} files for extension {}",
                    "[DUPLICATE]".yellow(),
                    duplicates.files.len(),
                    duplicates.extension
                );
                if self.config.delete_duplicates {
                    let keeper = &duplicates.files[duplicates.keeper];
                    for (index, file) in duplicates.files.iter().enumerate() {
                        if index == duplicates.keeper {
                            continue;
                        }
                        if self.config.confirm
                            && !Self::confirm_action(&format!(
                                "Delete duplicate {} (keeping {})?",
                                file.path.display(),
                                keeper.path.display()
                            ))?
                        {
                            continue;
                        }
                        println!("  {}", format!("Deleting duplicate: {}", file.name).red());
                        match fs::remove_file(&file.path) {
                            Ok(()) => totals.duplicates_deleted += 1,
                            Err(error) => print_error!("Failed to delete {}: {error}", file.name),
                        }
                    }
                }
            }

            if let Some(target_dir) = &plan.target_dir {
                for sidecar in &plan.moves {
                    // An earlier duplicate deletion may have removed this file
                    if !sidecar.path.exists() {
                        continue;
                    }
                    println!(
                        "  {} {} -> {}",
                        "[MOVE]".cyan(),
                        sidecar.name,
                        self.display_dir(target_dir)
                    );
                    if self.config.move_files {
                        let destination = target_dir.join(&sidecar.name);
                        if destination.exists() {
                            println!(
                                "    {}",
                                format!("Skipping move: {} already exists at destination", sidecar.name).yellow()
                            );
                            continue;
                        }
                        if self.config.confirm
                            && !Self::confirm_action(&format!(
                                "Move {} to {}?",
                                sidecar.name,
                                target_dir.display()
                            ))?
                        {
                            continue;
                        }
                        match fs::rename(&sidecar.path, &destination) {
                            Ok(()) => {
                                totals.files_moved += 1;
                                println!("    {}", "Moved".green());
                            }
                            Err(error) => print_error!("Failed to move {}: {error}", sidecar.name),
                        }
                    }
                }
            }
        }

        if self.config.mutating() {
            println!("\n{}", "--- OPERATION COMPLETE ---".bold());
            println!("Moved: {}", totals.files_moved);
            println!("Orphans deleted: {}", totals.orphans_deleted);
            println!("Duplicates deleted: {}", totals.duplicates_deleted);
        } else {
            println!("\n{}", "--- DRY RUN COMPLETE ---".bold());
            println!("No changes were made. Use --move, --delete-orphans, or --delete-duplicates to apply changes");
        }

        Ok(())
    }

    /// Version detection mode: list version families and potential orphan matches.
    fn show_versions(&self, groups: &Groups) {
        println!("\n{}", "--- DETECTING VERSIONS ---".bold());
        let versions = groups::detect_versions(groups, &self.extensions, &self.config.ignore);
        let orphan_matches = groups::match_orphans(groups, &self.extensions, &versions);

        if versions.is_empty() {
            println!("No multi-version models detected");
        } else {
            // Sort families by top-level folder, then base name
            for (base, stems) in versions
                .iter()
                .sorted_by_key(|(base, stems)| self.version_sort_key(groups, base, stems))
            {
                println!("\n{}", format!("Model group: {base}").magenta().bold());
                for stem in stems {
                    let Some(files) = groups.get(stem) else {
                        continue;
                    };
                    let status = if groups::group_has_model(files, &self.extensions) {
                        "[MODEL]".green()
                    } else {
                        "[ORPHAN]".red()
                    };
                    println!("  - {stem} ({} files) {status}", files.len());
                    for file in files {
                        println!(
                            "      {} [{}]",
                            self.highlight_extension(&file.name),
                            self.display_dir(file.parent()).blue()
                        );
                    }
                }
            }
        }

        if !orphan_matches.is_empty() {
            println!("\n{}", "--- POTENTIAL ORPHAN MATCHES ---".bold());
            for (orphan, base) in &orphan_matches {
                println!("  {} seems related to group {}", orphan.blue(), base.magenta());
            }
        }
    }

    /// Sort key for a version family: the family's top-level folder under
    /// the root (preferring a model file as representative), then the base.
    fn version_sort_key(&self, groups: &Groups, base: &str, stems: &[String]) -> (String, String) {
        for stem in stems {
            if let Some(files) = groups.get(stem) {
                for file in files {
                    if self.extensions.classify(&file.name) == FileKind::Model {
                        return (self.top_level_folder(file), base.to_string());
                    }
                }
            }
        }
        // No model anywhere, fall back to any file
        for stem in stems {
            if let Some(file) = groups.get(stem).and_then(|files| files.first()) {
                return (self.top_level_folder(file), base.to_string());
            }
        }
        (String::new(), base.to_string())
    }

    /// First path component of the file's directory relative to the root,
    /// or an empty string for files directly in the root.
    fn top_level_folder(&self, file: &FileRecord) -> String {
        file.parent()
            .strip_prefix(&self.root)
            .ok()
            .and_then(|relative| relative.components().next())
            .map(|component| modelsort::os_str_to_string(component.as_os_str()))
            .unwrap_or_default()
    }

    /// Directory shown relative to the scan root where possible.
    fn display_dir(&self, dir: &Path) -> String {
        dir.strip_prefix(&self.root).map_or_else(
            |_| modelsort::path_to_string(dir),
            |relative| {
                let text = modelsort::path_to_string(relative);
                if text.is_empty() { ".".to_string() } else { text }
            },
        )
    }

    /// Return the filename with its extension colorized by kind.
    fn highlight_extension(&self, filename: &str) -> String {
        self.extensions.split(filename).map_or_else(
            || filename.to_string(),
            |(stem, extension)| {
                let colored_extension = match self.extensions.classify(filename) {
                    FileKind::Model => extension.green(),
                    FileKind::Sidecar => extension.cyan(),
                    FileKind::Other => extension.yellow(),
                };
                format!("{stem}{colored_extension}")
            },
        )
    }

    /// List the extensions seen in the unknown bucket.
    fn print_unknown_extensions(files: &[FileRecord]) {
        let extensions: BTreeSet<String> = files
            .iter()
            .map(|file| modelsort::path_to_file_extension_string(&file.path))
            .filter(|extension| !extension.is_empty())
            .map(|extension| format!(".{extension}"))
            .collect();
        if !extensions.is_empty() {
            println!(
                "\n  {}",
                format!("Unknown extensions found: {}", extensions.iter().join(", ")).bold()
            );
        }
    }

    /// Ask user for confirmation. Returns true if confirmed.
    /// Closed stdin cancels the whole run.
    fn confirm_action(prompt: &str) -> Result<bool> {
        print!("{} [y/N]: ", prompt.yellow());
        std::io::stdout().flush()?;

        let mut input = String::new();
        let bytes_read = std::io::stdin().read_line(&mut input)?;
        if bytes_read == 0 {
            anyhow::bail!("Operation cancelled");
        }
        Ok(input.trim().eq_ignore_ascii_case("y"))
    }
}
