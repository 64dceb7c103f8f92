mod config;
mod extensions;
mod groups;
mod model_sort;
mod types;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::model_sort::ModelSort;

#[derive(Parser)]
#[command(author, version, name = env!("CARGO_BIN_NAME"), about = "Organize model files and their sidecar metadata")]
pub(crate) struct Args {
    /// Optional root directory to scan
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Move sidecars to their model's directory
    #[arg(short = 'm', long = "move")]
    move_files: bool,

    /// Delete sidecars that have no corresponding model
    #[arg(short = 'o', long)]
    delete_orphans: bool,

    /// Delete duplicate sidecars, keeping the one next to the model
    #[arg(short = 'd', long)]
    delete_duplicates: bool,

    /// Ask for confirmation before every action
    #[arg(short = 'c', long)]
    confirm: bool,

    /// Show version families instead of cleanup actions
    #[arg(short = 's', long)]
    versions: bool,

    /// Show files that were not categorized into groups
    #[arg(short = 'u', long)]
    show_unknown: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Show all groups, even those without pending actions
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        modelsort::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        ModelSort::run_with_args(args)
    }
}

#[cfg(test)]
mod cli_args_tests {
    use super::*;

    #[test]
    fn parses_path_argument() {
        let args = Args::try_parse_from(["test", "/models/loras"]).expect("should parse");
        assert_eq!(args.path, Some(PathBuf::from("/models/loras")));
    }

    #[test]
    fn parses_move_flag() {
        let args = Args::try_parse_from(["test", "-m"]).expect("should parse");
        assert!(args.move_files);

        let args = Args::try_parse_from(["test", "--move"]).expect("should parse");
        assert!(args.move_files);
    }

    #[test]
    fn parses_delete_flags() {
        let args = Args::try_parse_from(["test", "--delete-orphans"]).expect("should parse");
        assert!(args.delete_orphans);
        assert!(!args.delete_duplicates);

        let args = Args::try_parse_from(["test", "--delete-duplicates"]).expect("should parse");
        assert!(args.delete_duplicates);
        assert!(!args.delete_orphans);
    }

    #[test]
    fn parses_combined_flags() {
        let args = Args::try_parse_from(["test", "-modc"]).expect("should parse");
        assert!(args.move_files);
        assert!(args.delete_orphans);
        assert!(args.delete_duplicates);
        assert!(args.confirm);
    }

    #[test]
    fn parses_display_flags() {
        let args = Args::try_parse_from(["test", "-s", "-u", "-v"]).expect("should parse");
        assert!(args.versions);
        assert!(args.show_unknown);
        assert!(args.verbose);
    }

    #[test]
    fn empty_by_default() {
        let args = Args::try_parse_from(["test"]).expect("should parse");
        assert!(args.path.is_none());
        assert!(!args.move_files);
        assert!(!args.delete_orphans);
        assert!(!args.delete_duplicates);
        assert!(!args.confirm);
        assert!(!args.versions);
        assert!(!args.show_unknown);
        assert!(!args.verbose);
    }

    #[test]
    fn rejects_unknown_flag() {
        assert!(Args::try_parse_from(["test", "--frobnicate"]).is_err());
    }
}
