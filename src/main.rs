//! CLI entry point for scantree

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use scantree::{
    OutputConfig, RecursionFilter, ScanConfig, ScanError, Scanner, Tree, TreeFormatter,
    format_paths, print_json,
};
use tracing_subscriber::EnvFilter;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "scantree")]
#[command(about = "Scan a directory tree, detecting symlinks that loop back on themselves")]
#[command(version)]
struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Do not descend into symlinked directories
    #[arg(long = "no-follow-links")]
    no_follow_links: bool,

    /// Fail instead of recording symlinks that loop back into the scan
    #[arg(long = "no-cyclic-links")]
    no_cyclic_links: bool,

    /// Keep directories without any files below them
    #[arg(long = "include-empty")]
    include_empty: bool,

    /// Leave out symlinks to directories
    #[arg(long = "no-linked-dirs")]
    no_linked_dirs: bool,

    /// Leave out symlinks to files
    #[arg(long = "no-linked-files")]
    no_linked_files: bool,

    /// Only list files matching PATTERN, gitignore syntax (can be used multiple times)
    #[arg(short = 'm', long = "match", value_name = "PATTERN")]
    patterns: Vec<String>,

    /// Number of parallel workers for the file pass
    /// (0 = auto-detect, 1 = sequential, N = use N workers)
    #[arg(short = 'j', long = "jobs", default_value = "1")]
    jobs: usize,

    /// Output in JSON format
    #[arg(long = "json", conflicts_with_all = ["leaves", "files"])]
    json: bool,

    /// List every leaf (files, links, empty directories), one per line
    #[arg(long = "leaves", conflicts_with = "files")]
    leaves: bool,

    /// List every file, one per line
    #[arg(long = "files")]
    files: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Log scan progress to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "scantree=debug" } else { "scantree=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_scanner(args: &Args) -> Result<Scanner, ScanError> {
    let config = ScanConfig {
        follow_links: !args.no_follow_links,
        allow_cyclic_links: !args.no_cyclic_links,
        include_empty: args.include_empty,
        jobs: args.jobs,
        ..ScanConfig::default()
    };

    let mut filter = RecursionFilter::new()
        .linked_dirs(!args.no_linked_dirs)
        .linked_files(!args.no_linked_files);
    if !args.patterns.is_empty() {
        filter = filter.match_patterns(&args.patterns)?;
    }

    Ok(Scanner::new(config).with_filter(filter))
}

fn print_listing(listing: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(listing.as_bytes())?;
    stdout.flush()
}

fn render(tree: &Tree, args: &Args) -> io::Result<()> {
    if args.json {
        print_json(tree)
    } else if args.leaves {
        print_listing(&format_paths(&tree.leafpaths()))
    } else if args.files {
        print_listing(&format_paths(&tree.filepaths()))
    } else {
        let formatter = TreeFormatter::new(OutputConfig {
            use_color: should_use_color(args.color),
            ..OutputConfig::default()
        });
        formatter.print(tree)
    }
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbose);

    let tree = match build_scanner(&args).and_then(|scanner| scanner.scan(&args.path)) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("scantree: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = render(&tree, &args) {
        // a closed pipe is not worth reporting
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("scantree: error writing output: {}", e);
            process::exit(1);
        }
    }
}
