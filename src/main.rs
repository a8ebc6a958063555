//! glyphdex - a multi-source icon asset indexer.
//!
//! Usage:
//!   glyphdex scan [PATH]          Scan a tree and show a summary
//!   glyphdex list [PATH]          List every discovered icon
//!   glyphdex lookup <KEY> [PATH]  Find one icon by name or path
//!   glyphdex export [PATH]        Export discovered icons to JSON
//!   glyphdex --help               Show help

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};

use glyphdex_core::{IconRecord, ScanConfig, read_record};
use glyphdex_session::{IconSession, ScanSummary, SessionContext};

#[derive(Parser)]
#[command(
    name = "glyphdex",
    version,
    about = "Multi-source icon asset indexer",
    long_about = "glyphdex discovers icon assets across a source tree (standalone \
                  files, generated library artifacts, inline markup) and merges \
                  them into one queryable index."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a tree and show a summary
    Scan {
        /// Root to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Generated library artifacts to extract as well
        #[arg(short, long)]
        library: Vec<PathBuf>,

        /// Maximum traversal depth
        #[arg(short, long)]
        depth: Option<u32>,

        /// Maximum number of matched files
        #[arg(short = 'n', long)]
        max_files: Option<usize>,
    },

    /// List every discovered icon
    List {
        /// Root to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Generated library artifacts to extract as well
        #[arg(short, long)]
        library: Vec<PathBuf>,

        /// Only show one source kind (workspace, library, inline, reference)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Find one icon by name or path
    Lookup {
        /// Icon name or path
        key: String,

        /// Root to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Generated library artifacts to extract as well
        #[arg(short, long)]
        library: Vec<PathBuf>,
    },

    /// Export discovered icons to JSON
    Export {
        /// Root to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Generated library artifacts to extract as well
        #[arg(short, long)]
        library: Vec<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Scan {
            path,
            library,
            depth,
            max_files,
        } => {
            let mut builder = ScanConfig::builder();
            if let Some(depth) = depth {
                builder.max_depth(depth);
            }
            if let Some(max_files) = max_files {
                builder.max_files(max_files);
            }
            let config = builder.build().map_err(|e| eyre!("{e}"))?;
            let (session, summary) = build_session(config, path, library).await?;
            print_summary(&session, &summary);
        }
        Command::List { path, library, kind } => {
            let kind = kind
                .map(|k| {
                    k.parse::<glyphdex_core::SourceKind>()
                        .map_err(|_| eyre!("unknown source kind: {k}"))
                })
                .transpose()?;
            let (session, _) = build_session(ScanConfig::default(), path, library).await?;
            let mut rows: Vec<(String, String, String)> = session.with_model(|model| {
                model
                    .index()
                    .all_icons()
                    .iter()
                    .map(|handle| {
                        let record = read_record(handle);
                        (
                            record.name.to_string(),
                            record.kind.to_string(),
                            record.defining_path.display().to_string(),
                        )
                    })
                    .collect()
            });
            rows.sort();
            for (name, row_kind, path) in rows {
                if kind.is_some_and(|k| k.to_string() != row_kind) {
                    continue;
                }
                println!("{name:<28} {row_kind:<12} {path}");
            }
        }
        Command::Lookup { key, path, library } => {
            let (session, _) = build_session(ScanConfig::default(), path, library).await?;
            match session.get_icon(&key).or_else(|| session.get_icon_by_path(&key)) {
                Some(handle) => {
                    let record = read_record(&handle);
                    println!("name:     {}", record.name);
                    println!("kind:     {}", record.kind);
                    println!("category: {}", record.category);
                    println!("path:     {}", record.defining_path.display());
                    if let Some(view_box) = &record.view_box {
                        println!("viewBox:  {view_box}");
                    }
                    if let Some(animation) = &record.animation {
                        println!(
                            "animated: {} {}ms {}",
                            animation.kind, animation.duration_ms, animation.timing
                        );
                    }
                }
                None => println!("No icon found for '{key}'"),
            }
        }
        Command::Export {
            path,
            library,
            output,
        } => {
            let (session, _) = build_session(ScanConfig::default(), path, library).await?;
            let records: Vec<IconRecord> = session.with_model(|model| {
                model
                    .index()
                    .all_icons()
                    .iter()
                    .map(|handle| read_record(handle).clone())
                    .collect()
            });
            let json = serde_json::to_string_pretty(&records)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .wrap_err_with(|| format!("writing {}", path.display()))?;
                    eprintln!("Exported {} icons to {}", records.len(), path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

async fn build_session(
    config: ScanConfig,
    root: PathBuf,
    library: Vec<PathBuf>,
) -> Result<(IconSession, ScanSummary)> {
    let session = IconSession::new(config, SessionContext::with_defaults())?
        .with_library_artifacts(library);
    let summary = session
        .rebuild(&root)
        .await
        .ok_or_else(|| eyre!("a scan is already in flight"))?;
    Ok((session, summary))
}

fn print_summary(session: &IconSession, summary: &ScanSummary) {
    println!("Workspace files: {}", summary.files_scanned);
    println!("Library icons:   {}", summary.library_icons);
    println!("Elapsed:         {:?}", summary.duration);
    session.with_model(|model| {
        for section in model.root_sections() {
            println!("  {:<22} {}", section.label, section.description);
        }
    });
    if summary.truncated {
        println!("Scan stopped at a configured ceiling; results are partial.");
    }
    if !summary.issues.is_empty() {
        println!("{} path(s) could not be read:", summary.issues.len());
        for issue in &summary.issues {
            println!("  {} ({}): {}", issue.path.display(), issue.code, issue.message);
        }
    }
}
