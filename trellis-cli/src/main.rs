//! Trellis CLI - resolve and search wiki-linked document collections

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use trellis_core::{resolver, CollectionIndex, Config};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Wiki-link resolution and search", long_about = None)]
struct Cli {
    /// Collection root directory
    #[arg(long, global = true, env = "TRELLIS_ROOT", default_value = "./wiki")]
    root: PathBuf,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a link token to document metadata
    Resolve {
        /// Link token as written inside [[...]]
        token: String,

        /// Document the link appears in (defaults to the collection root)
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Search documents matching a partial query
    Search {
        /// Query string (omit to list every document)
        query: Option<String>,

        /// Document the completion is requested from
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Show index status
    Status,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let config = Config::load_for_root(&cli.root);
    let mut index = CollectionIndex::new(cli.root.clone(), config);

    match cli.command {
        Commands::Resolve { token, from } => cmd_resolve(&mut index, &token, from, cli.json),
        Commands::Search { query, from } => {
            cmd_search(&mut index, query.as_deref().unwrap_or(""), from, cli.json)
        }
        Commands::Status => cmd_status(&mut index, cli.json),
    }
}

/// Default requesting document when --from is omitted: a phantom document
/// directly under the collection root.
fn requesting_doc(root: &std::path::Path, from: Option<PathBuf>) -> PathBuf {
    from.unwrap_or_else(|| root.join("_.md"))
}

fn cmd_resolve(index: &mut CollectionIndex, token: &str, from: Option<PathBuf>, json: bool) {
    let document = requesting_doc(index.root(), from);
    let metadata = resolver::resolve_link(index, token, document.parent());

    match metadata {
        Some(metadata) if json => {
            println!("{}", serde_json::to_string_pretty(&metadata).unwrap());
        }
        Some(metadata) => {
            if metadata.exists {
                println!("{}", metadata.title.bold());
                if let Some(summary) = &metadata.summary {
                    println!("{}", summary);
                }
                if let Some(updated) = &metadata.updated {
                    println!("{} {}", "updated".dimmed(), updated);
                }
            } else {
                println!("{} {}", metadata.title.bold(), "(not found)".red());
            }
        }
        None => {
            eprintln!("{}: empty token or missing context", "error".red());
            std::process::exit(1);
        }
    }
}

fn cmd_search(index: &mut CollectionIndex, query: &str, from: Option<PathBuf>, json: bool) {
    let document = requesting_doc(index.root(), from);
    let items = resolver::completions(index, query, &document);

    if json {
        println!("{}", serde_json::to_string_pretty(&items).unwrap());
        return;
    }

    if items.is_empty() {
        println!("{}", "no matches".dimmed());
        return;
    }

    for item in items {
        println!("{:<30} {}", item.insert_text.bold(), item.group.dimmed());
    }
}

fn cmd_status(index: &mut CollectionIndex, json: bool) {
    index.ensure_initialized();
    let status = index.status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status).unwrap());
        return;
    }

    println!("{}: {}", "root".bold(), index.root().display());
    println!("{}: {}", "documents cached".bold(), status.cache_entries);
    println!("{}: {}", "index keys".bold(), status.index_keys);
    if let Some(last_scan) = &status.last_scan {
        println!("{}: {}", "last scan".bold(), last_scan);
    }
}
