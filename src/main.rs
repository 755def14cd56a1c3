//! Brand Origin
//!
//! Looks a brand up on Wikidata and prints one row per matching entity:
//! - One-shot mode: `brand-origin <QUERY>`
//! - Interactive mode: run without a query and type brands at the prompt

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use brand_origin::utils::init_logging;
use brand_origin::{
    ConfigLoader, EntityResolver, ResolveError, Resolution, Table, TableOptions, WikidataSource,
};

const DEFAULT_QUERY: &str = "streamlit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Retrieve the origin of a brand from Wikidata
#[derive(Parser, Debug)]
#[command(name = "brand-origin", version)]
#[command(about = "Resolve a brand name against Wikidata", long_about = None)]
struct Args {
    /// Brand to look up; omit for interactive mode
    query: Option<String>,

    /// Minimum number of recognized attributes an entity must expose
    #[arg(short, long)]
    threshold: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "brand_origin.json")]
    config: PathBuf,

    /// Keep knowledge-base time literals instead of plain dates
    #[arg(long)]
    raw_dates: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

// ──────────────────────────────────────────────────────────────────────────────
// MAIN ENTRY POINT
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let mut config = ConfigLoader::new(&args.config).load().await?;
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    let source = Arc::new(WikidataSource::new(&config));
    let resolver = EntityResolver::new(source, config);
    let config = resolver.config();
    info!(
        "Endpoint {} | threshold {} | policy {} | {} attributes",
        config.endpoint,
        config.threshold,
        config.failure_policy,
        config.attributes.len()
    );
    let options = TableOptions {
        clean_dates: !args.raw_dates,
        ..TableOptions::default()
    };

    if let Some(query) = args.query.as_deref() {
        if !run_query(&resolver, query, args.format, &options).await {
            std::process::exit(1);
        }
        return Ok(());
    }

    println!("\n{}", "═".repeat(60));
    println!("🏷️  Brand origin");
    println!("{}", "═".repeat(60));
    println!("💡 Type a brand name, or 'quit' to leave.\n");

    loop {
        print!("🔎 Brand [{}]: ", DEFAULT_QUERY);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let query = match input.trim() {
            "" => DEFAULT_QUERY,
            q => q,
        };

        if matches!(query.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("\n👋 Goodbye!\n");
            break;
        }

        println!("\n⚙️  Resolving '{}'...\n", query);
        run_query(&resolver, query, args.format, &options).await;
        println!();
    }

    Ok(())
}

/// Resolve one query and print the outcome. Returns `false` on failure.
async fn run_query(resolver: &EntityResolver, query: &str, format: OutputFormat, options: &TableOptions) -> bool {
    match resolver.resolve(query).await {
        Ok(resolution) => {
            print_resolution(&resolution, format, options);
            true
        }
        Err(e @ ResolveError::NoResults(_)) => {
            eprintln!("❌ {}", e);
            eprintln!("Please try with another query.");
            false
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            false
        }
    }
}

fn print_resolution(resolution: &Resolution, format: OutputFormat, options: &TableOptions) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(resolution) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("❌ Error: {}", e),
        },
        OutputFormat::Table => {
            if resolution.is_empty() {
                println!("No entity exposes enough recognized attributes.");
            } else {
                let table = Table::from_resolution(resolution, options);
                println!("{}", table.render(options.max_cell_width));
            }
            if !resolution.issues.is_empty() {
                println!("\n⚠️  Skipped:");
                for issue in &resolution.issues {
                    match &issue.attribute {
                        Some(attribute) => println!("   • {} / {}: {}", issue.entity, attribute, issue.cause),
                        None => println!("   • {}: {}", issue.entity, issue.cause),
                    }
                }
            }
        }
    }
}
