use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use page_normalizer::db;
use page_normalizer::model::ParseOptions;
use page_normalizer::parser::parse_content_with;
use page_normalizer::settings::Settings;

#[derive(Parser)]
#[command(name = "page_normalizer", about = "Normalize legacy page-builder HTML into structured content")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize one HTML file and print the result as JSON
    Parse {
        file: PathBuf,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Load HTML files into the content table (slug = file stem)
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Normalize every page without a stored parse
    Process {
        /// Max pages to process (default: all unprocessed)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Print the stored parse for a page
    Show { slug: String },
    /// Show processing statistics
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let settings = Settings::load()?;
    info!(settings = ?settings, "settings loaded");

    let result = match cli.command {
        Commands::Parse { file, pretty } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let content = parse_content_with(&raw, &settings.parse_options());
            let json = if pretty || settings.pretty {
                serde_json::to_string_pretty(&content)?
            } else {
                serde_json::to_string(&content)?
            };
            println!("{}", json);
            Ok(())
        }
        Commands::Import { files } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let mut imported = 0;
            for file in &files {
                let Some(slug) = file.file_stem().and_then(|s| s.to_str()) else {
                    warn!("Skipping {}: no usable file name", file.display());
                    continue;
                };
                let html = std::fs::read_to_string(file)
                    .with_context(|| format!("reading {}", file.display()))?;
                db::import_page(&conn, slug, &html)?;
                imported += 1;
            }
            println!("Imported {} pages into {}", imported, settings.db_path);
            Ok(())
        }
        Commands::Process { limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let pages = db::fetch_unprocessed(&conn, limit)?;
            if pages.is_empty() {
                println!("No unprocessed pages. Run 'import' first.");
                return Ok(());
            }
            println!("Processing {} pages...", pages.len());
            let counts = process_pages(&conn, &pages, &settings)?;
            counts.print();
            Ok(())
        }
        Commands::Show { slug } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            match db::fetch_parsed(&conn, &slug)? {
                Some(content) => println!("{}", serde_json::to_string_pretty(&content)?),
                None => println!("No parsed content for '{}'.", slug),
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Pages:       {}", s.pages);
            println!("Processed:   {}", s.processed);
            println!("Unprocessed: {}", s.pages - s.processed);
            println!("Sections:    {}", s.sections);
            println!("FAQs:        {}", s.faqs);
            println!("Quick links: {}", s.quick_links);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

#[derive(Default)]
struct ProcessCounts {
    pages: usize,
    sections: usize,
    key_takeaways: usize,
    faqs: usize,
    quick_links: usize,
}

impl ProcessCounts {
    fn print(&self) {
        println!(
            "Saved {} pages: {} sections, {} key takeaways, {} faqs, {} quick links.",
            self.pages, self.sections, self.key_takeaways, self.faqs, self.quick_links,
        );
    }
}

fn process_pages(
    conn: &rusqlite::Connection,
    pages: &[db::RawPage],
    settings: &Settings,
) -> Result<ProcessCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let options: ParseOptions = settings.parse_options();
    let mut counts = ProcessCounts::default();

    for chunk in pages.chunks(settings.batch_size.max(1)) {
        let rows: Vec<db::ParsedRow> = chunk
            .par_iter()
            .map(|page| db::ParsedRow {
                page_id: page.id,
                slug: page.slug.clone(),
                content: parse_content_with(&page.html, &options),
            })
            .collect();

        for row in &rows {
            counts.pages += 1;
            counts.sections += row.content.sections.len();
            counts.key_takeaways += row.content.key_takeaways.len();
            counts.faqs += row.content.faqs.len();
            counts.quick_links += row.content.quick_links.len();
        }

        if let Err(e) = db::save_parsed(conn, &rows) {
            warn!("Failed to save chunk starting at page {}: {}", chunk[0].slug, e);
            return Err(e);
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn help_needs_no_settings() {
        let err = Cli::try_parse_from(["page_normalizer", "--help"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn process_limit_parsed() {
        let cli = Cli::try_parse_from(["page_normalizer", "process", "-n", "5"]).unwrap();
        assert!(matches!(cli.command, Commands::Process { limit: Some(5) }));
    }
}
