mod analyzer;
mod catalog;
mod classify;
mod competitors;
mod config;
mod db;
mod fetch;
mod models;
mod parser;
mod service;
mod utils;

use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use service::{AnalyzeRequest, Service, ServiceError};

#[derive(Parser)]
#[command(name = "storefront_insights", about = "Brand insights from Shopify storefronts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a storefront and print the result as JSON
    Analyze {
        /// Store URL, with or without scheme
        url: String,
        /// Also discover and analyze competing stores
        #[arg(long)]
        competitors: bool,
        /// Save results to the local database
        #[arg(long)]
        persist: bool,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Stored brands overview table
    Brands {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show database totals
    Stats,
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            url,
            competitors,
            persist,
            compact,
        } => {
            let conn = if persist {
                let conn = db::connect(&settings.db_path)?;
                db::init_schema(&conn)?;
                Some(conn)
            } else {
                None
            };

            let factory = service::http_fetchers(&settings);
            let service = Service::new(&settings, &factory);
            let request = AnalyzeRequest {
                website_url: url.clone(),
                include_competitors: competitors,
                persist,
            };

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap(),
            );
            spinner.set_message(format!("Analyzing {}", url));
            spinner.enable_steady_tick(Duration::from_millis(120));
            let outcome = service.handle(&request, conn.as_ref());
            spinner.finish_and_clear();

            match outcome {
                Ok(response) => {
                    let json = if compact {
                        serde_json::to_string(&response)?
                    } else {
                        serde_json::to_string_pretty(&response)?
                    };
                    println!("{}", json);
                    if persist {
                        eprintln!(
                            "Saved {} brand(s) to {}",
                            1 + response.competitor_contexts.len(),
                            settings.db_path
                        );
                    }
                    Ok(())
                }
                Err(ServiceError::NotFound(message)) => {
                    eprintln!("{}", message);
                    std::process::exit(2);
                }
                Err(ServiceError::Internal(e)) => Err(e),
            }
        }
        Commands::Brands { limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, limit)?;
            if rows.is_empty() {
                println!("No brands stored. Run 'analyze <URL> --persist' first.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<20} | {:<36} | {:>8} | {:>4} | {:<20}",
                "#", "Brand", "Website", "Products", "FAQs", "Analyzed"
            );
            println!("{}", "-".repeat(106));

            for (i, r) in rows.iter().enumerate() {
                let analyzed = r.analyzed_at.get(..19).unwrap_or(&r.analyzed_at);
                println!(
                    "{:>3} | {:<20} | {:<36} | {:>8} | {:>4} | {:<20}",
                    i + 1,
                    truncate(&r.name, 20),
                    truncate(&r.website_url, 36),
                    r.products,
                    r.faqs,
                    analyzed
                );
            }

            println!("\n{} brands | {}", rows.len(), settings.db_path);
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Brands:   {}", s.brands);
            println!("Products: {}", s.products);
            println!("FAQs:     {}", s.faqs);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
