use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use newsletter_catalog::query::ALL;
use newsletter_catalog::render::render_response_text;
use newsletter_catalog::{Catalog, CatalogConfig, HttpFetcher, Response, StatusMessage};

/// Newsletter Catalog - browse and search an article archive
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Origin the feeds are served from (overrides the config file)
    #[arg(short, long, env = "CATALOG_BASE_URL")]
    base_url: Option<String>,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<String>,

    /// Keywords, separated by spaces; empty lists everything
    #[arg(short, long, default_value = "")]
    query: String,

    /// Publication year, or "all"
    #[arg(short, long, default_value = "all")]
    year: String,

    /// Category id or name, or "all"
    #[arg(long, default_value = "all")]
    category: String,

    /// Print the response as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn resolve_config(args: &Args) -> Result<CatalogConfig> {
    let mut cfg = match args.config {
        Some(ref path) => {
            debug!("Using config file from --config argument: {}", path);
            CatalogConfig::from_file(std::path::Path::new(path))?
        }
        None => CatalogConfig::default(),
    };
    if let Some(ref base_url) = args.base_url {
        cfg.base_url = base_url.clone();
    }
    Ok(cfg)
}

fn emit(response: &Response, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(response).context("serializing response")?
        );
    } else {
        print!("{}", render_response_text(response));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = resolve_config(&args)?;
    info!("Starting newsletter_catalog - base_url={:?}", cfg.base_url);
    eprintln!("{}", StatusMessage::Loading);

    let client = reqwest::Client::builder()
        .build()
        .context("building HTTP client")?;
    let fetcher = Arc::new(HttpFetcher::new(client));

    let catalog = match Catalog::open(fetcher, cfg).await {
        Ok(catalog) => catalog,
        Err(status) => return emit(&Response::Status(status), args.json),
    };

    let response = if args.query.trim().is_empty() && args.year == ALL && args.category == ALL {
        catalog.initial_view()
    } else {
        catalog.search(&args.query, &args.year, &args.category).await
    };
    emit(&response, args.json)
}
