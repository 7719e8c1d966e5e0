// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use gestman_model::{PartMetadata, Segment, SparePartId};
use gestman_resolver::{HttpCatalog, ResolverState, SparePartCatalog, SparePartResolver};
use serde_json::json;
use std::io::Read;
use std::process::ExitCode as ProcessExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const EXIT_OK: u8 = 0;
const EXIT_USAGE: u8 = 1;
const EXIT_BACKEND: u8 = 2;

#[derive(Parser)]
#[command(name = "gestman")]
#[command(about = "GESTMAN spare-part reference tools")]
struct Cli {
    /// Base URL of the GESTMAN backend
    #[arg(long, global = true, env = "GESTMAN_API_BASE", default_value = "http://127.0.0.1:5000")]
    base_url: String,
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment a text into plain runs and catalog-confirmed references
    Segment {
        /// Text to scan; reads stdin when omitted
        text: Option<String>,
    },
    /// Enumerate all spare-part IDs known to the catalog
    Ids,
    /// Validate IDs against the catalog and show their warehouse records
    Check {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("GESTMAN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ProcessExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(base_url = %cli.base_url, "gestman cli starting");

    let catalog = Arc::new(HttpCatalog::new(cli.base_url.as_str()));
    let code = match cli.command {
        Commands::Segment { ref text } => run_segment(&cli, catalog, text.clone()).await,
        Commands::Ids => run_ids(&cli, catalog).await,
        Commands::Check { ref ids } => run_check(&cli, catalog, ids).await,
    };
    ProcessExitCode::from(code)
}

async fn run_segment(cli: &Cli, catalog: Arc<HttpCatalog>, text: Option<String>) -> u8 {
    let text = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            if std::io::stdin().read_to_string(&mut buf).is_err() {
                eprintln!("error: stdin is not valid UTF-8");
                return EXIT_USAGE;
            }
            buf
        }
    };

    let resolver = SparePartResolver::new(catalog);
    let state = resolver.ensure_ready().await;
    let segments = resolver.segment(&text).await;

    if cli.json {
        match serde_json::to_string_pretty(&segments) {
            Ok(out) => println!("{out}"),
            Err(err) => {
                eprintln!("error: {err}");
                return EXIT_USAGE;
            }
        }
    } else {
        println!("{}", render_marked(&segments));
        let report = render_report(&segments);
        if !report.is_empty() {
            println!("\n{report}");
        }
    }

    if state == ResolverState::Ready {
        EXIT_OK
    } else {
        // text was still printed, unsegmented; signal the degraded run
        EXIT_BACKEND
    }
}

async fn run_ids(cli: &Cli, catalog: Arc<HttpCatalog>) -> u8 {
    match catalog.fetch_all_ids().await {
        Ok(ids) => {
            if cli.json {
                println!("{}", json!({ "ricambi_ids": ids }));
            } else {
                for id in ids {
                    println!("{id}");
                }
            }
            EXIT_OK
        }
        Err(err) => {
            eprintln!("error: {err}");
            EXIT_BACKEND
        }
    }
}

async fn run_check(cli: &Cli, catalog: Arc<HttpCatalog>, raw_ids: &[String]) -> u8 {
    let mut ids = Vec::with_capacity(raw_ids.len());
    for raw in raw_ids {
        match SparePartId::parse(raw) {
            Ok(id) => ids.push(id),
            Err(err) => {
                eprintln!("error: {err}");
                return EXIT_USAGE;
            }
        }
    }

    let resolver = SparePartResolver::new(catalog);
    if resolver.ensure_ready().await != ResolverState::Ready {
        eprintln!("error: catalog unreachable at this base URL");
        return EXIT_BACKEND;
    }
    let info = resolver.metadata_for(&ids).await;

    if cli.json {
        let mut out = serde_json::Map::new();
        for id in &ids {
            let known = resolver.is_known(id).await;
            out.insert(
                id.as_str().to_string(),
                json!({ "known": known, "metadata": info.get(id).cloned().flatten() }),
            );
        }
        println!("{}", serde_json::Value::Object(out));
    } else {
        for id in &ids {
            if resolver.is_known(id).await {
                println!("{id}: known");
                if let Some(meta) = info.get(id).cloned().flatten() {
                    print!("{}", render_metadata(&meta));
                }
            } else {
                println!("{id}: not in catalog");
            }
        }
    }
    EXIT_OK
}

/// Plain rendering with confirmed references bracketed, in place.
fn render_marked(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text { content } => out.push_str(content),
            Segment::Reference { content, .. } => {
                out.push('[');
                out.push_str(content);
                out.push(']');
            }
        }
    }
    out
}

/// One block per distinct reference, with the tooltip fields.
fn render_report(segments: &[Segment]) -> String {
    let mut out = String::new();
    let mut seen = std::collections::HashSet::new();
    for segment in segments {
        if let Segment::Reference { id, metadata, .. } = segment {
            if !seen.insert(id.as_str()) {
                continue;
            }
            out.push_str(id.as_str());
            out.push('\n');
            match metadata {
                Some(meta) => out.push_str(&render_metadata(meta)),
                None => out.push_str("  (no warehouse record)\n"),
            }
        }
    }
    out
}

fn render_metadata(meta: &PartMetadata) -> String {
    let mut out = String::new();
    if let Some(asset_type) = &meta.asset_type {
        out.push_str(&format!("  type:     {asset_type}\n"));
    }
    if let Some(quantity) = meta.quantity_available {
        let unit = meta.unit.as_deref().unwrap_or("pz");
        out.push_str(&format!("  quantity: {quantity} {unit}\n"));
    }
    if let Some(supplier) = &meta.supplier {
        out.push_str(&format!("  supplier: {supplier}\n"));
    }
    if let Some(price) = meta.unit_price {
        out.push_str(&format!("  price:    {price:.2}\n"));
    }
    if meta.low_stock {
        out.push_str("  low stock\n");
    }
    out
}
