//! # Pool Dashboard
//!
//! Command-line renderer for the TELx pool pipeline: fetches pool data from
//! the first working endpoint, then prints the aggregate stat tiles and the
//! per-pool table. On total endpoint exhaustion it degrades to a
//! placeholder table and points at the canonical dashboard instead of
//! failing loudly.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin pool_dashboard
//! cargo run --bin pool_dashboard -- --endpoint https://example.org/pools.json
//! ```

use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::error;

use telx_pools::format::{format_aggregate, format_currency, format_percent, format_token, PLACEHOLDER};
use telx_pools::extractor::ValueUnit;
use telx_pools::{MetricKind, PoolDataPipeline, PoolSnapshot, Settings};

#[derive(Debug, Parser)]
#[command(name = "pool_dashboard", about = "Render TELx pool metrics in the terminal")]
struct Args {
    /// Override endpoint, tried before all configured sources.
    #[arg(long)]
    endpoint: Option<String>,

    /// Disable proxy mirror variants (direct endpoints only).
    #[arg(long)]
    no_proxies: bool,

    /// Per-attempt request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Emit the snapshot as JSON instead of the table view.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    let mut settings = Settings::new()?;
    env_logger::Builder::from_env(Env::default().default_filter_or(settings.log.level.as_str()))
        .init();

    // CLI flags win over Config.toml and environment.
    if let Some(endpoint) = args.endpoint {
        settings.endpoints.r#override = Some(endpoint);
    }
    if args.no_proxies {
        settings.endpoints.enable_proxies = false;
    }
    if let Some(timeout) = args.timeout {
        settings.http.timeout_seconds = timeout;
    }

    let mut pipeline = PoolDataPipeline::new(settings)?;

    match pipeline.refresh().await {
        Ok(snapshot) => {
            if args.json {
                println!("{}", snapshot_json(&snapshot)?);
            } else {
                render_snapshot(&snapshot);
            }
            Ok(())
        }
        Err(err) => {
            error!("{err}");
            render_unavailable();
            std::process::exit(1);
        }
    }
}

fn render_snapshot(snapshot: &PoolSnapshot) {
    println!();
    println!("{}", "TELx Liquidity Pools".bold());
    println!(
        "{}",
        format!("fetched {}", snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")).dimmed()
    );
    println!();

    for kind in MetricKind::ALL {
        let aggregate = &snapshot.aggregates[&kind];
        let currency = telx_pools::extractor::metric_config(kind).unit == ValueUnit::Currency;
        println!("  {:<20} {}", kind.label(), format_aggregate(aggregate, currency));
    }
    println!();

    println!(
        "  {:<24} {:>12} {:>14} {:>12} {:>10} {:>9}",
        "Pool", "TVL", "Staked", "Volume", "Fees", "24h"
    );
    for summary in &snapshot.summaries {
        println!(
            "  {:<24} {:>12} {:>14} {:>12} {:>10} {:>9}",
            summary.name,
            format_currency(summary.tvl.value),
            format_token(summary.staked.value),
            format_currency(summary.volume.value),
            format_currency(summary.fees.value),
            format_percent(summary.tvl.percent),
        );
    }
    println!();
}

fn render_unavailable() {
    println!();
    println!("{}", "TELx Liquidity Pools".bold());
    println!();
    for kind in MetricKind::ALL {
        println!("  {:<20} {PLACEHOLDER}", kind.label());
    }
    println!();
    println!(
        "{}",
        "Pool data is currently unavailable. See the official dashboard at https://www.telx.network/pools."
            .yellow()
    );
    println!();
}

fn snapshot_json(snapshot: &PoolSnapshot) -> anyhow::Result<String> {
    let aggregates: serde_json::Map<String, serde_json::Value> = snapshot
        .aggregates
        .iter()
        .map(|(kind, aggregate)| {
            Ok((kind.key().to_string(), serde_json::to_value(aggregate)?))
        })
        .collect::<Result<_, serde_json::Error>>()?;
    let value = serde_json::json!({
        "fetched_at": snapshot.fetched_at.to_rfc3339(),
        "pools": snapshot.summaries,
        "aggregates": aggregates,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
