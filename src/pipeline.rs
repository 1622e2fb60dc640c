// src/pipeline.rs
//
// Entry point tying the stages together. All state lives in an explicit
// context object owned by the caller; its lifetime is the caller's
// mount/unmount, and `refresh` taking `&mut self` keeps a second in-flight
// run from starting while one is underway.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::debug;
use std::time::Duration;

use crate::aggregator::aggregate_metric;
use crate::endpoints::{resolve_endpoints, Endpoint};
use crate::extractor::{extract_metric, extract_name, metric_config, MetricKind};
use crate::fetcher::{fetch_pools, FetchError};
use crate::pools::{AggregateResult, MetricResult, PoolSummary, PreparedPool, RawPool};
use crate::settings::Settings;

/// One completed render cycle: prepared pools, their presentation rows and
/// the cross-pool aggregates in metric declaration order.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub pools: Vec<PreparedPool>,
    pub summaries: Vec<PoolSummary>,
    pub aggregates: IndexMap<MetricKind, AggregateResult>,
    pub fetched_at: DateTime<Utc>,
}

/// Pipeline context: settings, the shared HTTP client and the resolved
/// endpoint order.
pub struct PoolDataPipeline {
    settings: Settings,
    client: reqwest::Client,
    endpoints: Vec<Endpoint>,
}

impl PoolDataPipeline {
    pub fn new(settings: Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.http.timeout_seconds))
            .user_agent(settings.http.user_agent.clone())
            .build()
            .context("failed to build HTTP client")?;
        let endpoints = resolve_endpoints(&settings);
        debug!("Resolved {} candidate endpoints", endpoints.len());
        Ok(Self {
            settings,
            client,
            endpoints,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Trial order, override first.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Fetch from the first working endpoint and derive a full snapshot.
    pub async fn refresh(&mut self) -> Result<PoolSnapshot, FetchError> {
        let raw = fetch_pools(&self.client, &self.endpoints).await?;
        Ok(prepare_snapshot(raw))
    }
}

/// Derive a snapshot from already-fetched raw pools. Pure apart from the
/// timestamp; this is the offline half of `refresh`, also used by tests.
pub fn prepare_snapshot(raw: Vec<RawPool>) -> PoolSnapshot {
    let pools: Vec<PreparedPool> = raw.into_iter().map(PreparedPool::new).collect();

    let summaries: Vec<PoolSummary> = pools
        .iter()
        .enumerate()
        .map(|(i, pool)| summarize_pool(pool, i))
        .collect();

    let mut aggregates = IndexMap::new();
    for kind in MetricKind::ALL {
        let results: Vec<MetricResult> = summaries
            .iter()
            .map(|summary| *metric_of(summary, kind))
            .collect();
        aggregates.insert(kind, aggregate_metric(&results));
    }

    PoolSnapshot {
        pools,
        summaries,
        aggregates,
        fetched_at: Utc::now(),
    }
}

fn summarize_pool(pool: &PreparedPool, index: usize) -> PoolSummary {
    let name = extract_name(&pool.flat).unwrap_or_else(|| format!("Pool {}", index + 1));
    PoolSummary {
        name,
        tvl: extract_metric(&pool.flat, metric_config(MetricKind::Tvl)),
        staked: extract_metric(&pool.flat, metric_config(MetricKind::Staked)),
        volume: extract_metric(&pool.flat, metric_config(MetricKind::Volume)),
        fees: extract_metric(&pool.flat, metric_config(MetricKind::Fees)),
    }
}

fn metric_of(summary: &PoolSummary, kind: MetricKind) -> &MetricResult {
    match kind {
        MetricKind::Tvl => &summary.tvl,
        MetricKind::Staked => &summary.staked,
        MetricKind::Volume => &summary.volume,
        MetricKind::Fees => &summary.fees,
    }
}
