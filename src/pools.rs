// src/pools.rs

use serde::Serialize;
use serde_json::{Map, Value};

/// Raw pool object as returned by an upstream source.
///
/// There is no fixed schema: field names, units and nesting vary between
/// sources (and between deployments of the same source), so the raw object
/// is carried as-is and interpreted through its flattened view.
pub type RawPool = Map<String, Value>;

/// One (path, value) record produced by flattening a raw pool.
///
/// Paths are lowercased; object keys are joined with `.` and array indices
/// appended as `[i]` (e.g. `stats.volume[0]`).
#[derive(Debug, Clone, PartialEq)]
pub struct FlatEntry<T> {
    pub path: String,
    pub value: T,
}

impl<T> FlatEntry<T> {
    pub fn new(path: impl Into<String>, value: T) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }
}

/// Flattened view of a single pool: numeric and string leaves, separately.
///
/// Numeric-looking strings appear in both sequences (the string entry and
/// a parsed numeric entry sharing the same path).
#[derive(Debug, Clone, Default)]
pub struct FlatPool {
    pub numbers: Vec<FlatEntry<f64>>,
    pub strings: Vec<FlatEntry<String>>,
}

/// A raw pool paired with its flattened view.
///
/// Built once per pool at ingestion and immutable for the rest of the
/// render cycle; all metric extraction runs against `flat`.
#[derive(Debug, Clone)]
pub struct PreparedPool {
    pub raw: RawPool,
    pub flat: FlatPool,
}

impl PreparedPool {
    pub fn new(raw: RawPool) -> Self {
        let flat = crate::flatten::flatten_pool(&raw);
        Self { raw, flat }
    }
}

/// Per-pool, per-metric derived facts.
///
/// Absent fields mean the pool did not expose a matching entry; they render
/// as placeholders downstream, never as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricResult {
    pub value: Option<f64>,
    pub delta: Option<f64>,
    pub percent: Option<f64>,
    pub previous: Option<f64>,
}

/// Cross-pool aggregate for one metric.
///
/// `total` is `None` when no pool contributed a finite value — "unknown" is
/// kept distinct from an actual zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateResult {
    pub total: Option<f64>,
    pub percent_change: Option<f64>,
}

/// Presentation row for one pool: display name plus the four tracked metrics.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    pub name: String,
    pub tvl: MetricResult,
    pub staked: MetricResult,
    pub volume: MetricResult,
    pub fees: MetricResult,
}
