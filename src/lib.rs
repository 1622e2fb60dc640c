//! # TELx Pools SDK
//!
//! A Rust library for fetching, normalizing and aggregating TELx liquidity
//! pool data from unstable, schema-less upstream sources. The upstream
//! contract is unknown and shifts without notice, so every stage is
//! defensive: sources are tried in a fallback order, payloads are located
//! structurally rather than deserialized against a schema, and metric
//! fields are selected by ranked keyword search instead of fixed names.
//!
//! ## Pipeline
//!
//! Stages run in dependency order, strictly sequentially:
//!
//! 1. **Resolution**: build the ordered candidate endpoint list (direct
//!    URLs, mirror variants, optional runtime override).
//! 2. **Fetching**: try each candidate once; any failure advances to the
//!    next; only full exhaustion is an error.
//! 3. **Parsing**: JSON bodies directly, HTML bodies via embedded-JSON
//!    scanning (inline script blocks, framework globals).
//! 4. **Location**: recursive discovery of the pool array inside the
//!    parsed payload.
//! 5. **Flattening**: each pool becomes searchable (path, value) records.
//! 6. **Extraction**: keyword-ranked selection of TVL / Staked / Volume /
//!    Fees facts per pool.
//! 7. **Aggregation**: cross-pool totals and an overall percent change.
//!
//! Partial data is tolerated throughout: a pool missing a field leaves
//! that cell unknown without invalidating the pool, and a single bad pool
//! never aborts the render.

// Core Types
/// Raw pools, flattened entries and derived metric results
pub mod pools;

// Acquisition
/// Candidate endpoint resolution (direct, proxied, override)
pub mod endpoints;
/// Sequential endpoint trial runner
pub mod fetcher;
/// Response-body parsing, including HTML-embedded JSON
pub mod payload;

// Normalization
/// Pool collection discovery inside arbitrary payload shapes
pub mod locator;
/// Pool flattening into searchable path/value records
pub mod flatten;

// Derivation
/// Keyword-ranked metric extraction
pub mod extractor;
/// Cross-pool aggregation
pub mod aggregator;
/// Display formatting for the presentation boundary
pub mod format;

// Orchestration
/// Pipeline context and snapshot production
pub mod pipeline;

// Settings & Configuration
/// Configuration management
pub mod settings;

// Re-exports for convenience
pub use extractor::MetricKind;
pub use fetcher::FetchError;
pub use pipeline::{PoolDataPipeline, PoolSnapshot};
pub use pools::{AggregateResult, MetricResult, PoolSummary, PreparedPool};
pub use settings::Settings;
