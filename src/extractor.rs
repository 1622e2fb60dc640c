// src/extractor.rs
//
// Keyword-ranked metric extraction over flattened pools. The per-metric
// keyword, preference and avoidance lists are declarative data, not code
// branches: upstream field names drift and the tables are the single place
// that absorbs it.

use serde::Serialize;

use crate::pools::{FlatEntry, FlatPool, MetricResult};

/// The four tracked pool metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Tvl,
    Staked,
    Volume,
    Fees,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Tvl,
        MetricKind::Staked,
        MetricKind::Volume,
        MetricKind::Fees,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::Tvl => "tvl",
            MetricKind::Staked => "staked",
            MetricKind::Volume => "volume",
            MetricKind::Fees => "fees",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Tvl => "Total Value Locked",
            MetricKind::Staked => "Staked",
            MetricKind::Volume => "24h Volume",
            MetricKind::Fees => "24h Fees",
        }
    }
}

/// Display unit of a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueUnit {
    Currency,
    Token,
}

/// Declarative search configuration for one metric. Keyword order is
/// preference order: earlier keywords rank strictly better.
pub struct MetricConfig {
    pub kind: MetricKind,
    pub unit: ValueUnit,
    pub value_keywords: &'static [&'static str],
    pub delta_keywords: &'static [&'static str],
    pub percent_keywords: &'static [&'static str],
    pub previous_keywords: &'static [&'static str],
    /// Paths not containing any of these take a flat ranking penalty.
    pub prefer: &'static [&'static str],
    /// Paths containing any of these are excluded from the value search.
    pub avoid: &'static [&'static str],
}

/// Markers excluded from delta and previous-value searches so a percent
/// entry is never mistaken for an absolute one.
const PERCENT_MARKERS: [&str; 2] = ["percent", "pct"];

pub static METRICS: [MetricConfig; 4] = [
    MetricConfig {
        kind: MetricKind::Tvl,
        unit: ValueUnit::Currency,
        value_keywords: &[
            "tvlusd",
            "tvl_usd",
            "totalvaluelockedusd",
            "totalvaluelocked",
            "liquidityusd",
            "tvl",
            "liquidity",
        ],
        delta_keywords: &["tvlchange24h", "tvl24hchange", "tvlchangeusd", "tvldelta", "tvlchange"],
        percent_keywords: &[
            "tvlchangepercent",
            "tvlchangepct",
            "tvlpercentchange",
            "tvlchange24hpercent",
        ],
        previous_keywords: &["previoustvl", "tvlprevious", "tvlusd24hago", "tvl24hago"],
        prefer: &["usd"],
        // "tel" keeps token-denominated twins (tvlTel) out of the USD value.
        avoid: &["tel", "percent", "pct", "change", "delta", "previous", "ago"],
    },
    MetricConfig {
        kind: MetricKind::Staked,
        unit: ValueUnit::Token,
        value_keywords: &[
            "stakedtel",
            "totalstaked",
            "stakedamount",
            "stakedbalance",
            "staked",
        ],
        delta_keywords: &["stakedchange24h", "stakeddelta", "stakedchange"],
        percent_keywords: &["stakedchangepercent", "stakedchangepct", "stakedpercentchange"],
        previous_keywords: &["previousstaked", "stakedprevious", "staked24hago"],
        // Staked is reported in TEL; dollar twins are the ones to skip here.
        prefer: &[],
        avoid: &["usd", "percent", "pct", "change", "delta", "previous", "ago"],
    },
    MetricConfig {
        kind: MetricKind::Volume,
        unit: ValueUnit::Currency,
        value_keywords: &[
            "volumeusd",
            "volume24husd",
            "dailyvolumeusd",
            "volume24h",
            "dailyvolume",
            "volume",
        ],
        delta_keywords: &["volumechange24h", "volumechangeusd", "volumedelta", "volumechange"],
        percent_keywords: &[
            "volumechangepercent",
            "volumechangepct",
            "volumepercentchange",
        ],
        previous_keywords: &["previousvolume", "volumeprevious", "volume24hago"],
        prefer: &["usd"],
        avoid: &["tel", "percent", "pct", "change", "delta", "previous", "ago"],
    },
    MetricConfig {
        kind: MetricKind::Fees,
        unit: ValueUnit::Currency,
        value_keywords: &[
            "feesusd",
            "fees24husd",
            "dailyfeesusd",
            "fees24h",
            "dailyfees",
            "fees",
            "fee",
        ],
        delta_keywords: &["feeschange24h", "feeschangeusd", "feesdelta", "feeschange"],
        percent_keywords: &["feeschangepercent", "feeschangepct", "feespercentchange"],
        previous_keywords: &["previousfees", "feesprevious", "fees24hago"],
        prefer: &["usd"],
        // feetier/feepercent are pool parameters, not earned fees.
        avoid: &[
            "tel", "percent", "pct", "change", "delta", "previous", "ago", "feetier", "tier",
        ],
    },
];

pub fn metric_config(kind: MetricKind) -> &'static MetricConfig {
    METRICS
        .iter()
        .find(|config| config.kind == kind)
        .expect("all metric kinds are configured")
}

/// Keywords for a pool's display name, searched over string entries.
pub const NAME_KEYWORDS: [&str; 6] = ["name", "pairname", "poolname", "pair", "symbol", "title"];
const NAME_AVOID: [&str; 5] = ["address", "id", "url", "logo", "icon"];

/// Ranking options shared by the numeric and string searches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions<'a> {
    pub prefer: &'a [&'a str],
    pub avoid: &'a [&'a str],
}

/// Find the best-ranked entry for a keyword list.
///
/// Keywords are tried in order; for keyword `i` an exact path match scores
/// `i*10`, a suffix match `i*10 + 1`, a containment match `i*10 + 2` (first
/// matching keyword wins per entry). Entries whose path contains an avoid
/// marker are excluded; when a prefer list is set, paths missing every
/// preferred marker take a +100 penalty. Lowest score wins, first-seen
/// breaks ties.
fn find_entry<'a, T>(
    entries: &'a [FlatEntry<T>],
    keywords: &[&str],
    opts: SearchOptions<'_>,
) -> Option<&'a FlatEntry<T>> {
    let mut best: Option<(i64, &FlatEntry<T>)> = None;

    for entry in entries {
        if opts.avoid.iter().any(|marker| entry.path.contains(marker)) {
            continue;
        }

        let mut score = None;
        for (i, keyword) in keywords.iter().enumerate() {
            let base = (i as i64) * 10;
            if entry.path == *keyword {
                score = Some(base);
            } else if entry.path.ends_with(keyword) {
                score = Some(base + 1);
            } else if entry.path.contains(keyword) {
                score = Some(base + 2);
            }
            if score.is_some() {
                break;
            }
        }
        let Some(mut score) = score else {
            continue;
        };

        if !opts.prefer.is_empty()
            && !opts.prefer.iter().any(|marker| entry.path.contains(marker))
        {
            score += 100;
        }

        if best.map_or(true, |(best_score, _)| score < best_score) {
            best = Some((score, entry));
        }
    }

    best.map(|(_, entry)| entry)
}

pub fn find_number<'a>(
    entries: &'a [FlatEntry<f64>],
    keywords: &[&str],
    opts: SearchOptions<'_>,
) -> Option<&'a FlatEntry<f64>> {
    find_entry(entries, keywords, opts)
}

pub fn find_string<'a>(
    entries: &'a [FlatEntry<String>],
    keywords: &[&str],
    opts: SearchOptions<'_>,
) -> Option<&'a FlatEntry<String>> {
    find_entry(entries, keywords, opts)
}

/// Bring a raw percent entry into percentage-point units. A path that says
/// "percent"/"pct" is trusted as-is; otherwise a magnitude within [-1, 1]
/// is treated as a fraction.
pub fn normalize_percent(raw: f64, path: &str) -> f64 {
    if path.contains("percent") || path.contains("pct") {
        return raw;
    }
    if raw.abs() <= 1.0 {
        return raw * 100.0;
    }
    raw
}

/// Extract one metric from a flattened pool.
pub fn extract_metric(flat: &FlatPool, config: &MetricConfig) -> MetricResult {
    let value_opts = SearchOptions {
        prefer: config.prefer,
        avoid: config.avoid,
    };
    let history_opts = SearchOptions {
        prefer: config.prefer,
        avoid: &PERCENT_MARKERS,
    };
    let delta_opts = SearchOptions {
        prefer: &[],
        avoid: &PERCENT_MARKERS,
    };

    let value = find_number(&flat.numbers, config.value_keywords, value_opts);
    let delta = find_number(&flat.numbers, config.delta_keywords, delta_opts);
    let percent_entry = find_number(&flat.numbers, config.percent_keywords, SearchOptions::default());
    let previous = find_number(&flat.numbers, config.previous_keywords, history_opts);

    let value = value.map(|e| e.value);
    let delta = delta.map(|e| e.value);
    let previous = previous.map(|e| e.value);

    let mut percent = percent_entry.map(|e| normalize_percent(e.value, &e.path));
    if percent.is_none() {
        percent = derive_percent(value, delta, previous);
    }

    MetricResult {
        value,
        delta,
        percent,
        previous,
    }
}

/// Fallback when no percent entry exists: prefer delta over the previous
/// value, then delta over the back-computed base.
fn derive_percent(value: Option<f64>, delta: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let delta = delta?;
    if let Some(previous) = previous {
        if previous != 0.0 {
            return Some(delta / previous * 100.0);
        }
    }
    if let Some(value) = value {
        let base = value - delta;
        if base != 0.0 {
            return Some(delta / base * 100.0);
        }
    }
    None
}

/// Best display name for a pool, if any string entry qualifies.
pub fn extract_name(flat: &FlatPool) -> Option<String> {
    find_string(
        &flat.strings,
        &NAME_KEYWORDS,
        SearchOptions {
            prefer: &[],
            avoid: &NAME_AVOID,
        },
    )
    .map(|entry| entry.value.clone())
}
