// src/aggregator.rs
//
// Cross-pool aggregation for one metric. Totals only ever include finite
// contributions; the overall percent change is computed by a fixed priority
// of strategies, falling back from summed history to summed deltas to a
// value-weighted average of per-pool percents.

use crate::pools::{AggregateResult, MetricResult};

/// Aggregate the per-pool results of a single metric.
pub fn aggregate_metric(results: &[MetricResult]) -> AggregateResult {
    let mut total = 0.0;
    let mut has_value = false;
    let mut delta_sum = 0.0;
    let mut has_delta = false;
    let mut previous_sum = 0.0;
    let mut has_previous = false;
    let mut percent_weighted = 0.0;
    let mut percent_weight = 0.0;
    let mut has_percent = false;

    for result in results {
        if let Some(value) = result.value.filter(|v| v.is_finite()) {
            total += value;
            has_value = true;
            if let Some(percent) = result.percent.filter(|p| p.is_finite()) {
                // Weight floor of 1 keeps near-zero pools from dominating
                // (or nullifying) the weighted average.
                let weight = value.abs().max(1.0);
                percent_weighted += percent * weight;
                percent_weight += weight;
                has_percent = true;
            }
        }
        if let Some(delta) = result.delta.filter(|d| d.is_finite()) {
            delta_sum += delta;
            has_delta = true;
        }
        if let Some(previous) = result.previous.filter(|p| p.is_finite()) {
            previous_sum += previous;
            has_previous = true;
        }
    }

    let percent_change = if has_delta && has_previous && previous_sum != 0.0 {
        Some(delta_sum / previous_sum * 100.0)
    } else if has_delta && has_value && (total - delta_sum) != 0.0 {
        Some(delta_sum / (total - delta_sum) * 100.0)
    } else if has_percent && percent_weight > 0.0 {
        Some(percent_weighted / percent_weight)
    } else if has_delta {
        // Deltas exist but every division base was zero.
        Some(0.0)
    } else {
        None
    };

    AggregateResult {
        total: has_value.then_some(total),
        percent_change,
    }
}
