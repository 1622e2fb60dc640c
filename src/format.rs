// src/format.rs
//
// Display formatting for the presentation boundary: en-US style currency,
// token and percent strings with magnitude-banded fraction digits. Missing
// values always render as the placeholder, never as zero.

use crate::pools::AggregateResult;

/// Rendered for any value the pipeline could not determine.
pub const PLACEHOLDER: &str = "—";

/// Currency amount with a compact suffix above one million.
pub fn format_currency(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return PLACEHOLDER.to_string();
    };
    let sign = if v < 0.0 { "-" } else { "" };
    let abs = v.abs();
    if abs >= 1e9 {
        format!("{sign}${:.2}B", abs / 1e9)
    } else if abs >= 1e6 {
        format!("{sign}${:.2}M", abs / 1e6)
    } else if abs >= 1_000.0 {
        format!("{sign}${}", group_thousands(abs, 0))
    } else if abs >= 1.0 {
        format!("{sign}${}", group_thousands(abs, 2))
    } else {
        format!("{sign}${abs:.4}")
    }
}

/// Token amount: grouped, two fraction digits below one thousand.
pub fn format_token(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return PLACEHOLDER.to_string();
    };
    let sign = if v < 0.0 { "-" } else { "" };
    let abs = v.abs();
    let digits = if abs >= 1_000.0 { 0 } else { 2 };
    format!("{sign}{}", group_thousands(abs, digits))
}

/// Signed percent with two fraction digits ("+2.50%", "-1.20%").
pub fn format_percent(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return PLACEHOLDER.to_string();
    };
    if v > 0.0 {
        format!("+{v:.2}%")
    } else {
        format!("{v:.2}%")
    }
}

/// Aggregate line: total plus the change in parentheses when known.
pub fn format_aggregate(aggregate: &AggregateResult, currency: bool) -> String {
    let total = if currency {
        format_currency(aggregate.total)
    } else {
        format_token(aggregate.total)
    };
    match aggregate.percent_change {
        Some(_) => format!("{total} ({})", format_percent(aggregate.percent_change)),
        None => total,
    }
}

fn group_thousands(abs: f64, fraction_digits: usize) -> String {
    let formatted = format!("{abs:.fraction_digits$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{grouped}.{frac}"),
        None => grouped,
    }
}
