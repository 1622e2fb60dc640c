// src/fetcher.rs
//
// Sequential endpoint trial runner. Candidates are tried strictly one at a
// time: each failure (network, status, empty body, nothing pool-like in the
// payload) advances to the next candidate, and only full exhaustion is
// surfaced to the caller.

use log::{info, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL};
use reqwest::Client;

use crate::endpoints::Endpoint;
use crate::payload::extract_pools;
use crate::pools::RawPool;

/// Baseline request policy applied to every attempt.
const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const CACHE_CONTROL_VALUE: &str = "no-store";

/// One failed endpoint attempt, kept for the terminal error report.
#[derive(Debug, Clone)]
pub struct AttemptFailure {
    pub url: String,
    pub proxied: bool,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Every candidate endpoint failed; the caller should fall back to the
    /// degraded display path.
    #[error("all {} pool data endpoints failed", .attempts.len())]
    AllEndpointsFailed { attempts: Vec<AttemptFailure> },

    /// No endpoints were configured at all.
    #[error("no pool data endpoints configured")]
    NoEndpoints,
}

/// Try each endpoint in order and return the first non-empty pool list.
pub async fn fetch_pools(client: &Client, endpoints: &[Endpoint]) -> Result<Vec<RawPool>, FetchError> {
    if endpoints.is_empty() {
        return Err(FetchError::NoEndpoints);
    }

    let mut attempts = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        match try_endpoint(client, endpoint).await {
            Ok(pools) => {
                info!(
                    "Loaded {} pools from {}{}",
                    pools.len(),
                    endpoint.url,
                    if endpoint.proxied { " (proxied)" } else { "" }
                );
                return Ok(pools);
            }
            Err(reason) => {
                warn!(
                    "Pool endpoint failed ({}{}): {}",
                    endpoint.url,
                    if endpoint.proxied { ", proxied" } else { "" },
                    reason
                );
                attempts.push(AttemptFailure {
                    url: endpoint.url.clone(),
                    proxied: endpoint.proxied,
                    reason,
                });
            }
        }
    }

    Err(FetchError::AllEndpointsFailed { attempts })
}

/// One attempt. Any failure is reported as a reason string; the caller
/// decides whether more candidates remain.
async fn try_endpoint(client: &Client, endpoint: &Endpoint) -> Result<Vec<RawPool>, String> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE));
    for (name, value) in &endpoint.headers {
        let Ok(name) = name.parse::<HeaderName>() else {
            return Err(format!("invalid header name '{name}'"));
        };
        let Ok(value) = HeaderValue::from_str(value) else {
            return Err(format!("invalid header value for '{name}'"));
        };
        headers.insert(name, value);
    }

    let response = client
        .get(&endpoint.url)
        .headers(headers)
        .send()
        .await
        .map_err(|err| format!("request failed: {err}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {status}"));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let body = response
        .text()
        .await
        .map_err(|err| format!("body read failed: {err}"))?;
    if body.trim().is_empty() {
        return Err("empty body".to_string());
    }

    let pools = extract_pools(&body, content_type.as_deref(), endpoint.prefer_text);
    if pools.is_empty() {
        return Err("no pools found in payload".to_string());
    }
    Ok(pools)
}
