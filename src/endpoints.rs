// src/endpoints.rs
//
// Builds the ordered candidate list of pool-data sources. Order is the
// trial order: override first (when configured), then each direct endpoint
// followed by its mirror variants. A URL already present is never added
// again.

use log::warn;
use std::collections::HashMap;
use url::form_urlencoded::byte_serialize;

use crate::settings::Settings;

/// One candidate HTTP source for pool data, direct or proxied.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: String,
    pub headers: HashMap<String, String>,
    /// Skip content-type sniffing and always parse the body as text.
    pub prefer_text: bool,
    /// True for mirror variants built from a proxy template.
    pub proxied: bool,
}

pub fn resolve_endpoints(settings: &Settings) -> Vec<Endpoint> {
    let cfg = &settings.endpoints;
    let mut out: Vec<Endpoint> = Vec::new();

    for entry in &cfg.direct {
        push_unique(
            &mut out,
            Endpoint {
                url: entry.url.clone(),
                headers: entry.headers.clone(),
                prefer_text: entry.prefer_text,
                proxied: false,
            },
        );

        if !cfg.enable_proxies {
            continue;
        }
        for template in &cfg.proxy_templates {
            let Some(url) = apply_proxy_template(template, &entry.url) else {
                continue;
            };
            // Mirrors strip custom headers, so none are forwarded.
            push_unique(
                &mut out,
                Endpoint {
                    url,
                    headers: HashMap::new(),
                    prefer_text: entry.prefer_text,
                    proxied: true,
                },
            );
        }
    }

    if let Some(override_url) = cfg.r#override.as_deref().map(str::trim) {
        if !override_url.is_empty() && !out.iter().any(|e| e.url == override_url) {
            out.insert(
                0,
                Endpoint {
                    url: override_url.to_string(),
                    headers: HashMap::new(),
                    prefer_text: false,
                    proxied: false,
                },
            );
        }
    }

    out
}

fn push_unique(out: &mut Vec<Endpoint>, endpoint: Endpoint) {
    if out.iter().any(|e| e.url == endpoint.url) {
        return;
    }
    out.push(endpoint);
}

/// Substitute the percent-encoded target into a `{url}` template.
fn apply_proxy_template(template: &str, target: &str) -> Option<String> {
    if !template.contains("{url}") {
        warn!("Proxy template without {{url}} placeholder ignored: {template}");
        return None;
    }
    let encoded: String = byte_serialize(target.as_bytes()).collect();
    Some(template.replace("{url}", &encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{EndpointEntry, Settings};

    fn settings_with(direct: Vec<&str>, proxies: Vec<&str>, enable: bool) -> Settings {
        let mut settings = Settings::default();
        settings.endpoints.direct = direct
            .into_iter()
            .map(|url| EndpointEntry {
                url: url.to_string(),
                headers: HashMap::new(),
                prefer_text: false,
            })
            .collect();
        settings.endpoints.proxy_templates =
            proxies.into_iter().map(|p| p.to_string()).collect();
        settings.endpoints.enable_proxies = enable;
        settings
    }

    #[test]
    fn test_direct_then_proxied_interleaved() {
        let settings = settings_with(
            vec!["https://a.example/pools", "https://b.example/pools"],
            vec!["https://p1.example/?{url}", "https://p2.example/?{url}"],
            true,
        );
        let endpoints = resolve_endpoints(&settings);
        assert_eq!(endpoints.len(), 6);
        assert!(!endpoints[0].proxied);
        assert!(endpoints[1].proxied && endpoints[1].url.starts_with("https://p1.example/"));
        assert!(endpoints[2].proxied && endpoints[2].url.starts_with("https://p2.example/"));
        assert_eq!(endpoints[3].url, "https://b.example/pools");
    }

    #[test]
    fn test_simple_variant_skips_proxies() {
        let settings = settings_with(
            vec!["https://a.example/pools"],
            vec!["https://p1.example/?{url}"],
            false,
        );
        let endpoints = resolve_endpoints(&settings);
        assert_eq!(endpoints.len(), 1);
        assert!(!endpoints[0].proxied);
    }

    #[test]
    fn test_override_prepended_once() {
        let mut settings = settings_with(vec!["https://a.example/pools"], vec![], true);
        settings.endpoints.r#override = Some("https://custom.example/pools".to_string());
        let endpoints = resolve_endpoints(&settings);
        assert_eq!(endpoints[0].url, "https://custom.example/pools");
        assert_eq!(endpoints.len(), 2);

        // An override already in the list is not duplicated.
        settings.endpoints.r#override = Some("https://a.example/pools".to_string());
        let endpoints = resolve_endpoints(&settings);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].url, "https://a.example/pools");
    }

    #[test]
    fn test_duplicate_urls_deduplicated() {
        let settings = settings_with(
            vec!["https://a.example/pools", "https://a.example/pools"],
            vec![],
            true,
        );
        assert_eq!(resolve_endpoints(&settings).len(), 1);
    }

    #[test]
    fn test_proxy_encoding() {
        let url = apply_proxy_template("https://p.example/?{url}", "https://a.example/pools?x=1")
            .unwrap();
        assert_eq!(
            url,
            "https://p.example/?https%3A%2F%2Fa.example%2Fpools%3Fx%3D1"
        );
    }
}
