use config::{Config, ConfigError, File};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

/// One configured upstream source for pool data.
#[derive(Debug, Deserialize, Clone)]
pub struct EndpointEntry {
    pub url: String,
    /// Extra request headers merged over the baseline policy
    /// (e.g. the Next.js data-request header).
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Force text-mode parsing even when the response claims JSON.
    #[serde(default)]
    pub prefer_text: bool,
}

static DEFAULT_ENDPOINTS: Lazy<Vec<EndpointEntry>> = Lazy::new(|| {
    vec![
        EndpointEntry {
            url: "https://www.telx.network/api/pools".to_string(),
            headers: HashMap::new(),
            prefer_text: false,
        },
        EndpointEntry {
            url: "https://www.telx.network/_next/data/latest/pools.json".to_string(),
            headers: HashMap::from([("x-nextjs-data".to_string(), "1".to_string())]),
            prefer_text: false,
        },
        // The rendered page itself; pool data is embedded as __NEXT_DATA__.
        EndpointEntry {
            url: "https://www.telx.network/pools".to_string(),
            headers: HashMap::new(),
            prefer_text: true,
        },
    ]
});

fn default_direct_endpoints() -> Vec<EndpointEntry> {
    DEFAULT_ENDPOINTS.clone()
}

fn default_proxy_templates() -> Vec<String> {
    vec![
        "https://corsproxy.io/?{url}".to_string(),
        "https://api.allorigins.win/raw?url={url}".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct Endpoints {
    #[serde(default = "default_direct_endpoints")]
    pub direct: Vec<EndpointEntry>,
    /// Mirror templates with a `{url}` placeholder for the encoded target.
    #[serde(default = "default_proxy_templates")]
    pub proxy_templates: Vec<String>,
    /// When false, only the flat direct list is tried (no mirror variants).
    #[serde(default = "default_true")]
    pub enable_proxies: bool,
    /// Highest-priority source, tried before everything else when set.
    #[serde(default)]
    pub r#override: Option<String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            direct: default_direct_endpoints(),
            proxy_templates: default_proxy_templates(),
            enable_proxies: default_true(),
            r#override: None,
        }
    }
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("telx-pools/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct Http {
    /// Per-attempt request timeout; a hung endpoint fails that attempt and
    /// the trial chain advances to the next candidate.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Http {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub http: Http,
    #[serde(default)]
    pub log: LogSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("Config.toml").required(false))
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        // Environment variable overrides. TELX_ENDPOINT plays the role the
        // page-level override (query parameter / global / DOM attribute)
        // plays in the browser deployment.
        if let Ok(raw) = env::var("TELX_ENDPOINT") {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                settings.endpoints.r#override = Some(trimmed.to_string());
            }
        }
        if let Ok(raw) = env::var("TELX_DISABLE_PROXIES") {
            if matches!(raw.trim(), "1" | "true" | "yes") {
                settings.endpoints.enable_proxies = false;
            }
        }
        if let Ok(raw) = env::var("TELX_PROXY_TEMPLATES") {
            if let Some(list) = parse_string_list(&raw) {
                settings.endpoints.proxy_templates = list;
            }
        }

        Ok(settings)
    }
}

/// Parse an env value as a list: JSON array, comma-separated, or a single
/// bare item. Returns None for an empty value so the configured default
/// stays in place.
fn parse_string_list(input: &str) -> Option<Vec<String>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('[') {
        if let Ok(v) = serde_json::from_str::<Vec<String>>(trimmed) {
            return Some(v);
        }
        // Tolerate unquoted bracket lists: [a, b]
        let without_brackets = trimmed.trim_start_matches('[').trim_end_matches(']');
        let parts: Vec<String> = without_brackets
            .split(',')
            .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|s| !s.is_empty())
            .collect();
        return if parts.is_empty() { None } else { Some(parts) };
    }

    let parts: Vec<String> = trimmed
        .split(',')
        .map(|s| s.trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}
