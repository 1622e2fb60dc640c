// src/payload.rs
//
// Turns a raw response body into raw pool objects. JSON bodies are parsed
// directly; HTML bodies are scanned for embedded JSON: inline script blocks
// first, then assignments to well-known framework globals. Candidates are
// tried in scan order and the first one the locator accepts wins; malformed
// blocks are skipped individually.

use log::debug;
use serde_json::Value;

use crate::locator::normalize_pools;
use crate::pools::RawPool;

/// Framework globals whose assignment carries the page state.
const GLOBAL_STATE_NAMES: [&str; 3] = ["__NEXT_DATA__", "__NUXT__", "__APOLLO_STATE__"];

/// Extract pool objects from a response body. Empty result means the body
/// carried nothing usable and the endpoint should be treated as failed.
pub fn extract_pools(body: &str, content_type: Option<&str>, prefer_text: bool) -> Vec<RawPool> {
    let is_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);

    if is_json && !prefer_text {
        return match serde_json::from_str::<Value>(body) {
            Ok(value) => normalize_pools(&value),
            Err(err) => {
                debug!("JSON body failed to parse: {err}");
                Vec::new()
            }
        };
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    // Some mirrors return JSON with a text/plain content type.
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let pools = normalize_pools(&value);
        if !pools.is_empty() {
            return pools;
        }
    }

    for candidate in embedded_json_candidates(body) {
        let pools = normalize_pools(&candidate);
        if !pools.is_empty() {
            return pools;
        }
    }

    Vec::new()
}

/// All embedded JSON values found in an HTML body, in scan order.
fn embedded_json_candidates(html: &str) -> Vec<Value> {
    let mut candidates = Vec::new();

    for block in script_json_blocks(html) {
        match parse_with_entity_fallback(block) {
            Some(value) => candidates.push(value),
            None => debug!("Skipping malformed inline JSON block"),
        }
    }

    for name in GLOBAL_STATE_NAMES {
        for literal in global_assignment_literals(html, name) {
            match serde_json::from_str::<Value>(literal) {
                Ok(value) => candidates.push(value),
                Err(err) => debug!("Skipping malformed {name} assignment: {err}"),
            }
        }
    }

    candidates
}

/// Contents of `<script type="application/json">` / `ld+json` tags.
fn script_json_blocks(html: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let lower = html.to_ascii_lowercase();
    let mut cursor = 0;

    while let Some(start) = lower[cursor..].find("<script") {
        let tag_start = cursor + start;
        let Some(tag_end_rel) = lower[tag_start..].find('>') else {
            break;
        };
        let tag_end = tag_start + tag_end_rel;
        let attrs = &lower[tag_start..tag_end];

        let body_start = tag_end + 1;
        let Some(close_rel) = lower[body_start..].find("</script") else {
            break;
        };
        let body_end = body_start + close_rel;

        if attrs.contains("application/json") || attrs.contains("ld+json") {
            blocks.push(&html[body_start..body_end]);
        }
        cursor = body_end;
    }

    blocks
}

/// Object literals assigned to a known global, e.g.
/// `window.__NEXT_DATA__ = {...}` or `__NUXT__={...}`.
fn global_assignment_literals<'a>(html: &'a str, name: &str) -> Vec<&'a str> {
    let mut literals = Vec::new();
    let mut cursor = 0;

    while let Some(found) = html[cursor..].find(name) {
        let after_name = cursor + found + name.len();
        cursor = after_name;

        let rest = html[after_name..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        if let Some(literal) = balanced_object_literal(rest) {
            literals.push(literal);
        }
    }

    literals
}

/// The balanced `{...}` prefix of the input, honoring strings and escapes.
fn balanced_object_literal(input: &str) -> Option<&str> {
    let bytes = input.as_bytes();
    if bytes.first() != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&input[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a script block, retrying with HTML entities decoded when the raw
/// text fails (some renderers escape the embedded state).
fn parse_with_entity_fallback(block: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(block.trim()) {
        return Some(value);
    }
    let decoded = decode_html_entities(block);
    serde_json::from_str::<Value>(decoded.trim()).ok()
}

/// Decode the handful of entities renderers use when escaping embedded
/// JSON. `&amp;` goes last so it cannot manufacture new matches mid-pass.
fn decode_html_entities(input: &str) -> String {
    input
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
