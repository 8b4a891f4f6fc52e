//! Address-bar input resolution.
//!
//! Turns whatever the user typed into something the rendering engine can
//! load. Purely local string rules: no DNS lookup, no reachability check,
//! no validation. A malformed result only shows up later as a failed load.
//!
//! Rules, first match wins:
//! 1. Starts with `http://`, `https://` or `file:///` → used as-is.
//! 2. Contains a `.` with at least one character after the last one →
//!    bare domain, `https://` is prepended.
//! 3. Anything else → search query on the configured engine, spaces
//!    replaced by `+`.

use crate::preferences::SearchEngine;

const URL_PREFIXES: [&str; 3] = ["http://", "https://", "file:///"];

/// Resolves address-bar text (already trimmed) into a URL to load.
pub fn resolve(input: &str, engine: SearchEngine) -> String {
    if has_url_prefix(input) {
        return input.to_string();
    }

    if looks_like_domain(input) {
        return format!("https://{input}");
    }

    search_url(input, engine)
}

/// Same as [`resolve`], with the engine given by its dropdown name.
/// Unknown names search on Google.
pub fn resolve_with_engine_name(input: &str, engine_name: &str) -> String {
    resolve(input, SearchEngine::from_name(engine_name))
}

/// Builds the engine's query URL for `query`.
pub fn search_url(query: &str, engine: SearchEngine) -> String {
    format!("{}{}", engine.query_prefix(), query.replace(' ', "+"))
}

fn has_url_prefix(input: &str) -> bool {
    URL_PREFIXES.iter().any(|prefix| input.starts_with(prefix))
}

fn looks_like_domain(input: &str) -> bool {
    matches!(input.rsplit_once('.'), Some((_, tld)) if !tld.is_empty())
}
