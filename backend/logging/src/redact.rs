//! Scrubs e-mail addresses and bearer tokens, and shortens user identifiers,
//! before they reach the logs.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap());
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Bearer\s+[A-Za-z0-9\-\._~+/]+=*)|(eyJ[A-Za-z0-9\-_]{10,}\.[A-Za-z0-9\-_\.]+)")
        .unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = EMAIL_RE.replace_all(input, "[REDACTED_EMAIL]");
    TOKEN_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string()
}

/// Keep the first four characters of an identifier and mask the rest.
pub fn mask_identifier(id: &str) -> String {
    if EMAIL_RE.is_match(id) {
        return "[REDACTED_EMAIL]".to_string();
    }
    let head: String = id.chars().take(4).collect();
    if head.len() == id.len() {
        return "****".to_string();
    }
    format!("{head}****")
}
