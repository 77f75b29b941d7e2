//! Config redaction: produce safe-to-print config snapshots by masking secrets.

use serde_json::Value;

/// Keys whose string values are secrets.
static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "apikey",
    "serviceRoleKey",
    "service_role_key",
    "token",
    "secret",
    "password",
];

/// Redact a config JSON value, masking every sensitive field.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn mask(s: &str) -> String {
    if s.chars().count() > 8 {
        format!("{}***", s.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Collect the dotted paths of every field `redact` would mask.
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths_recursive(value, "", "", &mut paths);
    paths
}

fn collect_paths_recursive(value: &Value, key: &str, path: &str, out: &mut Vec<String>) {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => out.push(path.to_string()),
        Value::Array(arr) => {
            for (i, v) in arr.iter().enumerate() {
                collect_paths_recursive(v, key, &format!("{path}[{i}]"), out);
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                collect_paths_recursive(v, k, &child_path, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_api_key() {
        let v = json!({
            "backend": { "url": "https://x.example.co", "apiKey": "eyJhbGciOiJIUzI1NiJ9" }
        });
        let redacted = redact(&v);
        assert_eq!(redacted["backend"]["apiKey"], "eyJh***");
        assert_eq!(redacted["backend"]["url"], "https://x.example.co");
    }

    #[test]
    fn short_secret_fully_masked() {
        let redacted = redact(&json!({ "apiKey": "abc" }));
        assert_eq!(redacted["apiKey"], "***");
    }

    #[test]
    fn passthrough_non_sensitive() {
        let v = json!({ "logging": { "level": "debug" }, "views": { "dedupWindowMinutes": 30 } });
        assert_eq!(redact(&v), v);
    }

    #[test]
    fn collects_paths() {
        let v = json!({ "backend": { "apiKey": "secret-value" }, "logging": { "level": "info" } });
        assert_eq!(collect_redacted_paths(&v), vec!["backend.apiKey"]);
    }
}
