//! readerstats configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every section is optional in
//! the file; `defaults::apply_all_defaults` fills in what is missing.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderStatsConfig {
    /// Local key-value storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    /// View tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<ViewsConfig>,

    /// Hosted backend REST endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,

    /// Live presence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<PresenceConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// SQLite file holding profile-scoped values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Prefix applied to every stored key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedup_window_minutes: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl ReaderStatsConfig {
    pub fn dedup_window_minutes(&self) -> u64 {
        self.views
            .as_ref()
            .and_then(|v| v.dedup_window_minutes)
            .unwrap_or(crate::defaults::DEFAULT_DEDUP_WINDOW_MINUTES)
    }

    pub fn key_prefix(&self) -> &str {
        self.storage
            .as_ref()
            .and_then(|s| s.key_prefix.as_deref())
            .unwrap_or(crate::defaults::DEFAULT_KEY_PREFIX)
    }

    pub fn channel_prefix(&self) -> &str {
        self.presence
            .as_ref()
            .and_then(|p| p.channel_prefix.as_deref())
            .unwrap_or(crate::defaults::DEFAULT_CHANNEL_PREFIX)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(crate::defaults::DEFAULT_LOG_LEVEL)
    }

    /// Backend URL, if one is configured and non-empty.
    pub fn backend_url(&self) -> Option<&str> {
        self.backend
            .as_ref()
            .and_then(|b| b.url.as_deref())
            .filter(|u| !u.trim().is_empty())
    }

    pub fn storage_path(&self) -> Option<&str> {
        self.storage.as_ref().and_then(|s| s.path.as_deref())
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }

    pub fn backend_api_key(&self) -> Option<&str> {
        self.backend
            .as_ref()
            .and_then(|b| b.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_yaml() {
        let yaml = r#"
views:
  dedupWindowMinutes: 15
backend:
  url: https://project.example.co
  apiKey: anon-key
storage:
  keyPrefix: "site:"
"#;
        let cfg: ReaderStatsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.dedup_window_minutes(), 15);
        assert_eq!(cfg.backend_url(), Some("https://project.example.co"));
        assert_eq!(cfg.backend_api_key(), Some("anon-key"));
        assert_eq!(cfg.key_prefix(), "site:");
        assert_eq!(cfg.channel_prefix(), "content:");
    }

    #[test]
    fn test_empty_backend_url_is_none() {
        let cfg = ReaderStatsConfig {
            backend: Some(BackendConfig {
                url: Some("  ".into()),
                api_key: None,
            }),
            ..Default::default()
        };
        assert_eq!(cfg.backend_url(), None);
    }
}
