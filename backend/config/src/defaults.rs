//! Config defaults: applies default values to parsed config.

pub use readerstats_core::{DEFAULT_CHANNEL_PREFIX, DEFAULT_KEY_PREFIX};

use crate::io::config_dir;
use crate::schema::{
    LoggingConfig, PresenceConfig, ReaderStatsConfig, StorageConfig, ViewsConfig,
};

/// Default dedup window.
pub const DEFAULT_DEDUP_WINDOW_MINUTES: u64 = 30;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// File name of the SQLite store inside the config directory.
pub const DEFAULT_STORE_FILE: &str = "store.db";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: ReaderStatsConfig) -> ReaderStatsConfig {
    let config = apply_storage_defaults(config);
    let config = apply_view_defaults(config);
    let config = apply_presence_defaults(config);
    apply_logging_defaults(config)
}

fn apply_storage_defaults(mut config: ReaderStatsConfig) -> ReaderStatsConfig {
    let storage = config.storage.get_or_insert_with(StorageConfig::default);
    if storage.path.is_none() {
        storage.path = Some(config_dir().join(DEFAULT_STORE_FILE).display().to_string());
    }
    if storage.key_prefix.is_none() {
        storage.key_prefix = Some(DEFAULT_KEY_PREFIX.to_string());
    }
    config
}

fn apply_view_defaults(mut config: ReaderStatsConfig) -> ReaderStatsConfig {
    let views = config.views.get_or_insert_with(ViewsConfig::default);
    if views.dedup_window_minutes.is_none() {
        views.dedup_window_minutes = Some(DEFAULT_DEDUP_WINDOW_MINUTES);
    }
    config
}

fn apply_presence_defaults(mut config: ReaderStatsConfig) -> ReaderStatsConfig {
    let presence = config.presence.get_or_insert_with(PresenceConfig::default);
    if presence.channel_prefix.is_none() {
        presence.channel_prefix = Some(DEFAULT_CHANNEL_PREFIX.to_string());
    }
    config
}

fn apply_logging_defaults(mut config: ReaderStatsConfig) -> ReaderStatsConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.dir.is_none() {
        logging.dir = Some(config_dir().join("logs").display().to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_dedup_window() {
        let cfg = apply_all_defaults(ReaderStatsConfig::default());
        assert_eq!(
            cfg.views.unwrap().dedup_window_minutes.unwrap(),
            DEFAULT_DEDUP_WINDOW_MINUTES
        );
    }

    #[test]
    fn fills_every_section() {
        let cfg = apply_all_defaults(ReaderStatsConfig::default());
        let storage = cfg.storage.clone().unwrap();
        assert!(storage.path.unwrap().ends_with(DEFAULT_STORE_FILE));
        assert_eq!(storage.key_prefix.as_deref(), Some(DEFAULT_KEY_PREFIX));
        assert_eq!(cfg.channel_prefix(), DEFAULT_CHANNEL_PREFIX);
        assert_eq!(cfg.log_level(), DEFAULT_LOG_LEVEL);
        assert!(cfg.logging.unwrap().dir.is_some());
        assert!(cfg.backend.is_none());
    }

    #[test]
    fn prefixes_match_what_storage_and_presence_use() {
        let cfg = apply_all_defaults(ReaderStatsConfig::default());
        assert_eq!(cfg.key_prefix(), "readerstats:");
        assert_eq!(cfg.channel_prefix(), "content:");
        assert_eq!(
            readerstats_core::presence_channel_name(cfg.channel_prefix(), &"abc".into()),
            "content:abc"
        );
    }

    #[test]
    fn does_not_override_user_set_window() {
        let cfg = ReaderStatsConfig {
            views: Some(ViewsConfig {
                dedup_window_minutes: Some(5),
            }),
            ..Default::default()
        };
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.dedup_window_minutes(), 5);
    }
}
