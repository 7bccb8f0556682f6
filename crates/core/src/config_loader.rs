use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Environment prefix for overrides, e.g. `FINTECH_THRESHOLDS__PRICE_CHANGE_THRESHOLD=4.5`.
pub const ENV_PREFIX: &str = "FINTECH_";

pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from compiled defaults, `config/Config.toml`, and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file or environment cannot be parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration using a specific TOML file. A missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file or environment cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let config: AppConfig = Self::figment(path.as_ref()).extract()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load_from("does/not/exist.toml").unwrap();
            assert_eq!(config.thresholds.price_change_threshold, 5.0);
            assert_eq!(config.server.scraper_port, 5000);
            Ok(())
        });
    }

    #[test]
    fn test_toml_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                symbols = ["TSLA", "AMZN"]

                [thresholds]
                price_change_threshold = 3.5

                [notifications]
                email_recipient = "ops@example.com"
                "#,
            )?;
            jail.set_env("FINTECH_THRESHOLDS__SENTIMENT_THRESHOLD", "-0.5");
            jail.set_env("FINTECH_DATABASE__CONNECT_ATTEMPTS", "2");

            let config = ConfigLoader::load_from("Config.toml").unwrap();
            assert_eq!(config.symbols, vec!["TSLA", "AMZN"]);
            assert_eq!(config.thresholds.price_change_threshold, 3.5);
            assert_eq!(config.thresholds.sentiment_threshold, -0.5);
            assert_eq!(config.database.connect_attempts, 2);
            assert_eq!(
                config.notifications.email_recipient.as_deref(),
                Some("ops@example.com")
            );
            assert!(config.notifications.sms_recipient.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_symbols_env_accepts_csv() {
        Jail::expect_with(|jail| {
            jail.set_env("FINTECH_SYMBOLS", "aapl,msft");
            let config = ConfigLoader::load_from("missing.toml").unwrap();
            assert_eq!(config.symbols, vec!["AAPL", "MSFT"]);
            Ok(())
        });
    }
}
