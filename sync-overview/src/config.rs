use secrets_sync::config::{Config as SecretsSyncConfig, ValidationError};
use sentry::types::{Dsn, ParseDsnError};
use serde::Deserialize;
use std::fs::File;
use std::str::FromStr;

fn default_metrics_prefix() -> String {
    "sync_overview".into()
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct LoggingConfig {
    pub sentry_dsn: String,
}

impl LoggingConfig {
    pub fn dsn(&self) -> Result<Dsn, ConfigError> {
        Dsn::from_str(&self.sentry_dsn).map_err(ConfigError::InvalidSentryDsn)
    }
}

#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub secrets_sync: SecretsSyncConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.common.metrics.as_ref().is_some_and(|m| m.statsd_port == 0) {
            return Err(ConfigError::InvalidStatsdPort);
        }
        if let Some(logging) = &self.common.logging {
            logging.dsn()?;
        }
        self.secrets_sync.validate()?;
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid secrets_sync config: {0}")]
    Invalid(#[from] ValidationError),
    #[error("statsd port cannot be 0")]
    InvalidStatsdPort,
    #[error("invalid sentry dsn: {0}")]
    InvalidSentryDsn(ParseDsnError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrets_sync::config::RecordStoreConfig;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            logging:
                sentry_dsn: https://key@sentry.example.com/1
            secrets_sync:
                flags:
                    secrets_sync_activated: true
                license:
                    features: ["Secrets Sync"]
                record_store:
                    type: http
                    url: http://127.0.0.1:8200/v1/sys/
                    timeout_secs: 5
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        config.validate().expect("valid config");

        let metrics = config.common.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_port, 8125);
        assert_eq!(metrics.prefix, "sync_overview");
        assert_eq!(
            config.common.logging.expect("logging config").sentry_dsn,
            "https://key@sentry.example.com/1"
        );
        assert!(matches!(
            config.secrets_sync.record_store,
            RecordStoreConfig::Http { timeout_secs: 5, .. }
        ));
    }

    #[test]
    fn minimal_config() {
        let tmp = write_tmp_file("secrets_sync: {}\n");
        let config = Config::from_file(tmp.path()).expect("load config");
        config.validate().expect("valid config");

        assert_eq!(config.common, CommonConfig::default());
        assert!(!config.secrets_sync.flags.secrets_sync_activated);
    }

    #[test]
    fn missing_file() {
        let result = Config::from_file(std::path::Path::new("/nonexistent/sync-overview.yaml"));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn invalid_statsd_port() {
        let yaml = r#"
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 0
            secrets_sync: {}
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStatsdPort)
        ));
    }

    #[test]
    fn invalid_sentry_dsn() {
        let yaml = r#"
            logging:
                sentry_dsn: not-a-dsn
            secrets_sync: {}
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSentryDsn(_))
        ));
    }

    #[test]
    fn valid_sentry_dsn_parses() {
        let logging = LoggingConfig {
            sentry_dsn: "https://key@sentry.example.com/1".into(),
        };
        let dsn = logging.dsn().expect("valid dsn");
        assert_eq!(dsn.host(), "sentry.example.com");
        assert_eq!(dsn.public_key(), "key");
    }

    #[test]
    fn invalid_record_store() {
        let yaml = r#"
            secrets_sync:
                record_store:
                    type: http
                    url: http://127.0.0.1:8200/
                    timeout_secs: 0
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(ValidationError::InvalidTimeout))
        ));
    }
}
