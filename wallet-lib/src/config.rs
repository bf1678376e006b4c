use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::{env, fs};

#[derive(Deserialize, Debug, PartialEq)]
pub struct SSLConfig {
    pub private_key_file: PathBuf,
    pub certificate_chain_file: PathBuf,
}

/// OTLP trace export. `headers` are sent as gRPC metadata with every export, e.g. an API key.
#[derive(Deserialize, Debug, PartialEq)]
pub struct TelemetryConfig {
    pub endpoint: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Account that is given `ROLE_ADMIN` when the server starts. It is created if no user has
/// this email yet.
#[derive(Deserialize, Debug, PartialEq)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct Config {
    /// Postgres connection string. Without one the service keeps its data in memory.
    pub database_url: Option<String>,
    #[serde(default)]
    pub signups_enabled: bool,
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    pub admin: Option<AdminConfig>,
    pub telemetry: Option<TelemetryConfig>,
    pub ssl: Option<SSLConfig>,
}

fn default_listen_address() -> String {
    "0.0.0.0:8000".to_owned()
}

fn default_max_pool_size() -> u32 {
    10
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Config, anyhow::Error> {
        let config = fs::read_to_string(path).context("Unable to read config file")?;
        Self::parse(&config)
    }

    pub fn parse(config: &str) -> Result<Config, anyhow::Error> {
        let config: Config = toml::from_str(config).with_context(|| "Unable to parse config")?;
        Ok(config)
    }

    pub fn from_env() -> Result<Config, anyhow::Error> {
        let signups_enabled = read_env("SIGNUPS_ENABLED")?;
        let signups_enabled = signups_enabled
            .parse()
            .context("Unable to parse SIGNUPS_ENABLED value")?;
        let max_pool_size = match env::var("MAX_POOL_SIZE") {
            Ok(size) => size.parse().context("Unable to parse MAX_POOL_SIZE value")?,
            Err(_) => default_max_pool_size(),
        };
        let telemetry = env::var("OTLP_ENDPOINT")
            .ok()
            .map(|endpoint| TelemetryConfig {
                endpoint,
                headers: BTreeMap::new(),
            });
        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminConfig { email, password }),
            _ => None,
        };

        let config = Config {
            database_url: env::var("DATABASE_URL").ok(),
            signups_enabled,
            listen_address: env::var("LISTEN_ADDRESS").unwrap_or_else(|_| default_listen_address()),
            max_pool_size,
            cors_origins: Vec::new(),
            admin,
            telemetry,
            ssl: None,
        };
        Ok(config)
    }
}

fn read_env(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).with_context(|| format!("Unable to read env var: {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.database_url, None);
        assert!(!config.signups_enabled);
        assert_eq!(config.listen_address, "0.0.0.0:8000");
        assert_eq!(config.max_pool_size, 10);
        assert!(config.admin.is_none());
        assert!(config.telemetry.is_none());
        assert!(config.ssl.is_none());
    }

    #[test]
    fn full_config() {
        let config = Config::parse(
            r#"
            database_url = "postgres://wallet@localhost/wallet"
            signups_enabled = true
            listen_address = "127.0.0.1:9000"
            max_pool_size = 4
            cors_origins = ["https://wallet.example.com"]

            [admin]
            email = "admin@wallet.example.com"
            password = "change-me"

            [telemetry]
            endpoint = "https://otlp.example.com"
            headers = { x-api-key = "secret" }

            [ssl]
            private_key_file = "/etc/wallet/key.pem"
            certificate_chain_file = "/etc/wallet/chain.pem"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://wallet@localhost/wallet")
        );
        assert!(config.signups_enabled);
        assert_eq!(config.listen_address, "127.0.0.1:9000");
        assert_eq!(config.max_pool_size, 4);
        assert_eq!(config.cors_origins, vec!["https://wallet.example.com"]);
        assert_eq!(
            config.admin,
            Some(AdminConfig {
                email: "admin@wallet.example.com".to_owned(),
                password: "change-me".to_owned(),
            })
        );
        let telemetry = config.telemetry.unwrap();
        assert_eq!(telemetry.endpoint, "https://otlp.example.com");
        assert_eq!(telemetry.headers.get("x-api-key").unwrap(), "secret");
        assert_eq!(
            config.ssl.unwrap().private_key_file,
            PathBuf::from("/etc/wallet/key.pem")
        );
    }

    #[test]
    fn invalid_config() {
        assert!(Config::parse("signups_enabled = \"maybe\"").is_err());
    }
}
