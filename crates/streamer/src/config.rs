//! Environment configuration

use std::str::FromStr;
use std::time::Duration;

use fileserver::{StreamSettings, DEFAULT_CACHE_LIMIT, DEFAULT_CHUNK_SIZE};
use teloxide::types::ChatId;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}")]
    Invalid { name: String, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Runtime settings read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Main bot token followed by any `MULTI_TOKEN` workers
    pub tokens: Vec<String>,
    pub bin_channel: ChatId,
    pub bind_address: String,
    pub port: u16,
    pub fqdn: String,
    pub has_ssl: bool,
    pub no_port: bool,
    pub api_url: Option<Url>,
    pub cache_limit: usize,
    pub chunk_size: u64,
    pub probe_timeout: Duration,
    pub fetch_timeout: Duration,
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let main_token = get("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let mut tokens = vec![main_token];
        tokens.extend((1..).map_while(|n| get(&format!("MULTI_TOKEN{}", n))));

        let bin_channel = get("BIN_CHANNEL").ok_or(ConfigError::Missing("BIN_CHANNEL"))?;
        let bin_channel = ChatId(parse("BIN_CHANNEL", &bin_channel)?);

        let bind_address = get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string());
        let fqdn = get("FQDN").unwrap_or_else(|| bind_address.clone());

        let api_url = get("API_URL")
            .map(|value| Url::parse(&value).map_err(|_| invalid("API_URL", &value)))
            .transpose()?;

        let cache_limit = optional(&get, "CACHE_LIMIT", DEFAULT_CACHE_LIMIT)?;
        if cache_limit == 0 {
            return Err(ConfigError::Zero("CACHE_LIMIT"));
        }
        let chunk_size = optional(&get, "CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?;
        if chunk_size == 0 {
            return Err(ConfigError::Zero("CHUNK_SIZE"));
        }

        Ok(Self {
            tokens,
            bin_channel,
            port: optional(&get, "PORT", 8080)?,
            has_ssl: flag(&get, "HAS_SSL")?,
            no_port: flag(&get, "NO_PORT")?,
            bind_address,
            fqdn,
            api_url,
            cache_limit,
            chunk_size,
            probe_timeout: Duration::from_secs(optional(&get, "PROBE_TIMEOUT_SECS", 5)?),
            fetch_timeout: Duration::from_secs(optional(&get, "FETCH_TIMEOUT_SECS", 30)?),
        })
    }

    /// Base URL links handed to users are built on
    pub fn public_url(&self) -> String {
        fileserver::public_base_url(&self.fqdn, self.port, self.has_ssl, self.no_port)
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            chunk_size: self.chunk_size,
            cache_limit: self.cache_limit,
            probe_timeout: self.probe_timeout,
            fetch_timeout: self.fetch_timeout,
        }
    }
}

fn invalid(name: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(name, value))
}

fn optional<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        Some(value) => parse(name, &value),
        None => Ok(default),
    }
}

fn flag(get: &impl Fn(&str) -> Option<String>, name: &str) -> Result<bool, ConfigError> {
    match get(name) {
        None => Ok(false),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(name, &value)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BOT_TOKEN", "123:abc"), ("BIN_CHANNEL", "-1001234")]).unwrap();

        assert_eq!(config.tokens, vec!["123:abc".to_string()]);
        assert_eq!(config.bin_channel, ChatId(-1001234));
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.fqdn, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(!config.has_ssl);
        assert!(!config.no_port);
        assert!(config.api_url.is_none());
        assert_eq!(config.cache_limit, 100);
        assert_eq!(config.chunk_size, 1024 * 1024);
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.public_url(), "http://0.0.0.0:8080/");
    }

    #[test]
    fn test_multi_tokens_stop_at_first_gap() {
        let config = load(&[
            ("BOT_TOKEN", "main"),
            ("BIN_CHANNEL", "-100"),
            ("MULTI_TOKEN1", "one"),
            ("MULTI_TOKEN2", "two"),
            ("MULTI_TOKEN4", "four"),
        ])
        .unwrap();

        assert_eq!(config.tokens, vec!["main", "one", "two"]);
    }

    #[test]
    fn test_public_url() {
        let config = load(&[
            ("BOT_TOKEN", "main"),
            ("BIN_CHANNEL", "-100"),
            ("FQDN", "files.example.com"),
            ("HAS_SSL", "true"),
            ("NO_PORT", "1"),
        ])
        .unwrap();

        assert_eq!(config.public_url(), "https://files.example.com/");
    }

    #[test]
    fn test_missing_required() {
        assert!(matches!(
            load(&[("BIN_CHANNEL", "-100")]),
            Err(ConfigError::Missing("BOT_TOKEN"))
        ));
        assert!(matches!(
            load(&[("BOT_TOKEN", "main"), ("BIN_CHANNEL", " ")]),
            Err(ConfigError::Missing("BIN_CHANNEL"))
        ));
    }

    #[test]
    fn test_invalid_values() {
        let base = [("BOT_TOKEN", "main"), ("BIN_CHANNEL", "-100")];

        let err = load(&[base[0], base[1], ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "PORT"));

        let err = load(&[base[0], base[1], ("HAS_SSL", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "HAS_SSL"));

        let err = load(&[base[0], base[1], ("CHUNK_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Zero("CHUNK_SIZE")));

        let err = load(&[base[0], base[1], ("API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "API_URL"));
    }

    #[test]
    fn test_stream_settings() {
        let config = load(&[
            ("BOT_TOKEN", "main"),
            ("BIN_CHANNEL", "-100"),
            ("CACHE_LIMIT", "8"),
            ("CHUNK_SIZE", "4096"),
            ("PROBE_TIMEOUT_SECS", "2"),
        ])
        .unwrap();

        let settings = config.stream_settings();
        assert_eq!(settings.cache_limit, 8);
        assert_eq!(settings.chunk_size, 4096);
        assert_eq!(settings.probe_timeout, Duration::from_secs(2));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(30));
    }
}
