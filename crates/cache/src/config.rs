//! Cache configuration management with precedence and validation
use crate::errors::{Error, RecoveryHint, Result, SerializationOp};
use serde::{Deserialize, Serialize};
use stash_utils::{env_flag, env_parse, env_string, EnvParseError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default time-to-live applied by `set` when none is given
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default number of keys examined per scan round-trip
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 100;

/// Configuration consumed by [`crate::Cache`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Namespace prefix for every logical key
    pub key_prefix: String,
    /// Time-to-live applied when `set` is called without one
    #[serde(with = "duration_secs")]
    pub default_ttl: Duration,
    /// Initial state of the caching toggle used by `wrap`
    pub enabled: bool,
    /// Keys examined per scan round-trip during `clear`/`list`
    pub scan_batch_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: "cache".to_string(),
            default_ttl: DEFAULT_TTL,
            enabled: true,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

impl CacheConfig {
    /// Reject settings the store would refuse
    pub fn validate(&self) -> Result<()> {
        if self.default_ttl.as_secs() == 0 {
            return Err(Error::configuration(
                "default_ttl must be at least one second",
            ));
        }

        if self.scan_batch_size == 0 {
            return Err(Error::configuration("scan_batch_size must be positive"));
        }

        Ok(())
    }
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default configuration
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variable
    EnvironmentVariable(String),
}

/// Builder for creating cache configurations
#[derive(Debug, Clone, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    /// Set the default time-to-live
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.config.default_ttl = ttl;
        self
    }

    /// Set the initial caching toggle
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Set the scan batch size
    pub fn with_scan_batch_size(mut self, size: usize) -> Self {
        self.config.scan_batch_size = size;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<CacheConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Partial configuration read from a file or the environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct ConfigOverrides {
    key_prefix: Option<String>,
    default_ttl: Option<u64>,
    enabled: Option<bool>,
    scan_batch_size: Option<usize>,
}

impl ConfigOverrides {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, config: &mut CacheConfig) {
        if let Some(prefix) = self.key_prefix {
            config.key_prefix = prefix;
        }
        if let Some(ttl) = self.default_ttl {
            config.default_ttl = Duration::from_secs(ttl);
        }
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(size) = self.scan_batch_size {
            config.scan_batch_size = size;
        }
    }
}

/// File layout: settings live under a top-level `cache` object
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    cache: ConfigOverrides,
}

/// Configuration loader that handles precedence
///
/// Defaults, then the JSON config file, then `STASH_CACHE_*` variables.
pub struct CacheConfigLoader;

impl CacheConfigLoader {
    /// Environment variable naming an explicit config file
    pub const CONFIG_PATH_VAR: &'static str = "STASH_CONFIG";

    /// Load configuration with full precedence handling
    pub fn load() -> Result<(CacheConfig, ConfigSource)> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    /// Load configuration using `path` as the config file location
    pub fn load_from(path: &Path) -> Result<(CacheConfig, ConfigSource)> {
        let mut config = CacheConfig::default();
        let mut source = ConfigSource::Default;

        if let Some(file_overrides) = Self::load_from_config_file(path)? {
            file_overrides.apply(&mut config);
            source = ConfigSource::ConfigFile(path.to_path_buf());
        }

        let env_overrides = Self::load_from_env()?;
        if !env_overrides.is_empty() {
            env_overrides.apply(&mut config);
            source = ConfigSource::EnvironmentVariable("STASH_CACHE_*".to_string());
        }

        config.validate()?;
        tracing::debug!(?source, key_prefix = %config.key_prefix, "Loaded cache configuration");
        Ok((config, source))
    }

    /// Load overrides from a config file, `None` when it does not exist
    fn load_from_config_file(path: &Path) -> Result<Option<ConfigOverrides>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::Configuration {
            message: format!("failed to read config file '{}': {e}", path.display()),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Check the config file permissions".to_string(),
            },
        })?;

        let file: ConfigFile = serde_json::from_str(&content).map_err(|e| Error::Serialization {
            key: path.display().to_string(),
            operation: SerializationOp::Decode,
            source: Box::new(e),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Check config file syntax".to_string(),
            },
        })?;

        Ok(Some(file.cache))
    }

    /// Load overrides from environment variables
    fn load_from_env() -> Result<ConfigOverrides> {
        Ok(ConfigOverrides {
            key_prefix: env_string("STASH_CACHE_KEY_PREFIX"),
            default_ttl: env_parse::<u64>("STASH_CACHE_DEFAULT_TTL").map_err(env_error)?,
            enabled: env_flag("STASH_CACHE_ENABLED").map_err(env_error)?,
            scan_batch_size: env_parse::<usize>("STASH_CACHE_SCAN_BATCH_SIZE")
                .map_err(env_error)?,
        })
    }

    /// Get the configuration file path
    pub fn config_file_path() -> Result<PathBuf> {
        if let Some(explicit) = env_string(Self::CONFIG_PATH_VAR) {
            return Ok(PathBuf::from(explicit));
        }

        let config_dir = dirs::config_dir().ok_or_else(|| Error::Configuration {
            message: "Could not determine config directory".to_string(),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Set STASH_CONFIG or the HOME environment variable".to_string(),
            },
        })?;

        Ok(config_dir.join("stash").join("config.json"))
    }
}

fn env_error(e: EnvParseError) -> Error {
    Error::configuration(e.to_string())
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
