//! Layered application configuration.
//!
//! Settings are merged with figment, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config <PATH>`, else `config.toml` in the platform
//!    config directory)
//! 3. `DUPFIND_*` environment variables
//! 4. Command-line flags
//!
//! # Example
//!
//! ```toml
//! hash = "blake3"
//! chunk_size = 131072
//! exclude_substrings = ["node_modules", "/.snapshots/"]
//! pretty = false
//! ```

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::ScanArgs;
use crate::scanner::{
    HashAlgorithm, Hasher, WalkerConfig, DEFAULT_CHUNK_SIZE, DEFAULT_SEED, PREHASH_SIZE,
};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPFIND_";

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A source could not be parsed or has the wrong shape.
    #[error("Invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fingerprint hash function.
    pub hash: HashAlgorithm,
    /// Seed for the xxh64 fingerprint.
    pub hash_seed: u64,
    /// Streaming buffer size in bytes.
    pub chunk_size: usize,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Extra path substrings to skip.
    pub exclude_substrings: Vec<String>,
    /// Pretty-print the report.
    pub pretty: bool,
    /// Show a progress spinner on stderr.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash: HashAlgorithm::Xxh64,
            hash_seed: DEFAULT_SEED,
            chunk_size: DEFAULT_CHUNK_SIZE,
            follow_symlinks: true,
            exclude_substrings: Vec::new(),
            pretty: true,
            progress: true,
        }
    }
}

impl Config {
    /// Default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupfind", "dupfind")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Figment with defaults, file and environment layers.
    ///
    /// `config_file` replaces the default path when given.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = config_file
            .map(Path::to_path_buf)
            .or_else(Self::default_path);
        if let Some(path) = file {
            log::debug!("Config file: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load defaults, file and environment.
    ///
    /// # Errors
    ///
    /// Fails if an explicit `config_file` is missing, a source is malformed,
    /// or a value is out of range.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }

        let config: Self = Self::figment(config_file).extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Fails if `chunk_size` is below one block.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size < PREHASH_SIZE {
            return Err(ConfigError::Invalid(format!(
                "chunk_size must be at least {} bytes, got {}",
                PREHASH_SIZE, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Apply flags given on the `scan` command line.
    ///
    /// # Errors
    ///
    /// Fails if the resulting values are out of range.
    pub fn apply_scan_args(&mut self, args: &ScanArgs) -> Result<(), ConfigError> {
        if let Some(hash) = args.hash {
            self.hash = hash;
        }
        if let Some(seed) = args.seed {
            self.hash_seed = seed;
        }
        if let Some(size) = args.chunk_size {
            self.chunk_size = usize::try_from(size)
                .map_err(|_| ConfigError::Invalid(format!("chunk_size too large: {size}")))?;
        }
        if args.follow_symlinks {
            self.follow_symlinks = true;
        } else if args.no_follow_symlinks {
            self.follow_symlinks = false;
        }
        self.exclude_substrings.extend(args.exclude.iter().cloned());
        if args.compact {
            self.pretty = false;
        }
        if args.no_progress {
            self.progress = false;
        }
        self.validate()
    }

    /// Render as a TOML document accepted by [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Hasher for this configuration.
    #[must_use]
    pub fn hasher(&self) -> Hasher {
        Hasher::new(self.hash, self.hash_seed).with_chunk_size(self.chunk_size)
    }

    /// Walker settings for this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.follow_symlinks, self.exclude_substrings.clone())
    }
}
