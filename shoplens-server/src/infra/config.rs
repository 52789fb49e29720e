//! Configuration loading: a TOML file layered under environment
//! variables, with `.env` support and non-fatal warnings for values that
//! fail to parse.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

use shoplens_core::DetectorSettings;

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("shoplens.toml"),
        PathBuf::from("config/shoplens.toml"),
    ]
});

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file not found at {path}")]
    MissingConfig { path: PathBuf },

    #[error("failed to read configuration file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to load .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://shoplens.db".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub page_timeout_secs: u64,
    pub checkout_timeout_secs: u64,
    pub page_max_redirects: usize,
    pub checkout_max_redirects: usize,
    pub user_agent: Option<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: 15,
            checkout_timeout_secs: 10,
            page_max_redirects: 3,
            checkout_max_redirects: 2,
            user_agent: None,
        }
    }
}

impl DetectorConfig {
    pub fn settings(&self) -> DetectorSettings {
        let defaults = DetectorSettings::default();
        DetectorSettings {
            page_timeout: Duration::from_secs(self.page_timeout_secs),
            checkout_timeout: Duration::from_secs(self.checkout_timeout_secs),
            page_max_redirects: self.page_max_redirects,
            checkout_max_redirects: self.checkout_max_redirects,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
        }
    }
}

/// Provenance details kept for startup logging.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub detector: DetectorConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server: Option<FileServerSection>,
    database: Option<FileDatabaseSection>,
    detector: Option<FileDetectorSection>,
}

#[derive(Debug, Default, Deserialize)]
struct FileServerSection {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct FileDatabaseSection {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileDetectorSection {
    page_timeout_secs: Option<u64>,
    checkout_timeout_secs: Option<u64>,
    page_max_redirects: Option<usize>,
    checkout_max_redirects: Option<usize>,
    user_agent: Option<String>,
}

#[derive(Debug, Default)]
struct EnvConfig {
    host: Option<String>,
    port: Option<String>,
    database_url: Option<String>,
    user_agent: Option<String>,
    config_path: Option<PathBuf>,
}

impl EnvConfig {
    fn gather() -> Self {
        Self {
            host: env::var("SHOPLENS_HOST").ok(),
            port: env::var("SHOPLENS_PORT").ok(),
            database_url: env::var("SHOPLENS_DATABASE_URL").ok(),
            user_agent: env::var("SHOPLENS_USER_AGENT").ok(),
            config_path: env::var("SHOPLENS_CONFIG").ok().map(PathBuf::from),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded =
            dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?;

        let env_config = EnvConfig::gather();
        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) = compose_config(
            file_config,
            env_config,
            config_path,
            env_file_loaded,
        );
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        // Explicit path beats the env var beats the default locations; an
        // explicitly named file must exist, defaults are best-effort.
        let (path, explicit) = match (
            &self.options.config_path,
            &env_config.config_path,
        ) {
            (Some(path), _) => (Some(path.clone()), true),
            (None, Some(path)) => (Some(path.clone()), true),
            (None, None) => (
                DEFAULT_CONFIG_LOCATIONS
                    .iter()
                    .find(|candidate| candidate.exists())
                    .cloned(),
                false,
            ),
        };

        let Some(path) = path else {
            return Ok((None, None));
        };
        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let file_config = parse_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn parse_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
    toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

fn compose_config(
    file: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> (Config, Vec<String>) {
    let mut config = Config::default();
    let mut warnings = Vec::new();

    if let Some(file) = file {
        if let Some(server) = file.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
        }
        if let Some(database) = file.database {
            if let Some(url) = database.url {
                config.database.url = url;
            }
        }
        if let Some(detector) = file.detector {
            if let Some(value) = detector.page_timeout_secs {
                config.detector.page_timeout_secs = value;
            }
            if let Some(value) = detector.checkout_timeout_secs {
                config.detector.checkout_timeout_secs = value;
            }
            if let Some(value) = detector.page_max_redirects {
                config.detector.page_max_redirects = value;
            }
            if let Some(value) = detector.checkout_max_redirects {
                config.detector.checkout_max_redirects = value;
            }
            if detector.user_agent.is_some() {
                config.detector.user_agent = detector.user_agent;
            }
        }
    }

    if let Some(host) = env.host {
        config.server.host = host;
    }
    if let Some(raw) = env.port {
        match raw.parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(_) => warnings.push(format!(
                "SHOPLENS_PORT is not a valid port number: {raw}"
            )),
        }
    }
    if let Some(url) = env.database_url {
        config.database.url = url;
    }
    if env.user_agent.is_some() {
        config.detector.user_agent = env.user_agent;
    }

    config.metadata = ConfigMetadata {
        config_path,
        env_file_loaded,
    };

    (config, warnings)
}
