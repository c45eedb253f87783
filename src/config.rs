use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::api::{ApiClient, ApiError};
use crate::cache::default_cache_path;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("no access token: pass --token, set WSF_ACCESS_TOKEN or add access_token to the config file")]
    MissingToken,
    #[error("no home directory to keep the cache in; set cache_path in the config file")]
    NoCachePath,
}

/// Contents of `config.yaml`. Every key is optional.
///
/// ```yaml
/// access_token: afddf683-0000-0000-0000-000000000000
/// base_url: http://www.wsdot.wa.gov/ferries/api/schedule/rest
/// cache_path: /var/tmp/wsf.cache
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct WsfConfig {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

impl WsfConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// An explicitly named file must exist; the default location may be absent.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// A token given on the command line (or via env) wins over the file.
    pub fn access_token(&self, overriding: Option<String>) -> Result<String, ConfigError> {
        overriding
            .or_else(|| self.access_token.clone())
            .ok_or(ConfigError::MissingToken)
    }

    pub fn cache_path(&self) -> Result<PathBuf, ConfigError> {
        self.cache_path
            .clone()
            .or_else(default_cache_path)
            .ok_or(ConfigError::NoCachePath)
    }

    pub fn api_client(&self, access_token: String) -> Result<ApiClient, ApiError> {
        match &self.base_url {
            Some(base) => ApiClient::with_base_url(base, access_token),
            None => Ok(ApiClient::new(access_token)),
        }
    }
}

/// `$XDG_CONFIG_HOME/wsf/config.yaml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wsf").join("config.yaml"))
}
