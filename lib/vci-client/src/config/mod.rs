use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
#[cfg(feature = "config_env")]
use figment::providers::Env;
#[cfg(feature = "config_json")]
use figment::providers::Json;
#[cfg(feature = "config_yaml")]
use figment::providers::Yaml;
use figment::providers::{Data, Format};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use thiserror::Error;


pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_OFFER_URL_SCHEME: &str = "openid-credential-offer";
pub const DEFAULT_TRUSTED_ISSUERS_STORAGE_KEY: &str = "trusted_issuers_vci";
pub const DEFAULT_LDP_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

#[derive(Debug, Error)]
pub enum ConfigParsingError {
    #[error("Unsupported config file `{0}`")]
    UnsupportedFile(PathBuf),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VCIClientConfig {
    /// Per-call timeout for discovery and offer fetches, and the default for
    /// credential requests
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub network_timeout: Duration,
    pub offer_url_scheme: String,
    pub trusted_issuers_storage_key: String,
    /// `@context` sent for linked-data credentials whose configuration declares none
    pub default_ldp_context: Vec<String>,
}

impl Default for VCIClientConfig {
    fn default() -> Self {
        Self {
            network_timeout: DEFAULT_NETWORK_TIMEOUT,
            offer_url_scheme: DEFAULT_OFFER_URL_SCHEME.to_string(),
            trusted_issuers_storage_key: DEFAULT_TRUSTED_ISSUERS_STORAGE_KEY.to_string(),
            default_ldp_context: vec![DEFAULT_LDP_CONTEXT.to_string()],
        }
    }
}

/// One layer of configuration; later layers override earlier ones
pub enum ConfigSource {
    #[cfg(feature = "config_yaml")]
    Yaml(Data<Yaml>),
    #[cfg(feature = "config_json")]
    Json(Data<Json>),
}

impl ConfigSource {
    /// Picks the format from the file extension (`.yml`/`.yaml`, `.json`)
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigParsingError> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|extension| extension.to_str());

        match extension {
            #[cfg(feature = "config_yaml")]
            Some("yml" | "yaml") => Ok(Self::Yaml(Yaml::file(path))),
            #[cfg(feature = "config_json")]
            Some("json") => Ok(Self::Json(Json::file(path))),
            _ => Err(ConfigParsingError::UnsupportedFile(path.to_path_buf())),
        }
    }

    fn merge_into(self, figment: Figment) -> Figment {
        match self {
            #[cfg(feature = "config_yaml")]
            Self::Yaml(data) => figment.merge(data),
            #[cfg(feature = "config_json")]
            Self::Json(data) => figment.merge(data),
        }
    }
}

impl VCIClientConfig {
    pub fn from_files(files: &[impl AsRef<Path>]) -> Result<Self, ConfigParsingError> {
        let sources = files
            .iter()
            .map(ConfigSource::from_path)
            .collect::<Result<Vec<_>, _>>()?;

        Self::parse(sources)
    }

    #[cfg(feature = "config_yaml")]
    pub fn from_yaml(
        configs: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, ConfigParsingError> {
        Self::parse(
            configs
                .into_iter()
                .map(|config| ConfigSource::Yaml(Yaml::string(config.as_ref()))),
        )
    }

    #[cfg(feature = "config_json")]
    pub fn from_json(
        configs: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, ConfigParsingError> {
        Self::parse(
            configs
                .into_iter()
                .map(|config| ConfigSource::Json(Json::string(config.as_ref()))),
        )
    }

    /// Merges `sources` in order. With `config_env`, `VCI_`-prefixed environment
    /// variables are applied last.
    pub fn parse(
        sources: impl IntoIterator<Item = ConfigSource>,
    ) -> Result<Self, ConfigParsingError> {
        let figment = sources
            .into_iter()
            .fold(Figment::new(), |figment, source| source.merge_into(figment));

        #[cfg(feature = "config_env")]
        let figment = figment.merge(Env::prefixed("VCI_").split("__").lowercase(false));

        figment
            .extract()
            .map_err(|error| ConfigParsingError::Invalid(error.to_string()))
    }
}
