//! Logic for loading configuration in to an object model
mod expansion;

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use derivative::Derivative;
use displaydoc::Display;
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::gen::SchemaSettings;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

pub(crate) use self::expansion::Expansion;

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not read configuration file '{path}': {error}
    CannotRead {
        /// The configuration file.
        path: String,
        /// The underlying io error.
        error: std::io::Error,
    },
    /// could not parse configuration: {0}
    CannotParse(serde_yaml::Error),
    /// could not deserialize configuration: {0}
    DeserializeConfigError(serde_json::Error),
    /// environment variable '{0}' is not set and has no default
    UnknownEnvironmentVariable(String),
    /// {message}: {error}
    InvalidConfiguration {
        /// What was being configured.
        message: &'static str,
        /// The reason it was rejected.
        error: String,
    },
}

/// The configuration for the storefront server.
///
/// Can be created through `serde::Deserialize` from YAML, after
/// `${env.NAME}` references have been expanded.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// Configuration options pertaining to the http server component.
    #[serde(default)]
    pub server: Server,

    /// The commerce platform the resolvers call into.
    pub platform: Platform,

    /// Catalog specific options.
    #[serde(default)]
    pub catalog: Catalog,

    /// Localization of catalog names.
    #[serde(default)]
    pub messages: Messages,
}

impl Configuration {
    /// Read and expand the YAML file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let raw = fs::read_to_string(path).map_err(|error| ConfigurationError::CannotRead {
            path: path.display().to_string(),
            error,
        })?;
        raw.parse()
    }

    pub(crate) fn from_yaml(raw: &str, expansion: &Expansion) -> Result<Self, ConfigurationError> {
        let value: serde_json::Value =
            serde_yaml::from_str(raw).map_err(ConfigurationError::CannotParse)?;
        let value = expansion.expand(value)?;
        let configuration: Configuration =
            serde_json::from_value(value).map_err(ConfigurationError::DeserializeConfigError)?;
        configuration.validate()
    }

    fn validate(self) -> Result<Self, ConfigurationError> {
        if !self.server.graphql_path.starts_with('/') {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "graphql path must start with '/'",
                error: self.server.graphql_path,
            });
        }
        if self.platform.base_url.is_none() && self.platform.account.is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "platform account must be set",
                error: "either `platform.account` or `platform.base_url` is required".to_string(),
            });
        }
        Ok(self)
    }
}

impl FromStr for Configuration {
    type Err = ConfigurationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Configuration::from_yaml(raw, &Expansion::from_env())
    }
}

/// Generate a JSON schema for the configuration.
pub fn generate_config_schema() -> RootSchema {
    SchemaSettings::draft2019_09()
        .into_generator()
        .into_root_schema_for::<Configuration>()
}

/// Listening address and GraphQL endpoint.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Server {
    /// The socket address and port to listen on
    /// Defaults to 127.0.0.1:4000
    pub listen: SocketAddr,

    /// The path the GraphQL endpoint is served on.
    /// Defaults to /graphql
    pub graphql_path: String,

    /// Serve GraphiQL on GET requests to the GraphQL endpoint.
    pub graphiql: bool,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 4000)),
            graphql_path: "/graphql".to_string(),
            graphiql: true,
        }
    }
}

/// Commerce platform account and credentials.
#[derive(Clone, Derivative, Deserialize, Serialize, JsonSchema)]
#[derivative(Debug)]
#[serde(deny_unknown_fields)]
pub struct Platform {
    /// The store account name.
    #[serde(default)]
    pub account: String,

    /// The platform environment, used to derive the default base url.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Overrides the `https://{account}.{environment}.com.br` base url.
    #[serde(default)]
    pub base_url: Option<Url>,

    /// Application key sent with every platform call.
    #[serde(default)]
    pub app_key: Option<String>,

    /// Application token sent with every platform call.
    #[serde(default)]
    #[derivative(Debug = "ignore")]
    pub app_token: Option<String>,

    /// Timeout for each platform call.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    #[schemars(with = "String")]
    pub timeout: Duration,
}

fn default_environment() -> String {
    "vtexcommercestable".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Platform {
    /// The url every platform path is resolved against.
    pub fn base_url(&self) -> Result<Url, ConfigurationError> {
        if let Some(base_url) = &self.base_url {
            return Ok(base_url.clone());
        }
        Url::parse(&format!(
            "https://{}.{}.com.br",
            self.account, self.environment
        ))
        .map_err(|error| ConfigurationError::InvalidConfiguration {
            message: "could not derive the platform base url",
            error: error.to_string(),
        })
    }
}

static DEFAULT_URL_HOST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://[A-z0-9]+\.vtexcommercestable\.com\.br")
        .expect("default url host pattern is valid")
});

/// Catalog specific options.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Catalog {
    /// Scheme and host prefix stripped from category urls before building an href.
    #[serde(with = "serde_regex")]
    #[schemars(with = "String")]
    pub url_host_pattern: Regex,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            url_host_pattern: DEFAULT_URL_HOST_PATTERN.clone(),
        }
    }
}

/// Localization service options.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Messages {
    /// The translation endpoint. Names are returned untranslated when unset.
    pub endpoint: Option<Url>,

    /// The locale names are translated to.
    pub locale: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            endpoint: None,
            locale: "en-US".to_string(),
        }
    }
}
