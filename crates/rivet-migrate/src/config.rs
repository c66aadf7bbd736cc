//! Connection configuration.
//!
//! A configuration file holds named environments; each environment names a
//! dialect and either a full connection URL or the parts to build one from.
//!
//! ```json
//! {
//!   "default_environment": "local",
//!   "environments": {
//!     "local": { "adapter": "sqlite", "db_name": "app.sqlite3" },
//!     "production": {
//!       "adapter": "pgsql",
//!       "host": "db.internal",
//!       "db_name": "app",
//!       "username": "deploy",
//!       "password": "s3cret"
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rivet_core::Dialect;
use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

/// Charset used when an environment does not name one.
pub const DEFAULT_CHARSET: &str = "utf8";

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

/// Connection settings of one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Dialect of the server.
    pub adapter: Dialect,
    /// Full connection URL; takes precedence over the other fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Server host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Server port; the driver default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Database name, or the file path for SQLite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
    /// User name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Connection charset, also the default table charset on MySQL.
    #[serde(default = "default_charset")]
    pub charset: String,
}

impl EnvironmentConfig {
    /// Creates an environment for `adapter` with no connection details.
    #[must_use]
    pub fn new(adapter: Dialect) -> Self {
        Self {
            adapter,
            url: None,
            host: None,
            port: None,
            db_name: None,
            username: None,
            password: None,
            charset: default_charset(),
        }
    }

    /// Creates an environment from a connection URL.
    ///
    /// The dialect is taken from the URL scheme (`mysql:`, `postgres:`,
    /// `postgresql:`, `pgsql:` or `sqlite:`).
    pub fn from_url(url: &str) -> Result<Self> {
        let (scheme, _) = url.split_once(':').ok_or_else(|| {
            MigrateError::Config(format!("Missing scheme in database URL '{url}'"))
        })?;
        let adapter: Dialect = scheme.parse()?;
        Ok(Self {
            url: Some(url.to_string()),
            ..Self::new(adapter)
        })
    }

    /// Builds the sqlx connection URL.
    pub fn url(&self) -> Result<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let db_name = self.required(self.db_name.as_deref(), "db_name")?;
        if self.adapter == Dialect::Sqlite {
            return Ok(format!("sqlite:{db_name}"));
        }

        let host = self.required(self.host.as_deref(), "host")?;
        let scheme = match self.adapter {
            Dialect::Mysql => "mysql",
            _ => "postgres",
        };

        let mut url = format!("{scheme}://");
        if let Some(username) = &self.username {
            url.push_str(&encode(username));
            if let Some(password) = &self.password {
                url.push(':');
                url.push_str(&encode(password));
            }
            url.push('@');
        }
        url.push_str(host);
        if let Some(port) = self.port {
            url.push_str(&format!(":{port}"));
        }
        url.push('/');
        url.push_str(&encode(db_name));

        match self.adapter {
            Dialect::Mysql => url.push_str(&format!("?charset={}", encode(&self.charset))),
            _ => url.push_str(&format!(
                "?options=-c%20client_encoding%3D{}",
                encode(&self.charset)
            )),
        }
        Ok(url)
    }

    fn required<'a>(&self, value: Option<&'a str>, field: &str) -> Result<&'a str> {
        value.filter(|v| !v.is_empty()).ok_or_else(|| {
            MigrateError::Config(format!(
                "Missing '{field}' for {} environment",
                self.adapter
            ))
        })
    }
}

fn encode(part: &str) -> String {
    utf8_percent_encode(part, NON_ALPHANUMERIC).to_string()
}

/// A configuration file: named environments plus the default one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Environment used when none is requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_environment: Option<String>,
    /// Environments by name.
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Picks an environment.
    ///
    /// An explicit name wins, then `default_environment`, then the only
    /// environment of the file.
    pub fn environment(&self, name: Option<&str>) -> Result<&EnvironmentConfig> {
        let name = match name.or(self.default_environment.as_deref()) {
            Some(name) => name,
            None if self.environments.len() == 1 => {
                return self
                    .environments
                    .values()
                    .next()
                    .ok_or_else(|| MigrateError::Config("No environment configured".into()));
            }
            None => {
                return Err(MigrateError::Config(
                    "No environment selected and no default_environment set".into(),
                ));
            }
        };

        self.environments
            .get(name)
            .ok_or_else(|| MigrateError::Config(format!("Unknown environment '{name}'")))
    }
}
