use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::logging::DEFAULT_DIRECTIVE;

/// Settings of the `oppsql` server.
///
/// Read from an optional `oppsql.toml` (or `.json`, `.yaml`) in the working
/// directory, then overridden by `OPPSQL_DATABASE`, `OPPSQL_LISTEN` and
/// `OPPSQL_LOG`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Result file to serve.
    pub database: PathBuf,
    /// Address the HTTP server binds to.
    pub listen: String,
    /// Log filter directive.
    pub log: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database: PathBuf::from("results.sqlite"),
            listen: "127.0.0.1:8080".to_string(),
            log: DEFAULT_DIRECTIVE.to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Settings> {
        Settings::load_from("oppsql")
    }

    /// Like [`Settings::load`] with another base name for the settings file.
    pub fn load_from(name: &str) -> Result<Settings> {
        let settings = Config::builder()
            .add_source(File::with_name(name).required(false))
            .add_source(Environment::with_prefix("OPPSQL"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
