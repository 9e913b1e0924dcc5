//! Errors raised while loading or validating `easel.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Explicit path that does not exist. A missing default file falls back
    /// to built-in defaults instead.
    #[error("Config file {} not found (create one with `easel config init`)", .0.display())]
    NotFound(PathBuf),

    #[error("Config file {} is not valid TOML: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A setting has a value the gateway cannot run with; `field` is the
    /// dotted TOML path (e.g. `providers[2].id`).
    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Missing required setting '{0}'")]
    MissingField(String),
}
