//! Server configuration: built-in defaults, an optional TOML file, and
//! `ARC_`-prefixed environment variables, layered with `figment`.

use std::path::PathBuf;

use arc_core::SortPolicy;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Server configuration, loadable from defaults, a TOML file, and the
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Directory holding `data.db`. Created if it does not exist.
    pub data_dir: PathBuf,
    /// Address the HTTP listener binds to.
    pub bind_addr: String,
    /// Default sort policy for `GET /ready` when the query omits `sort`.
    pub default_sort: SortPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./arc-data"),
            bind_addr: "127.0.0.1:7420".to_string(),
            default_sort: SortPolicy::Hybrid,
        }
    }
}

impl ServerConfig {
    /// Layer built-in defaults, an optional TOML file at `config_path`, and
    /// `ARC_`-prefixed environment variables, in ascending priority.
    pub fn load(config_path: Option<&std::path::Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(ServerConfig::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("ARC_"));
        figment.extract()
    }
}
