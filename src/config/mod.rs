// Configuration module entry point
// Loads layered configuration and builds the runtime state shared by handlers

mod state;
mod types;

use std::net::{IpAddr, SocketAddr};

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};

pub use state::AppState;
pub use types::{Config, LogLevel};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

const DEFAULT_SERVER_NAME: &str = concat!("gallery-serve/", env!("CARGO_PKG_VERSION"));

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources in order: built-in defaults, the config file (optional),
    /// then `GALLERY_*` environment variables, e.g. `GALLERY_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, environment())
    }

    fn load_with_env(config_path: &str, env: Environment) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::with_name(config_path).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, no file or environment
    #[cfg(test)]
    pub fn defaults() -> Self {
        defaults()
            .and_then(|builder| builder.build())
            .and_then(|settings| settings.try_deserialize())
            .expect("built-in defaults must deserialize")
    }

    /// Accepts IPv4 and bare IPv6 hosts (`::`, `::1`)
    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|e| format!("Invalid address {}: {e}", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

fn environment() -> Environment {
    Environment::with_prefix("GALLERY")
        .prefix_separator("_")
        .separator("__")
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("paths.served_root", ".")?
        .set_default("paths.list_path", "/list-images")?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", "common")?
        .set_default("http.server_name", DEFAULT_SERVER_NAME)?
        .set_default("performance.read_timeout", 30)?
        .set_default("performance.keep_alive", true)
}
