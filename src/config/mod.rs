// Configuration module entry point
// Loads layered configuration: file, environment, built-in defaults

mod types;

use std::net::SocketAddr;

// Re-export public types
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig, SpaConfig};

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional. `SPA_`-prefixed environment variables override
    /// it, with `__` separating sections, e.g. `SPA_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SPA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("spa.root", ".")?
            .set_default("spa.sub_dir", "dist")?
            .set_default("spa.mount_prefix", "/")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-missing-config-file").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.spa.sub_dir, "dist");
        assert_eq!(cfg.spa.mount_prefix, "/");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.logging.log_file.is_none());
        assert_eq!(cfg.performance.read_timeout, 30);
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spa.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9090

[spa]
root = "/srv/www"
sub_dir = "ui"
mount_prefix = "/static/ui/"

[logging]
level = "debug"
access_log = false
"#,
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.spa.root, "/srv/www");
        assert_eq!(cfg.spa.sub_dir, "ui");
        assert_eq!(cfg.spa.mount_prefix, "/static/ui/");
        assert_eq!(cfg.logging.level, "debug");
        assert!(!cfg.logging.access_log);
        assert_eq!(cfg.socket_addr().unwrap().port(), 9090);
    }

    #[test]
    fn test_invalid_socket_addr() {
        let mut cfg = Config::load_from("definitely-missing-config-file").unwrap();
        cfg.server.host = "not an address".to_string();
        assert!(cfg.socket_addr().is_err());
    }
}
