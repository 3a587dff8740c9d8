use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub host: HostSettings,
    #[serde(default)]
    pub web: WebSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_bind_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_bind_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }

/// Connection to the host's XMLSERVICE gateway
#[derive(Debug, Clone, Deserialize)]
pub struct HostSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_library")]
    pub library: String,
    #[serde(default = "default_ipc")]
    pub ipc: String,
    #[serde(default = "default_ctl")]
    pub ctl: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_output_size")]
    pub output_size: u64,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            database: default_database(),
            user: String::new(),
            password: String::new(),
            library: default_library(),
            ipc: default_ipc(),
            ctl: default_ctl(),
            timeout_secs: default_timeout_secs(),
            output_size: default_output_size(),
        }
    }
}

const GATEWAY_PATH: &str = "/cgi-bin/xmlcgi.pgm";

fn default_endpoint() -> String { endpoint_for_host("localhost") }
fn default_database() -> String { "*LOCAL".to_string() }
fn default_library() -> String { "USEDCAR".to_string() }
fn default_ipc() -> String { "*NA".to_string() }
fn default_ctl() -> String { "*here".to_string() }
fn default_timeout_secs() -> u64 { 30 }
// a full 999-row vehicle listing is a little over 2 MB of XML
fn default_output_size() -> u64 { 5_000_000 }

/// Gateway URL for a bare host name; full URLs are used as given
pub fn endpoint_for_host(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}{}", host, GATEWAY_PATH)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSettings {
    /// User id sent to the host for every change made through the site
    #[serde(default = "default_user")]
    pub default_user: String,
    #[serde(default = "default_flash_cookie")]
    pub flash_cookie: String,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            default_user: default_user(),
            flash_cookie: default_flash_cookie(),
        }
    }
}

fn default_user() -> String { "WEBUSER".to_string() }
fn default_flash_cookie() -> String { "usedcar_flash".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with USEDCAR_)
    /// 5. The host's `IBMI_*` variables
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., USEDCAR__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("USEDCAR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_host_env(settings, |key| std::env::var(key).ok())?;

        settings.try_deserialize()
    }
}

/// Apply `IBMI_USER`, `IBMI_PASSWORD`, `IBMI_HOST` and `IBMI_LIBRARY`
fn apply_host_env<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    if let Some(user) = lookup("IBMI_USER") {
        builder = builder.set_override("host.user", user)?;
    }
    if let Some(password) = lookup("IBMI_PASSWORD") {
        builder = builder.set_override("host.password", password)?;
    }
    if let Some(host) = lookup("IBMI_HOST") {
        builder = builder.set_override("host.endpoint", endpoint_for_host(&host))?;
    }
    if let Some(library) = lookup("IBMI_LIBRARY") {
        builder = builder.set_override("host.library", library)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.host.library, "USEDCAR");
        assert_eq!(settings.host.database, "*LOCAL");
        assert_eq!(settings.host.endpoint, "http://localhost/cgi-bin/xmlcgi.pgm");
        assert_eq!(settings.web.default_user, "WEBUSER");
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, "json");
    }

    #[test]
    fn test_empty_config_deserializes_to_defaults() {
        let settings: Settings = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.host.timeout_secs, 30);
        assert_eq!(settings.web.flash_cookie, "usedcar_flash");
    }

    #[test]
    fn test_host_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("IBMI_USER", "QPGMR"),
            ("IBMI_HOST", "ibmi.example.com"),
            ("IBMI_LIBRARY", "CARTEST"),
        ]
        .into_iter()
        .collect();

        let config = apply_host_env(Config::builder().build().unwrap(), |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();
        let settings: Settings = config.try_deserialize().unwrap();

        assert_eq!(settings.host.user, "QPGMR");
        assert_eq!(settings.host.password, "");
        assert_eq!(settings.host.library, "CARTEST");
        assert_eq!(
            settings.host.endpoint,
            "http://ibmi.example.com/cgi-bin/xmlcgi.pgm"
        );
    }

    #[test]
    fn test_endpoint_for_full_url() {
        assert_eq!(
            endpoint_for_host("https://gw.example.com/xml"),
            "https://gw.example.com/xml"
        );
    }
}
