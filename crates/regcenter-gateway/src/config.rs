//! Configuration management for the gateway
//!
//! Configuration is resolved once at startup from, in increasing priority:
//! built-in defaults, the YAML file, `REGCENTER_*` environment variables and
//! command line flags. The resulting [`GatewayConfig`] is immutable for the
//! life of the process and is shared behind an `Arc`.

use clap::Parser;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use regcenter_client::CONSUL_TYPE;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "REGCENTER";

/// Command line arguments for the gateway
#[derive(Debug, Default, Parser)]
#[command(
    name = "regcenter-gateway",
    version,
    about = "Configuration and service registry gateway"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short = 'c',
        long = "config",
        env = "REGCENTER_CONFIG_FILE",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config_file: String,

    /// HTTP port the gateway listens on
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Enable token exchange with the registry ACL system
    #[arg(long = "security-enabled")]
    pub security_enabled: Option<bool>,

    /// Reach the registry directly instead of through the API gateway
    #[arg(long = "zero-trust")]
    pub zero_trust: Option<bool>,
}

/// The gateway's own service identity
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceInfo {
    pub key: String,
    pub host: String,
    pub port: u16,
    pub server_bind_addr: String,
    pub health_check_interval: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            key: "regcenter-gateway".to_string(),
            host: "localhost".to_string(),
            port: 4000,
            server_bind_addr: "0.0.0.0".to_string(),
            health_check_interval: "10s".to_string(),
        }
    }
}

/// Configuration store / registry backend location
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryInfo {
    pub host: String,
    pub port: u16,
    pub r#type: String,
    pub config_registry_stem: String,
    pub service_version: String,
    /// Deadline for every outbound backend and token exchange request
    pub timeout_ms: u64,
    pub self_register: bool,
}

impl Default for RegistryInfo {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8500,
            r#type: CONSUL_TYPE.to_string(),
            config_registry_stem: "edgex/".to_string(),
            service_version: "v4".to_string(),
            timeout_ms: 5000,
            self_register: false,
        }
    }
}

/// API gateway used for the proxied token exchange route
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiGatewayInfo {
    pub server: String,
    pub application_port: u16,
}

impl Default for ApiGatewayInfo {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            application_port: 8000,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityInfo {
    pub enabled: bool,
    pub zero_trust_enabled: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LogInfo {
    pub dir: Option<String>,
    pub console: bool,
    pub file: bool,
    pub level: String,
    /// "daily", "hourly" or "never"
    pub rotation: String,
}

impl Default for LogInfo {
    fn default() -> Self {
        Self {
            dir: None,
            console: true,
            file: false,
            level: "info".to_string(),
            rotation: "daily".to_string(),
        }
    }
}

/// Process-wide gateway configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub service: ServiceInfo,
    pub registry: RegistryInfo,
    pub api_gateway: ApiGatewayInfo,
    pub security: SecurityInfo,
    pub log: LogInfo,
}

impl GatewayConfig {
    /// Load configuration from the file named by `cli`, the environment and
    /// the command line flags
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(config::File::with_name(&cli.config_file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(port) = cli.port {
            builder = builder.set_override("service.port", i64::from(port))?;
        }
        if let Some(enabled) = cli.security_enabled {
            builder = builder.set_override("security.enabled", enabled)?;
        }
        if let Some(zero_trust) = cli.zero_trust {
            builder = builder.set_override("security.zero_trust_enabled", zero_trust)?;
        }

        let config: GatewayConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configuration the gateway cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid =
            |message: &str| -> Result<(), ConfigError> { Err(ConfigError::Message(message.to_string())) };

        if self.service.key.trim().is_empty() {
            return invalid("service.key must not be empty");
        }
        if self.service.port == 0 {
            return invalid("service.port must be set");
        }
        if self.registry.host.trim().is_empty() {
            return invalid("registry.host must not be empty");
        }
        if self.registry.port == 0 {
            return invalid("registry.port must be set");
        }
        if !self.registry.r#type.eq_ignore_ascii_case(CONSUL_TYPE) {
            return Err(ConfigError::Message(format!(
                "registry.type '{}' is not supported",
                self.registry.r#type
            )));
        }
        if self.registry.timeout_ms == 0 {
            return invalid("registry.timeout_ms must be greater than zero");
        }
        if self.security.enabled && !self.security.zero_trust_enabled {
            if self.api_gateway.server.trim().is_empty() {
                return invalid("api_gateway.server must not be empty when security is enabled");
            }
            if self.api_gateway.application_port == 0 {
                return invalid("api_gateway.application_port must be set when security is enabled");
            }
        }
        Ok(())
    }

    /// Key prefix of a service's configuration namespace
    pub fn config_base_path(&self, service_key: &str) -> String {
        format!(
            "{}{}/{}",
            self.registry.config_registry_stem, self.registry.service_version, service_key
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn cli_for(path: &str) -> Cli {
        Cli {
            config_file: path.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry.port, 8500);
        assert_eq!(config.registry.r#type, "consul");
        assert!(!config.security.enabled);
    }

    #[test]
    fn test_config_base_path() {
        let config = GatewayConfig::default();
        assert_eq!(config.config_base_path("core-data"), "edgex/v4/core-data");
    }

    #[test]
    fn test_load_from_file_with_cli_overrides() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(
            file,
            "registry:\n  host: consul.edgex\n  port: 8501\n  service_version: v3\nsecurity:\n  enabled: true\n  zero_trust_enabled: false"
        )
        .unwrap();

        let cli = Cli {
            port: Some(4100),
            zero_trust: Some(true),
            ..cli_for(file.path().to_str().unwrap())
        };
        let config = GatewayConfig::load(&cli).unwrap();

        assert_eq!(config.registry.host, "consul.edgex");
        assert_eq!(config.registry.port, 8501);
        assert_eq!(config.registry.service_version, "v3");
        assert_eq!(config.registry.config_registry_stem, "edgex/");
        assert_eq!(config.service.port, 4100);
        assert!(config.security.enabled);
        assert!(config.security.zero_trust_enabled);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = GatewayConfig::load(&cli_for("/nonexistent/regcenter.yml")).unwrap();
        assert_eq!(config.service.key, "regcenter-gateway");
        assert_eq!(config.api_gateway.application_port, 8000);
    }

    #[test]
    fn test_load_rejects_unsupported_registry_type() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "registry:\n  type: zookeeper").unwrap();

        let err = GatewayConfig::load(&cli_for(file.path().to_str().unwrap())).unwrap_err();
        assert!(err.to_string().contains("zookeeper"));
    }

    #[test]
    fn test_validate_rejects_missing_endpoints() {
        let mut config = GatewayConfig::default();
        config.registry.host = String::new();
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.security.enabled = true;
        config.api_gateway.application_port = 0;
        assert!(config.validate().is_err());

        config.security.zero_trust_enabled = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "regcenter-gateway",
            "--config",
            "/etc/regcenter.yml",
            "--port",
            "4500",
            "--security-enabled",
            "true",
        ]);
        assert_eq!(cli.config_file, "/etc/regcenter.yml");
        assert_eq!(cli.port, Some(4500));
        assert_eq!(cli.security_enabled, Some(true));
        assert_eq!(cli.zero_trust, None);
    }
}
