//! File and console logging
//!
//! | Log File               | Component                        | Target Prefixes                              |
//! |------------------------|----------------------------------|----------------------------------------------|
//! | regcenter-gateway.log  | Root logger (all components)     | (all)                                        |
//! | auth.log               | ACL token exchange               | regcenter_gateway::auth                      |
//! | backend.log            | Configuration store and registry | regcenter_client, regcenter_gateway::factory |
//!
//! Log files are stored in `~/regcenter/logs` by default.
//! Override with `REGCENTER_LOG_DIR` or `log.dir` in the configuration file.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::LogInfo;

const ROOT_LOG_FILE: &str = "regcenter-gateway.log";

struct ComponentLogDef {
    file_name: &'static str,
    /// Target module prefixes routed to this file
    targets: &'static [&'static str],
}

const COMPONENT_LOGS: &[ComponentLogDef] = &[
    ComponentLogDef {
        file_name: "auth.log",
        targets: &["regcenter_gateway::auth"],
    },
    ComponentLogDef {
        file_name: "backend.log",
        targets: &["regcenter_client", "regcenter_gateway::factory"],
    },
];

/// Log rotation policy
#[derive(Debug, Clone, Copy)]
pub enum LogRotation {
    Daily,
    Hourly,
    Never,
}

impl FromStr for LogRotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(LogRotation::Daily),
            "hourly" => Ok(LogRotation::Hourly),
            "never" => Ok(LogRotation::Never),
            other => Err(format!("unknown log rotation '{}'", other)),
        }
    }
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(format!("{}/regcenter/logs", home))
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub console_output: bool,
    pub level: Level,
    pub file_logging: bool,
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            console_output: true,
            level: Level::INFO,
            file_logging: false,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    /// Create from the `log` section of the gateway configuration.
    pub fn from_config(log: &LogInfo) -> Self {
        Self {
            log_dir: log.dir.clone().map(PathBuf::from).unwrap_or_else(default_log_dir),
            console_output: log.console,
            level: log.level.parse().unwrap_or(Level::INFO),
            file_logging: log.file,
            rotation: log.rotation.parse().unwrap_or(LogRotation::Daily),
        }
    }

    /// Layer `REGCENTER_LOG_*` environment variables over this configuration.
    /// Unset or unparsable variables keep the configured value.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("REGCENTER_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(v) = lookup("REGCENTER_LOG_CONSOLE") {
            self.console_output = v.to_lowercase() != "false" && v != "0";
        }
        if let Some(v) = lookup("REGCENTER_LOG_FILE") {
            self.file_logging = v.to_lowercase() == "true" || v == "1";
        }
        if let Some(level) = lookup("REGCENTER_LOG_LEVEL").and_then(|v| v.parse().ok()) {
            self.level = level;
        }
        if let Some(rotation) = lookup("REGCENTER_LOG_ROTATION").and_then(|v| v.parse().ok()) {
            self.rotation = rotation;
        }
        self
    }
}

/// Keeps the non-blocking file writers alive. Dropping it flushes buffered
/// output.
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

/// Initialize console and file logging.
///
/// `RUST_LOG` overrides the configured level for the console and root file
/// layers. Component files use [`Targets`] filters to route events by module.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
    }

    let mut guards: Vec<WorkerGuard> = Vec::new();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.console_output {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));
        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_filter(filter);
        layers.push(Box::new(console_layer));
    }

    if config.file_logging {
        let root_appender =
            RollingFileAppender::new(config.rotation.into(), &config.log_dir, ROOT_LOG_FILE);
        let (root_nb, root_guard) = tracing_appender::non_blocking(root_appender);
        guards.push(root_guard);

        let root_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));
        let root_layer = fmt::layer()
            .with_writer(root_nb)
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_filter(root_filter);
        layers.push(Box::new(root_layer));

        for component in COMPONENT_LOGS {
            let appender = RollingFileAppender::new(
                config.rotation.into(),
                &config.log_dir,
                component.file_name,
            );
            let (nb, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            let level: LevelFilter = config.level.into();
            let mut targets = Targets::new();
            for target in component.targets {
                targets = targets.with_target(*target, level);
            }

            let layer = fmt::layer()
                .with_writer(nb)
                .with_target(true)
                .with_ansi(false)
                .with_filter(targets);
            layers.push(Box::new(layer));
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    if config.file_logging {
        tracing::info!(
            log_dir = %config.log_dir.display(),
            "File logging initialized: {} (root) + {} component log files",
            ROOT_LOG_FILE,
            COMPONENT_LOGS.len()
        );
    }

    Ok(LoggingGuard {
        _file_guards: guards,
    })
}
