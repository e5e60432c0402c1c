//! Configuration loading from the TOML file, `.env`, environment variables and CLI
//! flags, in increasing order of precedence.
//!
//! Looks for `esxi-manager.toml` in the working directory unless `--config`
//! points elsewhere. Every field has a default so the file is optional, but
//! the ESXi connection settings must come from somewhere.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser};
use esxi_manager_adapter_ssh::config::{SshConfig, WolConfig};
use esxi_manager_app::services::power_service::PowerPolicy;
use esxi_manager_domain::error::ValidationError;
use esxi_manager_domain::mac::MacAddress;
use esxi_manager_domain::schedule::OperatingHours;
use serde::Deserialize;

/// Command-line flags.
#[derive(Debug, Default, Parser)]
#[command(name = "esxi-managerd", version, about = "Power manager for a single ESXi host")]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "esxi-manager.toml")]
    pub config: PathBuf,
    /// Address to bind the web server to.
    #[arg(long)]
    pub host: Option<String>,
    /// Port to start the web server on.
    #[arg(long)]
    pub port: Option<u16>,
    /// Enable or disable the power-on/power-off schedule. A bare `--manage`
    /// means `true`.
    #[arg(
        long,
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub manage: Option<bool>,
}

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// ESXi host connection.
    pub esxi: SshConfig,
    /// Wake-on-LAN settings.
    pub wol: WolConfig,
    /// Power procedure timings.
    pub power: PowerConfig,
    /// Operating-hours schedule.
    pub schedule: ScheduleConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Power procedure timings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Reachability checks after a power command.
    pub retry_count: u32,
    /// Seconds between reachability checks.
    pub retry_delay_secs: u64,
    /// Seconds to let VMs stop before powering the host off.
    pub vm_shutdown_grace_secs: u64,
}

/// Schedule configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Run the schedule manager at all.
    pub manage: bool,
    /// IANA timezone the hours are expressed in.
    pub timezone: String,
    /// Hour the window opens (exclusive).
    pub start_hour: u32,
    /// Hour the window closes (exclusive).
    pub end_hour: u32,
    /// Seconds between two schedule checks.
    pub poll_interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from the file named by `cli` (if present), apply
    /// environment-variable overrides, then CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(&cli.config)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("ESXI_MANAGER_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("ESXI_MANAGER_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("ESXI_URL") {
            self.esxi.url = val;
        }
        if let Some(val) = var("ESXI_USER") {
            self.esxi.username = val;
        }
        if let Some(val) = var("ESXI_PASS") {
            self.esxi.password = val;
        }
        if let Some(val) = var("ESXI_MAC") {
            self.esxi.mac_address = val;
        }
        if let Some(addr) = var("ESXI_WOL_BROADCAST").and_then(|val| val.parse().ok()) {
            self.wol.broadcast_addr = addr;
        }
        if let Some(manage) = var("ESXI_MANAGER_MANAGE").and_then(|val| val.parse().ok()) {
            self.schedule.manage = manage;
        }
        if let Some(val) = var("ESXI_MANAGER_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(manage) = cli.manage {
            self.schedule.manage = manage;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        let missing = self.esxi.missing_fields();
        if !missing.is_empty() {
            return Err(ConfigError::Validation(format!(
                "missing required ESXi settings: {} (set ESXI_URL, ESXI_USER, ESXI_PASS, ESXI_MAC)",
                missing.join(", ")
            )));
        }
        self.esxi.mac_address.parse::<MacAddress>()?;
        if self.esxi.ssh_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "ssh timeout must be non-zero".to_string(),
            ));
        }
        if self.power.retry_count == 0 {
            return Err(ConfigError::Validation(
                "power retry count must be at least 1".to_string(),
            ));
        }
        self.operating_hours()?;
        if self.schedule.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "schedule poll interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Timings for the power service.
    #[must_use]
    pub fn power_policy(&self) -> PowerPolicy {
        PowerPolicy {
            retry_count: self.power.retry_count,
            retry_delay: Duration::from_secs(self.power.retry_delay_secs),
            vm_shutdown_grace: Duration::from_secs(self.power.vm_shutdown_grace_secs),
        }
    }

    /// The configured operating window.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown timezone or invalid hours.
    pub fn operating_hours(&self) -> Result<OperatingHours, ConfigError> {
        Ok(OperatingHours::new(
            &self.schedule.timezone,
            self.schedule.start_hour,
            self.schedule.end_hour,
        )?)
    }

    /// Pause between two schedule checks.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.poll_interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        let policy = PowerPolicy::default();
        Self {
            retry_count: policy.retry_count,
            retry_delay_secs: policy.retry_delay.as_secs(),
            vm_shutdown_grace_secs: policy.vm_shutdown_grace.as_secs(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            manage: true,
            timezone: "Europe/London".to_string(),
            start_hour: 17,
            end_hour: 20,
            poll_interval_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "esxi_managerd=info,esxi_manager=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// A value failed domain validation.
    #[error("invalid configuration")]
    Invalid(#[from] ValidationError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid() -> Config {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[
            ("ESXI_URL", "esxi.lan"),
            ("ESXI_USER", "root"),
            ("ESXI_PASS", "secret"),
            ("ESXI_MAC", "00:11:22:33:44:55"),
        ]));
        config
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(config.schedule.manage);
        assert_eq!(config.schedule.timezone, "Europe/London");
        assert_eq!(config.schedule.start_hour, 17);
        assert_eq!(config.schedule.end_hour, 20);
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.power_policy(), PowerPolicy::default());
        assert_eq!(config.esxi.ssh_timeout_secs, 5);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [esxi]
            url = 'esxi.lan:2222'
            username = 'root'
            password = 'secret'
            mac_address = 'aa:bb:cc:dd:ee:ff'
            ssh_timeout_secs = 3

            [wol]
            broadcast_addr = '192.168.1.255:9'

            [power]
            retry_count = 2
            retry_delay_secs = 1
            vm_shutdown_grace_secs = 5

            [schedule]
            manage = false
            timezone = 'UTC'
            start_hour = 8
            end_hour = 18
            poll_interval_secs = 30

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.esxi.address(), "esxi.lan:2222");
        assert_eq!(config.esxi.ssh_timeout_secs, 3);
        assert_eq!(config.wol.broadcast_addr, "192.168.1.255:9".parse().unwrap());
        assert_eq!(
            config.power_policy(),
            PowerPolicy {
                retry_count: 2,
                retry_delay: Duration::from_secs(1),
                vm_shutdown_grace: Duration::from_secs(5),
            }
        );
        assert!(!config.schedule.manage);
        assert_eq!(config.operating_hours().unwrap().start_hour(), 8);
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.logging.filter, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file(Path::new("nonexistent.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn should_apply_esxi_env_overrides() {
        let config = valid();
        assert_eq!(config.esxi.url, "esxi.lan");
        assert_eq!(config.esxi.username, "root");
        assert_eq!(config.esxi.password, "secret");
        assert_eq!(config.esxi.mac_address, "00:11:22:33:44:55");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_apply_server_and_schedule_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[
            ("ESXI_MANAGER_HOST", "127.0.0.1"),
            ("ESXI_MANAGER_PORT", "3000"),
            ("ESXI_MANAGER_MANAGE", "false"),
            ("ESXI_WOL_BROADCAST", "10.0.0.255:7"),
        ]));
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert!(!config.schedule.manage);
        assert_eq!(config.wol.broadcast_addr, "10.0.0.255:7".parse().unwrap());
    }

    #[test]
    fn should_ignore_unparseable_env_values() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[
            ("ESXI_MANAGER_PORT", "eighty"),
            ("ESXI_MANAGER_MANAGE", "maybe"),
        ]));
        assert_eq!(config.server.port, 8080);
        assert!(config.schedule.manage);
    }

    #[test]
    fn should_prefer_rust_log_over_manager_log() {
        let mut config = Config::default();
        config.apply_env_overrides(env(&[
            ("ESXI_MANAGER_LOG", "info"),
            ("RUST_LOG", "trace"),
        ]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_let_cli_flags_win_over_env() {
        let mut config = valid();
        config.apply_env_overrides(env(&[("ESXI_MANAGER_PORT", "3000")]));
        let cli = Cli::parse_from(["esxi-managerd", "--port", "9000", "--manage", "false"]);

        config.apply_cli(&cli);

        assert_eq!(config.server.port, 9000);
        assert!(!config.schedule.manage);
    }

    #[test]
    fn should_enable_management_with_bare_flag() {
        let cli = Cli::parse_from(["esxi-managerd", "--manage"]);
        assert_eq!(cli.manage, Some(true));

        let cli = Cli::parse_from(["esxi-managerd", "--manage", "--port", "9000"]);
        assert_eq!(cli.manage, Some(true));
        assert_eq!(cli.port, Some(9000));
    }

    #[test]
    fn should_default_cli_config_path() {
        let cli = Cli::parse_from(["esxi-managerd"]);
        assert_eq!(cli.config, PathBuf::from("esxi-manager.toml"));
        assert_eq!(cli.port, None);
        assert_eq!(cli.manage, None);
    }

    #[test]
    fn should_reject_missing_credentials() {
        let err = Config::default().validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("url, username, password, mac_address"));
    }

    #[test]
    fn should_reject_invalid_mac_address() {
        let mut config = valid();
        config.esxi.mac_address = "nope".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(ValidationError::InvalidMacAddress(_)))
        ));
    }

    #[test]
    fn should_reject_unknown_timezone() {
        let mut config = valid();
        config.schedule.timezone = "Atlantis/Lost".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(ValidationError::InvalidTimezone(_)))
        ));
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = valid();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_poll_interval() {
        let mut config = valid();
        config.schedule.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_ssh_timeout() {
        let mut config = valid();
        config.esxi.ssh_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ssh timeout"));
    }

    #[test]
    fn should_reject_zero_retry_count() {
        let mut config = valid();
        config.power.retry_count = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retry count"));
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
