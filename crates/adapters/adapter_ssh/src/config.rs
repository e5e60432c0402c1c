//! SSH and Wake-on-LAN configuration.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

use serde::Deserialize;

/// How to reach the ESXi host.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Host name or address, optionally with `:port` (defaults to 22).
    pub url: String,
    /// SSH user.
    pub username: String,
    /// SSH password.
    pub password: String,
    /// Hardware address used for Wake-on-LAN.
    pub mac_address: String,
    /// Connect and handshake timeout, in seconds.
    pub ssh_timeout_secs: u64,
}

impl SshConfig {
    /// `host:port` to dial, appending port 22 when none is given.
    #[must_use]
    pub fn address(&self) -> String {
        let url = self.url.trim();
        let has_port = match url.rsplit_once(':') {
            // Bracketed IPv6 literal: only a port if it follows the `]`.
            Some((host, port)) if url.starts_with('[') => {
                host.ends_with(']') && port.parse::<u16>().is_ok()
            }
            Some((host, port)) => !host.contains(':') && port.parse::<u16>().is_ok(),
            None => false,
        };
        if has_port {
            url.to_string()
        } else {
            format!("{url}:22")
        }
    }

    /// Names of required fields that are empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("url", self.url.is_empty()),
            ("username", self.username.is_empty()),
            ("password", self.password.is_empty()),
            ("mac_address", self.mac_address.is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            mac_address: String::new(),
            ssh_timeout_secs: 5,
        }
    }
}

impl fmt::Debug for SshConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mac_address", &self.mac_address)
            .field("ssh_timeout_secs", &self.ssh_timeout_secs)
            .finish()
    }
}

/// Where magic packets are sent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WolConfig {
    /// UDP destination, usually the limited broadcast address on port 9.
    pub broadcast_addr: SocketAddr,
}

impl Default for WolConfig {
    fn default() -> Self {
        Self {
            broadcast_addr: SocketAddr::from((Ipv4Addr::BROADCAST, 9)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> SshConfig {
        SshConfig {
            url: url.to_string(),
            ..SshConfig::default()
        }
    }

    #[test]
    fn should_have_sensible_defaults() {
        let config = SshConfig::default();
        assert_eq!(config.ssh_timeout_secs, 5);
        assert!(config.url.is_empty());
        assert_eq!(
            WolConfig::default().broadcast_addr,
            "255.255.255.255:9".parse().unwrap()
        );
    }

    #[test]
    fn should_append_default_port() {
        assert_eq!(with_url("esxi.lan").address(), "esxi.lan:22");
        assert_eq!(with_url("192.168.1.20").address(), "192.168.1.20:22");
    }

    #[test]
    fn should_keep_explicit_port() {
        assert_eq!(with_url("esxi.lan:2222").address(), "esxi.lan:2222");
        assert_eq!(with_url("[fe80::1]:2222").address(), "[fe80::1]:2222");
    }

    #[test]
    fn should_not_mistake_ipv6_groups_for_port() {
        assert_eq!(with_url("[fe80::1]").address(), "[fe80::1]:22");
    }

    #[test]
    fn should_list_missing_fields() {
        let config = SshConfig {
            url: "esxi.lan".to_string(),
            username: "root".to_string(),
            ..SshConfig::default()
        };
        assert_eq!(config.missing_fields(), vec!["password", "mac_address"]);
    }

    #[test]
    fn should_redact_password_in_debug_output() {
        let config = SshConfig {
            password: "hunter2".to_string(),
            ..SshConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            url = "esxi.lan"
            username = "root"
            password = "secret"
            mac_address = "00:11:22:33:44:55"
            ssh_timeout_secs = 10
        "#;
        let config: SshConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.url, "esxi.lan");
        assert_eq!(config.username, "root");
        assert_eq!(config.password, "secret");
        assert_eq!(config.mac_address, "00:11:22:33:44:55");
        assert_eq!(config.ssh_timeout_secs, 10);
    }

    #[test]
    fn should_deserialize_broadcast_address() {
        let config: WolConfig = toml::from_str(r#"broadcast_addr = "192.168.1.255:7""#).unwrap();
        assert_eq!(config.broadcast_addr, "192.168.1.255:7".parse().unwrap());
    }
}
