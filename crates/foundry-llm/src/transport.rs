//! Transport options for the HTTP client
//!
//! Some execution environments cannot resolve or reach a provider hostname
//! over the default route (IPv6-only DNS answers, sandboxed resolvers). These
//! options are applied to the `reqwest::Client` of a single provider instead
//! of patching name resolution process-wide.

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

/// Default per-request socket timeout (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Address family used for outgoing connections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    /// Let the resolver decide
    #[default]
    Any,
    /// Bind sockets to IPv4 only
    V4,
    /// Bind sockets to IPv6 only
    V6,
}

/// A hostname resolved to a fixed address, bypassing DNS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedAddress {
    /// Hostname as it appears in endpoint URLs
    pub host: String,

    /// Address to connect to (the port is taken from the URL)
    pub addr: SocketAddr,
}

/// Transport configuration for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Address family preference
    pub ip_family: IpFamily,

    /// Hostnames pinned to fixed addresses
    pub pinned_addresses: Vec<PinnedAddress>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ip_family: IpFamily::Any,
            pinned_addresses: Vec::new(),
        }
    }
}

impl TransportConfig {
    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if let Some(pin) = self.pinned_addresses.iter().find(|p| p.host.trim().is_empty()) {
            return Err(format!("pinned address {} has an empty host", pin.addr));
        }
        Ok(())
    }

    /// Build an HTTP client honouring these options
    pub fn build_client(&self) -> Result<reqwest::Client, LlmError> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout());

        builder = match self.ip_family {
            IpFamily::Any => builder,
            IpFamily::V4 => builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            IpFamily::V6 => builder.local_address(IpAddr::V6(Ipv6Addr::UNSPECIFIED)),
        };

        for pin in &self.pinned_addresses {
            builder = builder.resolve(&pin.host, pin.addr);
        }

        builder
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))
    }
}
