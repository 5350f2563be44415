//! Sanity checks on the configured target, run once at startup.
//!
//! Private and loopback addresses are fine here: watching a box on the local
//! network is the common case.

use anyhow::{Result, anyhow};
use std::net::{IpAddr, Ipv6Addr};
use url::Url;

use super::types::Target;

/// Validates a target based on its type
pub fn validate_target(target: &Target) -> Result<()> {
    match target {
        Target::Url(url) => validate_http_target(url),
        Target::Host(host) => validate_icmp_target(host),
    }
}

/// Validate HTTP/HTTPS target
fn validate_http_target(target: &str) -> Result<()> {
    let url = Url::parse(target).map_err(|e| anyhow!("Invalid URL: {}", e))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("Invalid scheme for HTTP target: {}", other)),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(anyhow!("URL has no host: {}", target));
    }

    if url.port() == Some(0) {
        return Err(anyhow!("Port 0 is not valid"));
    }

    Ok(())
}

/// Validate ICMP target
fn validate_icmp_target(target: &str) -> Result<()> {
    if target.is_empty() {
        return Err(anyhow!("Target must not be empty"));
    }

    // Handed to `ping` as an argument
    if target.starts_with('-') {
        return Err(anyhow!("Host must not start with '-': {}", target));
    }

    if target.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    // Link-local IPv6 with an interface, e.g. fe80::1%eth0
    if let Some((addr, zone)) = target.split_once('%') {
        let valid_zone = !zone.is_empty()
            && zone.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if addr.parse::<Ipv6Addr>().is_ok() && valid_zone {
            return Ok(());
        }
        return Err(anyhow!("Invalid scoped IPv6 address: {}", target));
    }

    // Fully qualified names may end in a dot
    let name = target.strip_suffix('.').unwrap_or(target);

    let valid_hostname = name.len() <= 253
        && name.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        });

    if !valid_hostname {
        return Err(anyhow!("Invalid host name: {}", target));
    }

    Ok(())
}

/// Validate timeout is reasonable
pub fn validate_timeout(timeout_seconds: u64) -> Result<()> {
    const MIN_TIMEOUT: u64 = 1;
    const MAX_TIMEOUT: u64 = 300; // 5 minutes

    if timeout_seconds < MIN_TIMEOUT {
        return Err(anyhow!(
            "Timeout too short: {} seconds (minimum: {})",
            timeout_seconds,
            MIN_TIMEOUT
        ));
    }

    if timeout_seconds > MAX_TIMEOUT {
        return Err(anyhow!(
            "Timeout too long: {} seconds (maximum: {})",
            timeout_seconds,
            MAX_TIMEOUT
        ));
    }

    Ok(())
}
