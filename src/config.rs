// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

use std::time::Duration;

use crate::error::{Error, Result};

/// Connection configuration, read once at startup and cloned into each
/// worker. There is no ambient global; callers hand a `Config` to
/// [`crate::Client::connect`].
#[derive(Debug, Clone)]
pub struct Config {
	/// Server hostname or IP.
	pub host: String,
	/// Server port.
	pub port: u16,
	/// WebSocket path on the server.
	pub path: String,
	/// Use `wss://` over TLS instead of `ws://`.
	pub secure: bool,
	/// Number of persistent connection workers.
	pub pool_size: usize,
	/// Additional transient workers the pool may create under load.
	pub max_overflow: usize,
	/// Interval between keep-alive pings. Zero disables scheduling.
	pub ping_delay: Duration,
	/// Transport-level options passed to the TCP/TLS stack.
	pub opts: TransportOptions,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			host: "localhost".to_string(),
			port: 8182,
			path: "/gremlin".to_string(),
			secure: false,
			pool_size: 4,
			max_overflow: 8,
			ping_delay: Duration::from_secs(60),
			opts: TransportOptions::default(),
		}
	}
}

impl Config {
	pub fn new(host: impl Into<String>) -> Self {
		Self {
			host: host.into(),
			..Self::default()
		}
	}

	/// Parse a `ws://host:port/path` or `wss://host:port/path` URL.
	pub fn from_url(url: &str) -> Result<Self> {
		let (secure, rest) = if let Some(rest) = url.strip_prefix("ws://") {
			(false, rest)
		} else if let Some(rest) = url.strip_prefix("wss://") {
			(true, rest)
		} else {
			return Err(Error::InvalidUrl(url.to_string()));
		};

		let (authority, path) = match rest.find('/') {
			Some(i) => (&rest[..i], rest[i..].to_string()),
			None => (rest, "/gremlin".to_string()),
		};
		if authority.is_empty() {
			return Err(Error::InvalidUrl(url.to_string()));
		}

		let (host, port) = split_authority(authority)?;

		Ok(Self {
			host,
			port,
			path,
			secure,
			..Self::default()
		})
	}

	pub fn port(mut self, port: u16) -> Self {
		self.port = port;
		self
	}

	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.path = path.into();
		self
	}

	pub fn secure(mut self, secure: bool) -> Self {
		self.secure = secure;
		self
	}

	pub fn pool_size(mut self, pool_size: usize) -> Self {
		self.pool_size = pool_size;
		self
	}

	pub fn max_overflow(mut self, max_overflow: usize) -> Self {
		self.max_overflow = max_overflow;
		self
	}

	pub fn ping_delay(mut self, ping_delay: Duration) -> Self {
		self.ping_delay = ping_delay;
		self
	}

	pub fn opts(mut self, opts: TransportOptions) -> Self {
		self.opts = opts;
		self
	}
}

/// Split `host[:port]`, handling bracketed IPv6 literals.
fn split_authority(authority: &str) -> Result<(String, u16)> {
	if let Some(rest) = authority.strip_prefix('[') {
		let end = rest.find(']').ok_or_else(|| {
			Error::InvalidUrl(authority.to_string())
		})?;
		let host = rest[..end].to_string();
		let after = &rest[end + 1..];
		if after.is_empty() {
			return Ok((host, Config::default().port));
		}
		let port_str = after.strip_prefix(':').ok_or_else(|| {
			Error::InvalidUrl(authority.to_string())
		})?;
		let port = port_str.parse::<u16>().map_err(|_| {
			Error::InvalidPort(port_str.to_string())
		})?;
		return Ok((host, port));
	}

	match authority.rsplit_once(':') {
		Some((host, port_str)) => {
			let port = port_str.parse::<u16>().map_err(|_| {
				Error::InvalidPort(port_str.to_string())
			})?;
			Ok((host.to_string(), port))
		}
		None => Ok((authority.to_string(), Config::default().port)),
	}
}

/// Options handed to the HTTP/WebSocket transport stack.
#[derive(Debug, Clone)]
pub struct TransportOptions {
	/// Budget for TCP connect, TLS handshake and the HTTP upgrade.
	pub connect_timeout: Duration,
	/// Set `TCP_NODELAY` on the socket.
	pub nodelay: bool,
	/// Skip TLS certificate verification. Testing only.
	pub danger_accept_invalid_certs: bool,
}

impl Default for TransportOptions {
	fn default() -> Self {
		Self {
			connect_timeout: Duration::from_secs(5),
			nodelay: true,
			danger_accept_invalid_certs: false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = Config::default();
		assert_eq!(config.port, 8182);
		assert_eq!(config.path, "/gremlin");
		assert!(!config.secure);
	}

	#[test]
	fn test_from_url_plain() {
		let config = Config::from_url("ws://graph.internal:8183/g").unwrap();
		assert_eq!(config.host, "graph.internal");
		assert_eq!(config.port, 8183);
		assert_eq!(config.path, "/g");
		assert!(!config.secure);
	}

	#[test]
	fn test_from_url_secure_default_port_and_path() {
		let config = Config::from_url("wss://graph.internal").unwrap();
		assert_eq!(config.host, "graph.internal");
		assert_eq!(config.port, 8182);
		assert_eq!(config.path, "/gremlin");
		assert!(config.secure);
	}

	#[test]
	fn test_from_url_ipv6() {
		let config = Config::from_url("ws://[::1]:9000/gremlin").unwrap();
		assert_eq!(config.host, "::1");
		assert_eq!(config.port, 9000);
	}

	#[test]
	fn test_from_url_invalid_port() {
		let err = Config::from_url("ws://host:eight/gremlin").unwrap_err();
		assert_eq!(err, Error::InvalidPort("eight".to_string()));
	}

	#[test]
	fn test_from_url_invalid_scheme() {
		assert!(matches!(
			Config::from_url("http://host:8182"),
			Err(Error::InvalidUrl(_))
		));
	}
}
