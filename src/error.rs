// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a caller can observe from this crate.
///
/// Server-side statuses are mapped one-to-one from the Gremlin response
/// protocol; the remaining variants cover transport failures, pool
/// exhaustion and programmer errors caught before submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("no usable websocket connection")]
	ConnectionUnavailable,

	#[error("unauthorized: {0}")]
	Unauthorized(String),

	#[error("malformed request: {0}")]
	MalformedRequest(String),

	#[error("invalid request arguments: {0}")]
	InvalidRequestArguments(String),

	#[error("server error: {0}")]
	ServerError(String),

	#[error("script evaluation error: {0}")]
	ScriptEvaluationError(String),

	#[error("server timeout: {0}")]
	ServerTimeout(String),

	#[error("server serialization error: {0}")]
	ServerSerializationError(String),

	#[error("transport error: {0}")]
	Transport(String),

	#[error("query did not complete within the caller timeout")]
	Timeout,

	#[error("no worker became available within the checkout timeout")]
	PoolTimeout,

	#[error("anonymous traversal submitted at top level")]
	TopLevelAnonymous,

	#[error("anonymous marker `__` after the start of a traversal")]
	MisplacedAnonymousMarker,

	#[error("invalid port: {0}")]
	InvalidPort(String),

	#[error("invalid connection url: {0}")]
	InvalidUrl(String),

	#[error("websocket handshake failed: {0}")]
	Handshake(String),

	#[error("response deserialization failed: {0}")]
	Deserialization(String),
}

impl Error {
	/// Map a terminal server status code to its error variant.
	///
	/// Codes 200/204/206 are not errors and must be handled before
	/// calling this; anything unrecognized is reported as a server
	/// error carrying the raw code.
	pub(crate) fn from_status(code: u16, message: String) -> Self {
		match code {
			401 => Error::Unauthorized(message),
			409 => Error::MalformedRequest(message),
			499 => Error::InvalidRequestArguments(message),
			500 => Error::ServerError(message),
			597 => Error::ScriptEvaluationError(message),
			598 => Error::ServerTimeout(message),
			599 => Error::ServerSerializationError(message),
			other => Error::ServerError(format!(
				"unexpected status code {}: {}",
				other, message
			)),
		}
	}

	/// Transport errors invalidate the websocket; everything else
	/// leaves the connection usable.
	pub(crate) fn is_transport(&self) -> bool {
		matches!(self, Error::Transport(_))
	}
}
