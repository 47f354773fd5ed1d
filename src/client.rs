// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

use std::time::Duration;

use crate::{
	config::Config,
	domain::Value,
	error::Result,
	pool::Pool,
	traversal::Traversal,
	ws::request::Request,
};

/// Default budget for one query, pool checkout included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A pooled Gremlin client.
///
/// `connect` spawns the configured number of connection workers; each
/// query checks one out, runs synchronously on it, and returns it. A
/// failed query is not retried; the caller decides.
pub struct Client {
	pool: Pool,
}

impl Client {
	pub fn connect(config: Config) -> Self {
		Self {
			pool: Pool::new(config),
		}
	}

	/// Run a traversal and return the decoded result values.
	pub fn query(&self, traversal: &Traversal) -> Result<Vec<Value>> {
		self.query_with_timeout(traversal, DEFAULT_TIMEOUT)
	}

	pub fn query_with_timeout(
		&self,
		traversal: &Traversal,
		timeout: Duration,
	) -> Result<Vec<Value>> {
		self.submit(Request::traversal(traversal)?, timeout)
	}

	/// Run a raw Gremlin-Groovy string.
	pub fn query_raw(&self, gremlin: &str) -> Result<Vec<Value>> {
		self.query_raw_with_timeout(gremlin, DEFAULT_TIMEOUT)
	}

	pub fn query_raw_with_timeout(
		&self,
		gremlin: &str,
		timeout: Duration,
	) -> Result<Vec<Value>> {
		self.submit(Request::eval(gremlin), timeout)
	}

	fn submit(
		&self,
		request: Request,
		timeout: Duration,
	) -> Result<Vec<Value>> {
		let worker = self.pool.checkout(timeout)?;
		let result = worker.query(request, timeout);
		self.pool.checkin(worker);
		result
	}

	/// Shut down the worker pool, sending close frames best-effort.
	pub fn close(self) {
		self.pool.close();
	}
}
