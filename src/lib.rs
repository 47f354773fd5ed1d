// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

//! Client library for Apache TinkerPop Gremlin servers.
//!
//! Traversals are built as immutable values, compiled to Gremlin-Groovy
//! and submitted over a persistent WebSocket (with permessage-deflate);
//! results come back as decoded GraphSON-v3 graph values.
//!
//! ```no_run
//! use gremlin_ws_client::{predicate, Client, Config, Traversal};
//!
//! let client = Client::connect(Config::new("localhost"));
//! let adults = client.query(
//! 	&Traversal::root()
//! 		.v()
//! 		.has_label("person")
//! 		.has("age", predicate::gte(18))
//! 		.values("name"),
//! )?;
//! # Ok::<(), gremlin_ws_client::Error>(())
//! ```

mod client;
mod config;
mod domain;
mod error;
pub mod graphson;
mod pool;
pub mod traversal;
pub mod ws;

pub use client::{Client, DEFAULT_TIMEOUT};
pub use config::{Config, TransportOptions};
pub use domain::{Edge, ElementId, Path, Value, Vertex, VertexProperty};
pub use error::{Error, Result};
pub use traversal::{
	predicate, Arg, Cardinality, IntoArgs, Order, Traversal,
	DEFAULT_NAMESPACE, NAMESPACE_PROPERTY,
};
pub use ws::{
	Request, RequestArgs, ResponseFrame, ResponseResult, ResponseStatus,
};
