// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

mod display;

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Identifier of a vertex, edge or vertex property.
///
/// Servers hand out numeric or string ids; anything else (composite edge
/// ids and other opaque tokens) is carried as its JSON text.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementId {
	Int32(i32),
	Int64(i64),
	String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
	pub id: ElementId,
	pub label: String,
	/// Property key to its ordered values. Multi-valued because vertex
	/// properties carry `list`/`set` cardinality on the server.
	pub properties: HashMap<String, Vec<Value>>,
}

impl Vertex {
	/// A bare vertex reference (id and label only), as used when a
	/// traversal step needs a vertex argument.
	pub fn reference(id: ElementId, label: impl Into<String>) -> Self {
		Self {
			id,
			label: label.into(),
			properties: HashMap::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
	pub id: ElementId,
	pub label: String,
	/// Head of the edge. Carries id and label only; properties are
	/// empty unless the server inlined them.
	pub in_v: Vertex,
	/// Tail of the edge.
	pub out_v: Vertex,
	pub properties: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VertexProperty {
	pub id: ElementId,
	pub label: String,
	pub value: Box<Value>,
	/// Id of the owning vertex, when the server includes it.
	pub vertex: Option<ElementId>,
	/// Meta-properties, when present.
	pub properties: Option<HashMap<String, Value>>,
}

/// One traversed path: the i-th label set describes the i-th object.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
	pub labels: Vec<Vec<String>>,
	pub objects: Vec<Value>,
}

/// A decoded graph value as returned by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Int32(i32),
	Int64(i64),
	Float(f32),
	Double(f64),
	String(String),
	/// `g:Date` / `g:Timestamp`, microseconds since the Unix epoch.
	Timestamp(DateTime<Utc>),
	List(Vec<Value>),
	/// Unordered on the server; element order here follows the wire.
	Set(Vec<Value>),
	Map(HashMap<String, Value>),
	Vertex(Vertex),
	Edge(Edge),
	VertexProperty(VertexProperty),
	Path(Path),
}

impl Value {
	/// The contained string, if this is a string value.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	/// The contained integer, widening `Int32`.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Int32(v) => Some(i64::from(*v)),
			Value::Int64(v) => Some(*v),
			_ => None,
		}
	}
}
