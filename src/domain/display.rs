// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

use std::fmt;

use super::{Edge, ElementId, Path, Value, Vertex};

impl fmt::Display for ElementId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ElementId::Int32(v) => write!(f, "{}", v),
			ElementId::Int64(v) => write!(f, "{}", v),
			ElementId::String(v) => write!(f, "{}", v),
		}
	}
}

impl fmt::Display for Vertex {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "v[{}:{}]", self.label, self.id)
	}
}

impl fmt::Display for Edge {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"e[{}:{}][{}->{}]",
			self.label, self.id, self.out_v.id, self.in_v.id
		)
	}
}

impl fmt::Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "path[")?;
		for (i, object) in self.objects.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{}", object)?;
		}
		write!(f, "]")
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => write!(f, "null"),
			Value::Bool(v) => write!(f, "{}", v),
			Value::Int32(v) => write!(f, "{}", v),
			Value::Int64(v) => write!(f, "{}", v),
			Value::Float(v) => write!(f, "{}", v),
			Value::Double(v) => write!(f, "{}", v),
			Value::String(v) => write!(f, "{}", v),
			Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
			Value::List(items) | Value::Set(items) => {
				write!(f, "[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{}", item)?;
				}
				write!(f, "]")
			}
			Value::Map(entries) => {
				let mut keys: Vec<&String> =
					entries.keys().collect();
				keys.sort();
				write!(f, "{{")?;
				for (i, key) in keys.into_iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{}: {}", key, entries[key])?;
				}
				write!(f, "}}")
			}
			Value::Vertex(v) => write!(f, "{}", v),
			Value::Edge(e) => write!(f, "{}", e),
			Value::VertexProperty(vp) => {
				write!(f, "vp[{}->{}]", vp.label, vp.value)
			}
			Value::Path(p) => write!(f, "{}", p),
		}
	}
}
