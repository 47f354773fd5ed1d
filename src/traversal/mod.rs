// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

//! Deferred Gremlin traversals.
//!
//! A traversal is an ordered, append-only sequence of steps. Building one
//! performs no I/O; the [`crate::Client`] encodes it to Gremlin-Groovy at
//! submission time. Builder methods never mutate their receiver, so
//! traversal values compose freely and share prefixes safely across
//! threads.

mod encode;
pub mod predicate;
mod step;

pub use step::{Arg, Cardinality, IntoArgs, Order, Step};

use crate::error::Result;

/// Property key used by the namespace convenience steps.
pub const NAMESPACE_PROPERTY: &str = "namespace";

/// Namespace applied when the caller passes `None`.
pub const DEFAULT_NAMESPACE: &str = "gremlin_ws_client";

/// Which source a traversal's emitted Groovy begins with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
	/// Emits from the global traversal source `g`.
	Rooted,
	/// Emits from `__`; only valid nested inside another traversal.
	Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
	pub(crate) source: Source,
	pub(crate) steps: Vec<Step>,
}

impl Traversal {
	/// An empty rooted traversal; its source string begins with `g`.
	pub fn root() -> Self {
		Self {
			source: Source::Rooted,
			steps: Vec::new(),
		}
	}

	/// An anonymous traversal; its source string begins with `__`.
	///
	/// Anonymous traversals may only appear as arguments inside another
	/// traversal. Submitting one at top level fails with
	/// [`crate::Error::TopLevelAnonymous`].
	pub fn anonymous() -> Self {
		Self {
			source: Source::Anonymous,
			steps: vec![Step::new("__", Vec::new())],
		}
	}

	pub fn is_anonymous(&self) -> bool {
		self.source == Source::Anonymous
	}

	/// Append one step, returning a new traversal. The receiver is left
	/// untouched.
	pub fn step(&self, op: &'static str, args: Vec<Arg>) -> Self {
		let mut steps = self.steps.clone();
		steps.push(Step::new(op, args));
		Self {
			source: self.source,
			steps,
		}
	}

	/// Compile to Gremlin-Groovy source.
	pub fn encode(&self) -> Result<String> {
		encode::encode(self)
	}

	// === Vertex and edge selection ===

	pub fn v(&self) -> Self {
		self.step("V", Vec::new())
	}

	pub fn e(&self) -> Self {
		self.step("E", Vec::new())
	}

	// === Creation ===

	pub fn add_v(&self, label: impl Into<Arg>) -> Self {
		self.step("addV", vec![label.into()])
	}

	pub fn add_e(&self, label: impl Into<Arg>) -> Self {
		self.step("addE", vec![label.into()])
	}

	// === Property mutation ===

	pub fn property(
		&self,
		key: impl Into<Arg>,
		value: impl Into<Arg>,
	) -> Self {
		self.step("property", vec![key.into(), value.into()])
	}

	/// `property(single, 'k', v)` and friends.
	pub fn property_with_cardinality(
		&self,
		cardinality: Cardinality,
		key: impl Into<Arg>,
		value: impl Into<Arg>,
	) -> Self {
		self.step(
			"property",
			vec![cardinality.into(), key.into(), value.into()],
		)
	}

	/// `property('namespace', ns)` with the configured default.
	pub fn add_namespace(&self, namespace: Option<&str>) -> Self {
		self.property(
			NAMESPACE_PROPERTY,
			namespace.unwrap_or(DEFAULT_NAMESPACE),
		)
	}

	// === Filters ===

	pub fn has(&self, key: impl Into<Arg>, value: impl Into<Arg>) -> Self {
		self.step("has", vec![key.into(), value.into()])
	}

	pub fn has_label(&self, label: impl Into<Arg>) -> Self {
		self.step("hasLabel", vec![label.into()])
	}

	pub fn has_id(&self, id: impl Into<Arg>) -> Self {
		self.step("hasId", vec![id.into()])
	}

	pub fn has_key(&self, key: impl Into<Arg>) -> Self {
		self.step("hasKey", vec![key.into()])
	}

	pub fn has_not(&self, key: impl Into<Arg>) -> Self {
		self.step("hasNot", vec![key.into()])
	}

	/// `has('namespace', ns)` with the configured default.
	pub fn has_namespace(&self, namespace: Option<&str>) -> Self {
		self.has(
			NAMESPACE_PROPERTY,
			namespace.unwrap_or(DEFAULT_NAMESPACE),
		)
	}

	pub fn where_(&self, condition: impl Into<Arg>) -> Self {
		self.step("where", vec![condition.into()])
	}

	pub fn is(&self, value: impl Into<Arg>) -> Self {
		self.step("is", vec![value.into()])
	}

	pub fn not(&self, condition: impl Into<Arg>) -> Self {
		self.step("not", vec![condition.into()])
	}

	// === Traversal steps ===

	pub fn out(&self, labels: impl IntoArgs) -> Self {
		self.step("out", labels.into_args())
	}

	pub fn in_(&self, labels: impl IntoArgs) -> Self {
		self.step("in", labels.into_args())
	}

	pub fn both(&self, labels: impl IntoArgs) -> Self {
		self.step("both", labels.into_args())
	}

	pub fn out_e(&self, labels: impl IntoArgs) -> Self {
		self.step("outE", labels.into_args())
	}

	pub fn in_e(&self, labels: impl IntoArgs) -> Self {
		self.step("inE", labels.into_args())
	}

	pub fn both_e(&self, labels: impl IntoArgs) -> Self {
		self.step("bothE", labels.into_args())
	}

	pub fn out_v(&self) -> Self {
		self.step("outV", Vec::new())
	}

	pub fn in_v(&self) -> Self {
		self.step("inV", Vec::new())
	}

	pub fn both_v(&self) -> Self {
		self.step("bothV", Vec::new())
	}

	pub fn other_v(&self) -> Self {
		self.step("otherV", Vec::new())
	}

	pub fn to(&self, target: impl Into<Arg>) -> Self {
		self.step("to", vec![target.into()])
	}

	pub fn from(&self, target: impl Into<Arg>) -> Self {
		self.step("from", vec![target.into()])
	}

	// === Composition ===

	pub fn and(&self, conditions: impl IntoArgs) -> Self {
		self.step("and", conditions.into_args())
	}

	pub fn or(&self, conditions: impl IntoArgs) -> Self {
		self.step("or", conditions.into_args())
	}

	pub fn coalesce(&self, branches: impl IntoArgs) -> Self {
		self.step("coalesce", branches.into_args())
	}

	pub fn union(&self, branches: impl IntoArgs) -> Self {
		self.step("union", branches.into_args())
	}

	pub fn choose(&self, branches: impl IntoArgs) -> Self {
		self.step("choose", branches.into_args())
	}

	// === Reshaping ===

	pub fn fold(&self) -> Self {
		self.step("fold", Vec::new())
	}

	pub fn unfold(&self) -> Self {
		self.step("unfold", Vec::new())
	}

	pub fn project(&self, keys: impl IntoArgs) -> Self {
		self.step("project", keys.into_args())
	}

	pub fn by(&self, modulator: impl IntoArgs) -> Self {
		self.step("by", modulator.into_args())
	}

	pub fn select(&self, keys: impl IntoArgs) -> Self {
		self.step("select", keys.into_args())
	}

	pub fn as_(&self, label: impl Into<Arg>) -> Self {
		self.step("as", vec![label.into()])
	}

	pub fn group(&self) -> Self {
		self.step("group", Vec::new())
	}

	pub fn group_count(&self) -> Self {
		self.step("groupCount", Vec::new())
	}

	pub fn aggregate(&self, key: impl Into<Arg>) -> Self {
		self.step("aggregate", vec![key.into()])
	}

	pub fn store(&self, key: impl Into<Arg>) -> Self {
		self.step("store", vec![key.into()])
	}

	pub fn cap(&self, key: impl Into<Arg>) -> Self {
		self.step("cap", vec![key.into()])
	}

	// === Paging ===

	pub fn limit(&self, count: i64) -> Self {
		self.step("limit", vec![count.into()])
	}

	pub fn range(&self, low: i64, high: i64) -> Self {
		self.step("range", vec![low.into(), high.into()])
	}

	pub fn tail(&self, count: i64) -> Self {
		self.step("tail", vec![count.into()])
	}

	pub fn dedup(&self) -> Self {
		self.step("dedup", Vec::new())
	}

	// === Flow ===

	pub fn repeat(&self, body: impl Into<Arg>) -> Self {
		self.step("repeat", vec![body.into()])
	}

	pub fn until(&self, condition: impl Into<Arg>) -> Self {
		self.step("until", vec![condition.into()])
	}

	pub fn emit(&self) -> Self {
		self.step("emit", Vec::new())
	}

	pub fn times(&self, count: i64) -> Self {
		self.step("times", vec![count.into()])
	}

	pub fn loops(&self) -> Self {
		self.step("loops", Vec::new())
	}

	pub fn side_effect(&self, effect: impl Into<Arg>) -> Self {
		self.step("sideEffect", vec![effect.into()])
	}

	pub fn local(&self, body: impl Into<Arg>) -> Self {
		self.step("local", vec![body.into()])
	}

	pub fn barrier(&self) -> Self {
		self.step("barrier", Vec::new())
	}

	// === Terminals ===

	pub fn to_list(&self) -> Self {
		self.step("toList", Vec::new())
	}

	pub fn to_set(&self) -> Self {
		self.step("toSet", Vec::new())
	}

	pub fn to_bulk_set(&self) -> Self {
		self.step("toBulkSet", Vec::new())
	}

	pub fn next(&self) -> Self {
		self.step("next", Vec::new())
	}

	pub fn has_next(&self) -> Self {
		self.step("hasNext", Vec::new())
	}

	pub fn drop(&self) -> Self {
		self.step("drop", Vec::new())
	}

	pub fn iterate(&self) -> Self {
		self.step("iterate", Vec::new())
	}

	pub fn count(&self) -> Self {
		self.step("count", Vec::new())
	}

	pub fn sum(&self) -> Self {
		self.step("sum", Vec::new())
	}

	pub fn min(&self) -> Self {
		self.step("min", Vec::new())
	}

	pub fn max(&self) -> Self {
		self.step("max", Vec::new())
	}

	pub fn label(&self) -> Self {
		self.step("label", Vec::new())
	}

	pub fn id(&self) -> Self {
		self.step("id", Vec::new())
	}

	pub fn key(&self) -> Self {
		self.step("key", Vec::new())
	}

	pub fn values(&self, keys: impl IntoArgs) -> Self {
		self.step("values", keys.into_args())
	}

	pub fn value_map(&self, keys: impl IntoArgs) -> Self {
		self.step("valueMap", keys.into_args())
	}

	pub fn element_map(&self, keys: impl IntoArgs) -> Self {
		self.step("elementMap", keys.into_args())
	}

	pub fn path(&self) -> Self {
		self.step("path", Vec::new())
	}

	pub fn simple_path(&self) -> Self {
		self.step("simplePath", Vec::new())
	}

	pub fn cyclic_path(&self) -> Self {
		self.step("cyclicPath", Vec::new())
	}

	pub fn datetime(&self, value: impl Into<Arg>) -> Self {
		self.step("datetime", vec![value.into()])
	}

	pub fn constant(&self, value: impl Into<Arg>) -> Self {
		self.step("constant", vec![value.into()])
	}

	pub fn identity(&self) -> Self {
		self.step("identity", Vec::new())
	}

	pub fn order(&self) -> Self {
		self.step("order", Vec::new())
	}
}
