// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

//! Comparison predicates.
//!
//! Predicates are recorded as single-step traversals; nested argument
//! encoding renders them as bare calls (`gt(100)`, `within(1..4)`), which
//! is exactly what steps like `has` expect.

use super::{Arg, IntoArgs, Traversal};

fn predicate(op: &'static str, args: Vec<Arg>) -> Traversal {
	Traversal::root().step(op, args)
}

pub fn eq(value: impl Into<Arg>) -> Traversal {
	predicate("eq", vec![value.into()])
}

pub fn neq(value: impl Into<Arg>) -> Traversal {
	predicate("neq", vec![value.into()])
}

pub fn gt(value: impl Into<Arg>) -> Traversal {
	predicate("gt", vec![value.into()])
}

pub fn gte(value: impl Into<Arg>) -> Traversal {
	predicate("gte", vec![value.into()])
}

pub fn lt(value: impl Into<Arg>) -> Traversal {
	predicate("lt", vec![value.into()])
}

/// Membership test; accepts a list (spread into arguments) or an
/// inclusive integer range.
pub fn within(values: impl IntoArgs) -> Traversal {
	predicate("within", values.into_args())
}

pub fn without(values: impl IntoArgs) -> Traversal {
	predicate("without", values.into_args())
}
