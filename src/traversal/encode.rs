// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

//! Compilation of a step sequence into Gremlin-Groovy source.
//!
//! The server evaluates whatever string we send, so rendering has to be
//! precise: strings are single-quoted with unescaped quotes escaped,
//! identifiers and numbers are emitted verbatim, and nested traversals
//! recurse with the accumulator rules below.

use super::{Arg, Source, Traversal};
use crate::{
	domain::ElementId,
	error::{Error, Result},
};

/// Encode a traversal from its own source (`g` or `__`).
pub(super) fn encode(traversal: &Traversal) -> Result<String> {
	match traversal.source {
		Source::Rooted => encode_from(traversal, "g"),
		Source::Anonymous => encode_from(traversal, ""),
	}
}

/// Encode a traversal appearing as an argument of another step.
///
/// A nested traversal whose first step is `V` or `E` keeps the global
/// source (`g.V()...`); anything else starts from an empty accumulator,
/// which yields `__.`-prefixed chains for anonymous traversals and bare
/// calls like `gt(100)` for predicates.
fn encode_nested(traversal: &Traversal) -> Result<String> {
	match traversal.steps.first() {
		Some(step) if matches!(step.op, "V" | "E") => {
			encode_from(traversal, "g")
		}
		_ => encode_from(traversal, ""),
	}
}

fn encode_from(traversal: &Traversal, source: &str) -> Result<String> {
	let mut acc = String::from(source);
	for step in &traversal.steps {
		let args = render_args(&step.args)?;
		if step.op == "__" {
			if acc.is_empty() {
				acc.push_str("__");
			} else {
				return Err(Error::MisplacedAnonymousMarker);
			}
		} else if acc.is_empty() {
			acc = format!("{}({})", step.op, args);
		} else {
			acc = format!("{}.{}({})", acc, step.op, args);
		}
	}
	Ok(acc)
}

fn render_args(args: &[Arg]) -> Result<String> {
	let rendered: Vec<String> =
		args.iter().map(render_arg).collect::<Result<_>>()?;
	Ok(rendered.join(", "))
}

fn render_arg(arg: &Arg) -> Result<String> {
	Ok(match arg {
		Arg::None => "none".to_string(),
		Arg::Bool(value) => value.to_string(),
		Arg::Int(value) => value.to_string(),
		// `{:?}` keeps the decimal point so Groovy sees a float.
		Arg::Double(value) => format!("{:?}", value),
		Arg::Token(token) => (*token).to_string(),
		Arg::Range(low, high) => format!("{}..{}", low, high),
		Arg::String(value) => format!("'{}'", escape(value)),
		Arg::Vertex(vertex) => match &vertex.id {
			ElementId::Int32(id) => format!("V({})", id),
			ElementId::Int64(id) => format!("V({})", id),
			ElementId::String(id) => {
				format!("V('{}')", escape(id))
			}
		},
		Arg::Traversal(nested) => encode_nested(nested)?,
	})
}

/// Escape every single quote that is not already escaped, i.e. not
/// preceded by an odd number of backslashes.
fn escape(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	let mut backslashes = 0usize;
	for c in value.chars() {
		match c {
			'\\' => {
				backslashes += 1;
				out.push(c);
			}
			'\'' => {
				if backslashes % 2 == 0 {
					out.push('\\');
				}
				out.push(c);
				backslashes = 0;
			}
			_ => {
				backslashes = 0;
				out.push(c);
			}
		}
	}
	out
}
