// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	error::{Error, Result},
	traversal::Traversal,
};

/// The request envelope the server recognizes.
///
/// Exactly one text frame per request:
/// `{"requestId":"<uuid>","op":"eval","processor":"","args":{...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
	#[serde(rename = "requestId")]
	pub request_id: String,
	pub op: String,
	pub processor: String,
	pub args: RequestArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArgs {
	pub gremlin: String,
	pub language: String,
}

impl Request {
	/// Wrap a raw Gremlin-Groovy string with a fresh correlation id.
	pub fn eval(gremlin: impl Into<String>) -> Self {
		Self {
			request_id: Uuid::new_v4().to_string(),
			op: "eval".to_string(),
			processor: String::new(),
			args: RequestArgs {
				gremlin: gremlin.into(),
				language: "gremlin-groovy".to_string(),
			},
		}
	}

	/// Encode a rooted traversal and wrap it. Anonymous traversals are
	/// only valid nested inside another traversal.
	pub fn traversal(traversal: &Traversal) -> Result<Self> {
		if traversal.is_anonymous() {
			return Err(Error::TopLevelAnonymous);
		}
		Ok(Self::eval(traversal.encode()?))
	}

	pub fn to_json(&self) -> Result<String> {
		serde_json::to_string(self)
			.map_err(|e| Error::Deserialization(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_envelope_shape() {
		let request = Request::eval("g.V().count()");
		let json = request.to_json().unwrap();
		let expected = format!(
			"{{\"requestId\":\"{}\",\"op\":\"eval\",\"processor\":\"\",\"args\":{{\"gremlin\":\"g.V().count()\",\"language\":\"gremlin-groovy\"}}}}",
			request.request_id
		);
		assert_eq!(json, expected);
	}

	#[test]
	fn test_fresh_uuid_per_request() {
		let a = Request::eval("g.V()");
		let b = Request::eval("g.V()");
		assert_ne!(a.request_id, b.request_id);
		assert!(Uuid::parse_str(&a.request_id).is_ok());
	}

	#[test]
	fn test_traversal_request() {
		let t = Traversal::root().v().count();
		let request = Request::traversal(&t).unwrap();
		assert_eq!(request.args.gremlin, "g.V().count()");
		assert_eq!(request.args.language, "gremlin-groovy");
		assert_eq!(request.op, "eval");
		assert_eq!(request.processor, "");
	}

	#[test]
	fn test_anonymous_traversal_rejected() {
		let t = Traversal::anonymous().unfold().count();
		assert_eq!(
			Request::traversal(&t),
			Err(Error::TopLevelAnonymous)
		);
	}
}
