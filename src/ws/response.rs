// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

//! Response frames and the state machine that reassembles one logical
//! response from them.
//!
//! A single Gremlin response arrives as one or more text frames: any
//! number of 206 continuations followed by a 200 (results) or 204 (no
//! content) terminator. Control frames and frames for other request ids
//! can interleave anywhere; neither changes the assembled result.

use serde::Deserialize;
use serde_json::Value as Json;
use tracing::warn;

use crate::{
	domain::Value,
	error::{Error, Result},
	graphson,
};

/// One decoded text frame of a server response.
#[derive(Debug, Deserialize)]
pub struct ResponseFrame {
	#[serde(rename = "requestId", default)]
	pub request_id: String,
	#[serde(default)]
	pub status: ResponseStatus,
	#[serde(default)]
	pub result: ResponseResult,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponseStatus {
	#[serde(default)]
	pub code: u16,
	#[serde(default)]
	pub message: Option<String>,
	/// Some server versions report the message under this key instead.
	#[serde(default)]
	pub error_message: Option<String>,
	#[serde(default)]
	pub attributes: Option<Json>,
}

impl ResponseStatus {
	fn message(&self) -> Option<&str> {
		match self.error_message.as_deref() {
			Some(m) if !m.is_empty() => Some(m),
			_ => self
				.message
				.as_deref()
				.filter(|m| !m.is_empty()),
		}
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponseResult {
	#[serde(default)]
	pub data: Option<Json>,
	#[serde(default)]
	pub meta: Option<Json>,
}

/// What one batch of text frames decided.
#[derive(Debug, PartialEq)]
pub(crate) enum BatchOutcome {
	/// More frames are expected for this request; keep draining.
	Continue,
	/// Terminal status reached; the full result list is attached.
	Done(Vec<Value>),
}

/// Error status codes in selection priority order.
const ERROR_CODES: [u16; 7] = [401, 409, 499, 500, 597, 598, 599];

/// Accumulates one logical response across drain iterations.
pub(crate) struct Assembler {
	request_id: String,
	accumulated: Vec<Value>,
}

impl Assembler {
	pub fn new(request_id: impl Into<String>) -> Self {
		Self {
			request_id: request_id.into(),
			accumulated: Vec::new(),
		}
	}

	/// Process the text frames of one batch.
	///
	/// Frames that fail to parse or carry a foreign request id are
	/// logged and discarded. The terminal outcome is decided by the
	/// highest-priority status present: 200 (success, with everything
	/// accumulated so far), then 204 (empty result, overriding any
	/// accumulation), then 206 (keep draining), then the first error
	/// code in protocol order.
	pub fn ingest(&mut self, texts: &[String]) -> Result<BatchOutcome> {
		let mut matching = Vec::new();
		for text in texts {
			let frame = match serde_json::from_str::<ResponseFrame>(
				text,
			) {
				Ok(frame) => frame,
				Err(e) => {
					warn!(error = %e, "discarding undecodable response frame");
					continue;
				}
			};
			if frame.request_id != self.request_id {
				warn!(
					expected = %self.request_id,
					received = %frame.request_id,
					"discarding frame for unexpected request id"
				);
				continue;
			}
			matching.push(frame);
		}

		if matching.is_empty() {
			return Ok(BatchOutcome::Continue);
		}

		let mut batch_values = Vec::new();
		for frame in &matching {
			batch_values.extend(graphson::decode_data(
				frame.result.data.as_ref(),
			)?);
		}
		let codes: Vec<u16> =
			matching.iter().map(|f| f.status.code).collect();

		if codes.contains(&200) {
			self.accumulated.append(&mut batch_values);
			return Ok(BatchOutcome::Done(std::mem::take(
				&mut self.accumulated,
			)));
		}
		if codes.contains(&204) {
			return Ok(BatchOutcome::Done(Vec::new()));
		}
		if codes.contains(&206) {
			self.accumulated.append(&mut batch_values);
			return Ok(BatchOutcome::Continue);
		}

		let message = matching
			.iter()
			.filter_map(|f| f.status.message())
			.collect::<Vec<_>>()
			.join(", ");
		for code in ERROR_CODES {
			if codes.contains(&code) {
				return Err(Error::from_status(code, message));
			}
		}
		Err(Error::from_status(codes[0], message))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn frame(request_id: &str, code: u16, data: Json) -> String {
		serde_json::json!({
			"requestId": request_id,
			"status": {"code": code, "message": "", "attributes": {}},
			"result": {"data": data, "meta": {}}
		})
		.to_string()
	}

	#[test]
	fn test_single_200_batch() {
		let mut assembler = Assembler::new("R");
		let text = frame(
			"R",
			200,
			serde_json::json!({"@type": "g:List", "@value": ["0"]}),
		);
		let outcome = assembler.ingest(&[text]).unwrap();
		assert_eq!(
			outcome,
			BatchOutcome::Done(vec![Value::String(
				"0".to_string()
			)])
		);
	}

	#[test]
	fn test_204_discards_accumulation() {
		let mut assembler = Assembler::new("R");
		let first = frame(
			"R",
			206,
			serde_json::json!({"@type": "g:List", "@value": ["a"]}),
		);
		assert_eq!(
			assembler.ingest(&[first]).unwrap(),
			BatchOutcome::Continue
		);

		let second = frame("R", 204, Json::Null);
		assert_eq!(
			assembler.ingest(&[second]).unwrap(),
			BatchOutcome::Done(Vec::new())
		);
	}

	#[test]
	fn test_206_then_200_in_one_batch() {
		let mut assembler = Assembler::new("R");
		let batch = vec![
			frame(
				"R",
				206,
				serde_json::json!({"@type": "g:List", "@value": ["a"]}),
			),
			frame(
				"R",
				200,
				serde_json::json!({"@type": "g:List", "@value": ["b"]}),
			),
		];
		assert_eq!(
			assembler.ingest(&batch).unwrap(),
			BatchOutcome::Done(vec![
				Value::String("a".to_string()),
				Value::String("b".to_string()),
			])
		);
	}

	#[test]
	fn test_foreign_request_id_ignored() {
		let mut assembler = Assembler::new("R");
		let stale = frame(
			"STALE",
			200,
			serde_json::json!({"@type": "g:List", "@value": ["x"]}),
		);
		assert_eq!(
			assembler.ingest(&[stale]).unwrap(),
			BatchOutcome::Continue
		);
	}

	#[test]
	fn test_undecodable_frame_ignored() {
		let mut assembler = Assembler::new("R");
		assert_eq!(
			assembler
				.ingest(&["{not json".to_string()])
				.unwrap(),
			BatchOutcome::Continue
		);
	}

	#[test]
	fn test_error_status_mapping() {
		for (code, check) in [
			(401u16, Error::Unauthorized("denied".to_string())),
			(409, Error::MalformedRequest("denied".to_string())),
			(499, Error::InvalidRequestArguments("denied".to_string())),
			(500, Error::ServerError("denied".to_string())),
			(597, Error::ScriptEvaluationError("denied".to_string())),
			(598, Error::ServerTimeout("denied".to_string())),
			(599, Error::ServerSerializationError("denied".to_string())),
		] {
			let mut assembler = Assembler::new("R");
			let text = serde_json::json!({
				"requestId": "R",
				"status": {"code": code, "message": "denied"},
				"result": {"data": null}
			})
			.to_string();
			assert_eq!(assembler.ingest(&[text]), Err(check));
		}
	}

	#[test]
	fn test_error_message_key_preferred() {
		let mut assembler = Assembler::new("R");
		let text = serde_json::json!({
			"requestId": "R",
			"status": {
				"code": 597,
				"message": "",
				"error_message": "groovy blew up"
			},
			"result": {"data": null}
		})
		.to_string();
		assert_eq!(
			assembler.ingest(&[text]),
			Err(Error::ScriptEvaluationError(
				"groovy blew up".to_string()
			))
		);
	}

	#[test]
	fn test_error_messages_comma_joined() {
		let mut assembler = Assembler::new("R");
		let batch = vec![
			serde_json::json!({
				"requestId": "R",
				"status": {"code": 500, "message": "first"},
				"result": {"data": null}
			})
			.to_string(),
			serde_json::json!({
				"requestId": "R",
				"status": {"code": 500, "message": "second"},
				"result": {"data": null}
			})
			.to_string(),
		];
		assert_eq!(
			assembler.ingest(&batch),
			Err(Error::ServerError("first, second".to_string()))
		);
	}
}
