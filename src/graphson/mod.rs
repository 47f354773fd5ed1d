// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

//! GraphSON-v3 decoding.
//!
//! Typed values arrive as `{"@type": T, "@value": V}` wrappers; plain JSON
//! strings, numbers, booleans and nulls stand for themselves. The decoder
//! is a dispatcher on the type tag; unknown tags fall through to a
//! structural decode of `V`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value as Json;

use crate::{
	domain::{Edge, ElementId, Path, Value, Vertex, VertexProperty},
	error::{Error, Result},
};

/// Decode one GraphSON value.
pub fn decode(json: &Json) -> Result<Value> {
	match json {
		Json::Null => Ok(Value::Null),
		Json::Bool(b) => Ok(Value::Bool(*b)),
		Json::Number(n) => decode_number(n),
		Json::String(s) => Ok(Value::String(s.clone())),
		Json::Array(items) => Ok(Value::List(
			items.iter().map(decode).collect::<Result<_>>()?,
		)),
		Json::Object(obj) => {
			match obj.get("@type").and_then(Json::as_str) {
				Some(tag) => decode_typed(
					tag,
					obj.get("@value").unwrap_or(&Json::Null),
				),
				None => decode_plain_map(obj),
			}
		}
	}
}

/// Decode a response's `result.data` into a list of values.
///
/// `null` means an empty result (the 204 case); a `g:List` contributes its
/// elements; any other value stands alone.
pub fn decode_data(data: Option<&Json>) -> Result<Vec<Value>> {
	let data = match data {
		None | Some(Json::Null) => return Ok(Vec::new()),
		Some(data) => data,
	};
	match decode(data)? {
		Value::List(items) => Ok(items),
		other => Ok(vec![other]),
	}
}

fn decode_typed(tag: &str, value: &Json) -> Result<Value> {
	match tag {
		"g:Int32" => Ok(Value::Int32(expect_i64(tag, value)? as i32)),
		"g:Int64" => Ok(Value::Int64(expect_i64(tag, value)?)),
		"g:Double" => Ok(Value::Double(expect_f64(tag, value)?)),
		"g:Float" => Ok(Value::Float(expect_f64(tag, value)? as f32)),
		"g:UUID" => Ok(Value::String(
			expect_str(tag, value)?.to_string(),
		)),
		"g:Date" | "g:Timestamp" => {
			decode_timestamp(tag, value).map(Value::Timestamp)
		}
		"g:List" => Ok(Value::List(
			expect_array(tag, value)?
				.iter()
				.map(decode)
				.collect::<Result<_>>()?,
		)),
		"g:Set" => Ok(Value::Set(
			expect_array(tag, value)?
				.iter()
				.map(decode)
				.collect::<Result<_>>()?,
		)),
		"g:Map" => decode_map(value),
		"g:Vertex" => decode_vertex(value).map(Value::Vertex),
		"g:Edge" => decode_edge(value).map(Value::Edge),
		"g:VertexProperty" => decode_vertex_property(value)
			.map(Value::VertexProperty),
		"g:Path" => decode_path(value).map(Value::Path),
		// Unknown tag: pass the inner value through unchanged.
		_ => decode(value),
	}
}

fn decode_number(n: &serde_json::Number) -> Result<Value> {
	if let Some(i) = n.as_i64() {
		return Ok(Value::Int64(i));
	}
	if let Some(f) = n.as_f64() {
		return Ok(Value::Double(f));
	}
	Err(Error::Deserialization(format!("unrepresentable number {}", n)))
}

/// Dates and timestamps are microseconds since the Unix epoch.
fn decode_timestamp(tag: &str, value: &Json) -> Result<DateTime<Utc>> {
	let micros = expect_i64(tag, value)?;
	DateTime::from_timestamp_micros(micros).ok_or_else(|| {
		Error::Deserialization(format!(
			"{} out of range: {}",
			tag, micros
		))
	})
}

/// `g:Map` is a flat array of alternating keys and values. A key may
/// itself be typed (`{"@type":"g:T","@value":k}`); the inner value is the
/// real key.
fn decode_map(value: &Json) -> Result<Value> {
	let items = expect_array("g:Map", value)?;
	if items.len() % 2 != 0 {
		return Err(Error::Deserialization(format!(
			"g:Map with odd entry count {}",
			items.len()
		)));
	}
	let mut entries = HashMap::with_capacity(items.len() / 2);
	for pair in items.chunks(2) {
		entries.insert(decode_map_key(&pair[0])?, decode(&pair[1])?);
	}
	Ok(Value::Map(entries))
}

fn decode_map_key(key: &Json) -> Result<String> {
	let inner = match key {
		Json::Object(obj) if obj.contains_key("@value") => {
			&obj["@value"]
		}
		other => other,
	};
	Ok(match inner {
		Json::String(s) => s.clone(),
		Json::Number(n) => n.to_string(),
		Json::Bool(b) => b.to_string(),
		other => other.to_string(),
	})
}

fn decode_id(value: &Json) -> Result<ElementId> {
	Ok(match decode(value)? {
		Value::Int32(v) => ElementId::Int32(v),
		Value::Int64(v) => ElementId::Int64(v),
		Value::String(v) => ElementId::String(v),
		// Composite edge ids and other opaque tokens keep their
		// JSON text.
		_ => ElementId::String(value.to_string()),
	})
}

fn decode_vertex(value: &Json) -> Result<Vertex> {
	let id = decode_id(field(value, "id", "g:Vertex")?)?;
	let label = value
		.get("label")
		.and_then(Json::as_str)
		.unwrap_or("vertex")
		.to_string();
	let properties = match value.get("properties") {
		Some(Json::Object(props)) => decode_vertex_properties(props)?,
		_ => HashMap::new(),
	};
	Ok(Vertex {
		id,
		label,
		properties,
	})
}

/// A vertex's `properties` maps each key to a list of property objects;
/// each object's `@value.value` holds the actual (possibly typed) value.
fn decode_vertex_properties(
	props: &serde_json::Map<String, Json>,
) -> Result<HashMap<String, Vec<Value>>> {
	let mut out = HashMap::with_capacity(props.len());
	for (key, entries) in props {
		let entries = entries.as_array().ok_or_else(|| {
			Error::Deserialization(format!(
				"vertex property {} is not a list",
				key
			))
		})?;
		let mut values = Vec::with_capacity(entries.len());
		for entry in entries {
			values.push(decode(property_value(entry))?);
		}
		out.insert(key.clone(), values);
	}
	Ok(out)
}

/// Extract the nested value of a property object, tolerating both the
/// wrapped (`{"@value": {"value": ...}}`) and flat (`{"value": ...}`)
/// shapes servers emit.
fn property_value(entry: &Json) -> &Json {
	entry.get("@value")
		.and_then(|inner| inner.get("value"))
		.or_else(|| entry.get("value"))
		.unwrap_or(entry)
}

fn decode_edge(value: &Json) -> Result<Edge> {
	let id = decode_id(field(value, "id", "g:Edge")?)?;
	let label = value
		.get("label")
		.and_then(Json::as_str)
		.unwrap_or("edge")
		.to_string();
	let in_v = Vertex::reference(
		decode_id(field(value, "inV", "g:Edge")?)?,
		value.get("inVLabel").and_then(Json::as_str).unwrap_or(""),
	);
	let out_v = Vertex::reference(
		decode_id(field(value, "outV", "g:Edge")?)?,
		value.get("outVLabel").and_then(Json::as_str).unwrap_or(""),
	);
	let mut properties = HashMap::new();
	if let Some(Json::Object(props)) = value.get("properties") {
		for (key, entry) in props {
			properties.insert(
				key.clone(),
				decode(property_value(entry))?,
			);
		}
	}
	Ok(Edge {
		id,
		label,
		in_v,
		out_v,
		properties,
	})
}

fn decode_vertex_property(value: &Json) -> Result<VertexProperty> {
	let id = decode_id(field(value, "id", "g:VertexProperty")?)?;
	let label = value
		.get("label")
		.and_then(Json::as_str)
		.unwrap_or("")
		.to_string();
	let inner = decode(field(value, "value", "g:VertexProperty")?)?;
	let vertex = match value.get("vertex") {
		Some(v) if !v.is_null() => Some(decode_id(v)?),
		_ => None,
	};
	let properties = match value.get("properties") {
		Some(Json::Object(props)) => {
			let mut out = HashMap::with_capacity(props.len());
			for (key, entry) in props {
				out.insert(
					key.clone(),
					decode(property_value(entry))?,
				);
			}
			Some(out)
		}
		_ => None,
	};
	Ok(VertexProperty {
		id,
		label,
		value: Box::new(inner),
		vertex,
		properties,
	})
}

fn decode_path(value: &Json) -> Result<Path> {
	let labels = match decode(field(value, "labels", "g:Path")?)? {
		Value::List(sets) | Value::Set(sets) => sets
			.into_iter()
			.map(|set| match set {
				Value::List(items) | Value::Set(items) => items
					.into_iter()
					.map(|item| match item {
						Value::String(s) => Ok(s),
						other => Err(Error::Deserialization(format!(
							"path label is not a string: {:?}",
							other
						))),
					})
					.collect::<Result<Vec<_>>>(),
				other => Err(Error::Deserialization(format!(
					"path labels entry is not a set: {:?}",
					other
				))),
			})
			.collect::<Result<Vec<_>>>()?,
		other => {
			return Err(Error::Deserialization(format!(
				"path labels are not a list: {:?}",
				other
			)))
		}
	};
	let objects = match decode(field(value, "objects", "g:Path")?)? {
		Value::List(items) => items,
		other => vec![other],
	};
	Ok(Path {
		labels,
		objects,
	})
}

fn decode_plain_map(obj: &serde_json::Map<String, Json>) -> Result<Value> {
	let mut entries = HashMap::with_capacity(obj.len());
	for (key, value) in obj {
		entries.insert(key.clone(), decode(value)?);
	}
	Ok(Value::Map(entries))
}

fn field<'a>(value: &'a Json, name: &str, tag: &str) -> Result<&'a Json> {
	value.get(name).ok_or_else(|| {
		Error::Deserialization(format!("{} missing field {}", tag, name))
	})
}

fn expect_i64(tag: &str, value: &Json) -> Result<i64> {
	value.as_i64().ok_or_else(|| type_mismatch(tag, "integer", value))
}

fn expect_f64(tag: &str, value: &Json) -> Result<f64> {
	value.as_f64().ok_or_else(|| type_mismatch(tag, "number", value))
}

fn expect_str<'a>(tag: &str, value: &'a Json) -> Result<&'a str> {
	value.as_str().ok_or_else(|| type_mismatch(tag, "string", value))
}

fn expect_array<'a>(tag: &str, value: &'a Json) -> Result<&'a Vec<Json>> {
	value.as_array().ok_or_else(|| type_mismatch(tag, "array", value))
}

fn type_mismatch(tag: &str, expected: &str, value: &Json) -> Error {
	Error::Deserialization(format!(
		"{} expects {} @value, got {}",
		tag, expected, value
	))
}
