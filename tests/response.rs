// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

//! End-to-end response assembly against a scripted server: one logical
//! response reassembled from 200/204/206 text frames with control frames
//! and stale request ids interleaved.

mod common;

use std::{collections::HashMap, time::Duration};

use common::{MockServer, ServerAction};
use gremlin_ws_client::{Client, Config, Error, Value};

fn test_config(port: u16) -> Config {
	Config::new("127.0.0.1")
		.port(port)
		.pool_size(1)
		.max_overflow(0)
		.ping_delay(Duration::ZERO)
}

fn text_frame(code: u16, data: serde_json::Value) -> ServerAction {
	ServerAction::Text(
		serde_json::json!({
			"requestId": "__ID__",
			"status": {"code": code, "message": "", "attributes": {}},
			"result": {"data": data, "meta": {}}
		})
		.to_string(),
	)
}

fn linked_map(id: &str, linked: &str) -> serde_json::Value {
	serde_json::json!({
		"@type": "g:Map",
		"@value": [
			"id", id,
			"linked", {"@type": "g:List", "@value": [linked]},
			"label", "VERTEX"
		]
	})
}

fn expected_map(id: &str, linked: &str) -> Value {
	let mut entries = HashMap::new();
	entries.insert("id".to_string(), Value::String(id.to_string()));
	entries.insert(
		"linked".to_string(),
		Value::List(vec![Value::String(linked.to_string())]),
	);
	entries.insert(
		"label".to_string(),
		Value::String("VERTEX".to_string()),
	);
	Value::Map(entries)
}

#[test]
fn test_empty_result_204() {
	let server = MockServer::start(vec![vec![text_frame(
		204,
		serde_json::Value::Null,
	)]]);
	let client = Client::connect(test_config(server.port));

	let values = client
		.query_raw_with_timeout("g.V().limit(0)", Duration::from_secs(5))
		.unwrap();
	assert_eq!(values, Vec::<Value>::new());

	client.close();
	server.join();
}

#[test]
fn test_single_200() {
	let server = MockServer::start(vec![vec![text_frame(
		200,
		serde_json::json!({"@type": "g:List", "@value": ["0"]}),
	)]]);
	let client = Client::connect(test_config(server.port));

	let values = client
		.query_raw_with_timeout("g.V().count()", Duration::from_secs(5))
		.unwrap();
	assert_eq!(values, vec![Value::String("0".to_string())]);

	client.close();
	server.join();
}

#[test]
fn test_two_part_206_then_200() {
	let server = MockServer::start(vec![vec![
		text_frame(
			206,
			serde_json::json!({
				"@type": "g:List",
				"@value": [linked_map("id1", "id2")]
			}),
		),
		text_frame(
			200,
			serde_json::json!({
				"@type": "g:List",
				"@value": [linked_map("id2", "id1")]
			}),
		),
	]]);
	let client = Client::connect(test_config(server.port));

	let values = client
		.query_raw_with_timeout("g.V().valueMap()", Duration::from_secs(5))
		.unwrap();
	assert_eq!(
		values,
		vec![expected_map("id1", "id2"), expected_map("id2", "id1")]
	);

	client.close();
	server.join();
}

#[test]
fn test_pong_interleaving_does_not_change_result() {
	let server = MockServer::start(vec![vec![
		text_frame(
			206,
			serde_json::json!({
				"@type": "g:List",
				"@value": [linked_map("id1", "id2")]
			}),
		),
		ServerAction::Pong,
		text_frame(
			200,
			serde_json::json!({
				"@type": "g:List",
				"@value": [linked_map("id2", "id1")]
			}),
		),
		ServerAction::Pong,
		ServerAction::Pong,
	]]);
	let client = Client::connect(test_config(server.port));

	let values = client
		.query_raw_with_timeout("g.V().valueMap()", Duration::from_secs(5))
		.unwrap();
	assert_eq!(
		values,
		vec![expected_map("id1", "id2"), expected_map("id2", "id1")]
	);

	client.close();
	server.join();
}

#[test]
fn test_stale_request_id_is_discarded() {
	let stale = ServerAction::Text(
		serde_json::json!({
			"requestId": "00000000-0000-0000-0000-000000000000",
			"status": {"code": 200, "message": ""},
			"result": {
				"data": {"@type": "g:List", "@value": ["stale"]},
				"meta": {}
			}
		})
		.to_string(),
	);
	let server = MockServer::start(vec![vec![
		stale,
		text_frame(
			200,
			serde_json::json!({"@type": "g:List", "@value": ["fresh"]}),
		),
	]]);
	let client = Client::connect(test_config(server.port));

	let values = client
		.query_raw_with_timeout("g.V()", Duration::from_secs(5))
		.unwrap();
	assert_eq!(values, vec![Value::String("fresh".to_string())]);

	client.close();
	server.join();
}

#[test]
fn test_server_error_status_is_typed() {
	let server = MockServer::start(vec![vec![ServerAction::Text(
		serde_json::json!({
			"requestId": "__ID__",
			"status": {
				"code": 597,
				"message": "token ')' unexpected"
			},
			"result": {"data": null, "meta": {}}
		})
		.to_string(),
	)]]);
	let client = Client::connect(test_config(server.port));

	let err = client
		.query_raw_with_timeout("g.V)", Duration::from_secs(5))
		.unwrap_err();
	assert_eq!(
		err,
		Error::ScriptEvaluationError(
			"token ')' unexpected".to_string()
		)
	);

	client.close();
	server.join();
}

#[test]
fn test_missing_terminal_frame_times_out() {
	let server = MockServer::start(vec![vec![text_frame(
		206,
		serde_json::json!({"@type": "g:List", "@value": ["partial"]}),
	)]]);
	let client = Client::connect(test_config(server.port));

	let err = client
		.query_raw_with_timeout("g.V()", Duration::from_millis(300))
		.unwrap_err();
	assert_eq!(err, Error::Timeout);

	client.close();
	server.join();
}

#[test]
fn test_connection_reused_across_queries() {
	let server = MockServer::start(vec![
		vec![text_frame(
			200,
			serde_json::json!({"@type": "g:List", "@value": ["first"]}),
		)],
		vec![text_frame(
			200,
			serde_json::json!({"@type": "g:List", "@value": ["second"]}),
		)],
	]);
	let client = Client::connect(test_config(server.port));

	let first = client
		.query_raw_with_timeout("g.V()", Duration::from_secs(5))
		.unwrap();
	assert_eq!(first, vec![Value::String("first".to_string())]);

	let second = client
		.query_raw_with_timeout("g.V()", Duration::from_secs(5))
		.unwrap();
	assert_eq!(second, vec![Value::String("second".to_string())]);

	client.close();
	server.join();
}

#[test]
fn test_query_without_server_fails_unavailable() {
	// Grab a port nobody is listening on.
	let port = {
		let listener =
			std::net::TcpListener::bind("127.0.0.1:0").unwrap();
		listener.local_addr().unwrap().port()
	};
	let client = Client::connect(test_config(port));

	let err = client
		.query_raw_with_timeout("g.V()", Duration::from_secs(2))
		.unwrap_err();
	assert_eq!(err, Error::ConnectionUnavailable);

	client.close();
}
