// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

//! The background worker thread that owns one WebSocket.
//!
//! In Active mode the worker polls its command channel and the socket
//! without blocking, answers server pings and sends keep-alives. A query
//! switches it to Passive mode: one request frame out, then blocking
//! reads until the response protocol reports a terminal status or the
//! caller's budget runs out. Transport failures drop the socket and
//! schedule a reconnect; they never surface stale data to a later caller.

use std::{
	sync::mpsc,
	thread,
	time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::{
	config::Config,
	domain::Value,
	error::{Error, Result},
	ws::{
		connection::WsConnection,
		protocol::Opcode,
		request::Request,
		response::{Assembler, BatchOutcome},
	},
};

/// Delay before retrying a failed or dropped connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Commands a worker accepts from sessions.
pub(crate) enum InternalMessage {
	Query {
		request: Request,
		timeout: Duration,
		route: mpsc::Sender<Result<Vec<Value>>>,
	},
	Close,
}

/// The worker thread body. Runs until told to close or until every
/// command sender is gone.
pub(crate) fn worker_thread(
	config: Config,
	command_rx: mpsc::Receiver<InternalMessage>,
) {
	let mut conn = match WsConnection::connect(&config) {
		Ok(conn) => Some(conn),
		Err(e) => {
			warn!(error = %e, "initial connect failed");
			None
		}
	};
	let mut next_connect = Instant::now() + RECONNECT_DELAY;
	let mut last_ping = Instant::now();

	debug!(host = %config.host, port = config.port, "worker started");

	loop {
		if conn.is_none() && Instant::now() >= next_connect {
			match WsConnection::connect(&config) {
				Ok(new_conn) => {
					debug!("reconnected");
					conn = Some(new_conn);
				}
				Err(e) => {
					warn!(error = %e, "reconnect failed");
					next_connect =
						Instant::now() + RECONNECT_DELAY;
				}
			}
		}

		// Commands (non-blocking)
		match command_rx.try_recv() {
			Ok(InternalMessage::Query {
				request,
				timeout,
				route,
			}) => {
				let result = match conn.as_mut() {
					Some(conn) => {
						run_query(conn, &request, timeout)
					}
					None => Err(Error::ConnectionUnavailable),
				};
				if result
					.as_ref()
					.is_err_and(|e| e.is_transport())
				{
					conn = None;
					next_connect =
						Instant::now() + RECONNECT_DELAY;
				}
				let _ = route.send(result);
			}
			Ok(InternalMessage::Close) => {
				if let Some(conn) = conn.as_mut() {
					let _ = conn.send_close();
				}
				break;
			}
			Err(mpsc::TryRecvError::Empty) => {}
			Err(mpsc::TryRecvError::Disconnected) => {
				if let Some(conn) = conn.as_mut() {
					let _ = conn.send_close();
				}
				break;
			}
		}

		// Incoming frames (non-blocking)
		let mut drop_conn = false;
		if let Some(active) = conn.as_mut() {
			match active.poll_frame() {
				Ok(Some(frame)) => match frame.opcode {
					Opcode::Ping => {
						let _ = active
							.send_pong(&frame.payload);
					}
					Opcode::Pong => {}
					Opcode::Close => {
						debug!("server sent close");
						drop_conn = true;
					}
					Opcode::Text => {
						// Late answer to a timed-out
						// query; its id is stale.
						warn!(
							len = frame.payload.len(),
							"discarding stray text frame"
						);
					}
					_ => {}
				},
				Ok(None) => {}
				Err(e) => {
					warn!(error = %e, "connection lost");
					drop_conn = true;
				}
			}
		}
		if drop_conn {
			conn = None;
			next_connect = Instant::now() + RECONNECT_DELAY;
		}

		// Keep-alive. A failed ping is tolerated; the following
		// read/write error triggers the reconnect.
		if let Some(active) = conn.as_mut() {
			if !config.ping_delay.is_zero()
				&& last_ping.elapsed() >= config.ping_delay
			{
				if let Err(e) = active.send_ping(b"") {
					debug!(error = %e, "keep-alive ping failed");
				}
				last_ping = Instant::now();
			}
		}

		thread::sleep(Duration::from_millis(1));
	}

	debug!("worker stopped");
}

/// One synchronous request/response exchange in Passive mode.
fn run_query(
	conn: &mut WsConnection,
	request: &Request,
	timeout: Duration,
) -> Result<Vec<Value>> {
	conn.set_passive()?;
	let result = drain_response(conn, request, timeout);
	// Back to Active before the caller sees the reply; a dead socket
	// makes this moot since the worker drops it next.
	let _ = conn.set_active();
	result
}

fn drain_response(
	conn: &mut WsConnection,
	request: &Request,
	timeout: Duration,
) -> Result<Vec<Value>> {
	let deadline = Instant::now() + timeout;
	conn.send_text(&request.to_json()?)?;

	let mut assembler = Assembler::new(request.request_id.as_str());
	loop {
		let batch = conn.read_batch(deadline)?;
		let mut texts = Vec::new();
		let mut closed = false;
		for frame in batch {
			match frame.opcode {
				Opcode::Text => {
					match String::from_utf8(frame.payload)
					{
						Ok(text) => texts.push(text),
						Err(e) => warn!(
							error = %e,
							"discarding non-utf8 text frame"
						),
					}
				}
				Opcode::Ping => {
					let _ = conn.send_pong(&frame.payload);
				}
				Opcode::Pong => {}
				Opcode::Close => closed = true,
				_ => {}
			}
		}

		// Text frames in the batch are still processed; the close
		// only wins if the response is not terminal.
		if !texts.is_empty() {
			if let BatchOutcome::Done(values) =
				assembler.ingest(&texts)?
			{
				return Ok(values);
			}
		}
		if closed {
			return Err(Error::Transport(
				"server closed the connection mid-query"
					.to_string(),
			));
		}
	}
}
