// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

use std::{
	io::{self, Read, Write},
	net::{TcpStream, ToSocketAddrs},
	time::{Duration, Instant},
};

use native_tls::{TlsConnector, TlsStream};
use tracing::{debug, trace};

use crate::{
	config::Config,
	error::{Error, Result},
	ws::protocol::{self, MessageDeflate, Opcode},
};

/// A plain or TLS-wrapped TCP stream, mirroring the shape the async
/// stack calls `MaybeTlsStream`.
pub(crate) enum MaybeTlsStream {
	Plain(TcpStream),
	Tls(Box<TlsStream<TcpStream>>),
}

impl MaybeTlsStream {
	fn tcp(&self) -> &TcpStream {
		match self {
			MaybeTlsStream::Plain(stream) => stream,
			MaybeTlsStream::Tls(stream) => stream.get_ref(),
		}
	}

	fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
		self.tcp().set_read_timeout(timeout)
	}

	fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
		self.tcp().set_nonblocking(nonblocking)
	}
}

impl Read for MaybeTlsStream {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		match self {
			MaybeTlsStream::Plain(stream) => stream.read(buf),
			MaybeTlsStream::Tls(stream) => stream.read(buf),
		}
	}
}

impl Write for MaybeTlsStream {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		match self {
			MaybeTlsStream::Plain(stream) => stream.write(buf),
			MaybeTlsStream::Tls(stream) => stream.write(buf),
		}
	}

	fn flush(&mut self) -> io::Result<()> {
		match self {
			MaybeTlsStream::Plain(stream) => stream.flush(),
			MaybeTlsStream::Tls(stream) => stream.flush(),
		}
	}
}

/// A complete, decompressed WebSocket message or control frame.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
	pub opcode: Opcode,
	pub payload: Vec<u8>,
}

/// One upgraded WebSocket connection.
///
/// The worker toggles it between Active mode (non-blocking polls so
/// background pings keep flowing) and Passive mode (blocking reads that
/// drain one query's response).
pub(crate) struct WsConnection {
	stream: MaybeTlsStream,
	buffer: Vec<u8>,
	deflate: Option<MessageDeflate>,
	/// Data-frame fragments awaiting their FIN frame.
	partial: Option<(Opcode, bool, Vec<u8>)>,
}

impl WsConnection {
	/// Open TCP/TLS, perform the HTTP upgrade and negotiate
	/// permessage-deflate. The connection starts in Active mode.
	pub fn connect(config: &Config) -> Result<Self> {
		let stream = open_stream(config)?;
		let mut conn = Self {
			stream,
			buffer: Vec::new(),
			deflate: None,
			partial: None,
		};
		conn.upgrade(config)?;
		conn.set_active()?;
		Ok(conn)
	}

	fn upgrade(&mut self, config: &Config) -> Result<()> {
		let key = protocol::generate_websocket_key();
		let request = protocol::build_upgrade_request(
			&config.host,
			config.port,
			&config.path,
			&key,
		);
		self.stream
			.write_all(request.as_bytes())
			.and_then(|_| self.stream.flush())
			.map_err(|e| Error::Handshake(e.to_string()))?;

		self.stream
			.set_read_timeout(Some(config.opts.connect_timeout))
			.map_err(|e| Error::Handshake(e.to_string()))?;

		let mut response = Vec::new();
		let header_end = loop {
			let mut chunk = [0u8; 2048];
			let n = self
				.stream
				.read(&mut chunk)
				.map_err(|e| Error::Handshake(e.to_string()))?;
			if n == 0 {
				return Err(Error::Handshake(
					"connection closed during upgrade"
						.to_string(),
				));
			}
			response.extend_from_slice(&chunk[..n]);
			if let Some(end) =
				protocol::find_header_end(&response)
			{
				break end;
			}
			if response.len() > 16 * 1024 {
				return Err(Error::Handshake(
					"oversized upgrade response"
						.to_string(),
				));
			}
		};

		let reply =
			protocol::parse_upgrade_response(&response[..header_end])?;
		let expected = protocol::compute_accept_key(&key);
		if reply.accept.as_deref() != Some(expected.as_str()) {
			return Err(Error::Handshake(format!(
				"Sec-WebSocket-Accept mismatch: {:?}",
				reply.accept
			)));
		}

		self.deflate = reply
			.extensions
			.as_deref()
			.and_then(protocol::parse_deflate_params)
			.map(MessageDeflate::new);
		debug!(
			compressed = self.deflate.is_some(),
			"websocket upgrade complete"
		);

		// Frames may already trail the 101 response.
		self.buffer.extend_from_slice(&response[header_end..]);
		Ok(())
	}

	/// Asynchronous (non-blocking) reads for background handling.
	pub fn set_active(&mut self) -> Result<()> {
		self.stream
			.set_nonblocking(true)
			.map_err(|e| Error::Transport(e.to_string()))
	}

	/// Blocking reads for a synchronous request/response exchange.
	pub fn set_passive(&mut self) -> Result<()> {
		self.stream
			.set_nonblocking(false)
			.map_err(|e| Error::Transport(e.to_string()))
	}

	pub fn send_text(&mut self, text: &str) -> Result<()> {
		let (payload, rsv1) = match self.deflate.as_mut() {
			Some(deflate) => (deflate.compress(text.as_bytes())?, true),
			None => (text.as_bytes().to_vec(), false),
		};
		self.send_raw(Opcode::Text, &payload, rsv1)
	}

	pub fn send_ping(&mut self, payload: &[u8]) -> Result<()> {
		self.send_raw(Opcode::Ping, payload, false)
	}

	pub fn send_pong(&mut self, payload: &[u8]) -> Result<()> {
		self.send_raw(Opcode::Pong, payload, false)
	}

	pub fn send_close(&mut self) -> Result<()> {
		self.send_raw(Opcode::Close, &[], false)
	}

	fn send_raw(
		&mut self,
		opcode: Opcode,
		payload: &[u8],
		rsv1: bool,
	) -> Result<()> {
		let frame = protocol::build_frame(opcode, payload, true, rsv1);
		self.stream
			.write_all(&frame)
			.and_then(|_| self.stream.flush())
			.map_err(|e| Error::Transport(e.to_string()))
	}

	/// Active mode: pull whatever the transport has without blocking.
	pub fn poll_frame(&mut self) -> Result<Option<Frame>> {
		if let Some(frame) = self.take_frame()? {
			return Ok(Some(frame));
		}
		loop {
			let mut chunk = [0u8; 8192];
			match self.stream.read(&mut chunk) {
				Ok(0) => {
					return Err(Error::Transport(
						"connection closed by peer"
							.to_string(),
					))
				}
				Ok(n) => {
					self.buffer
						.extend_from_slice(&chunk[..n]);
				}
				Err(ref e)
					if e.kind()
						== io::ErrorKind::WouldBlock =>
				{
					break;
				}
				Err(e) => {
					return Err(Error::Transport(
						e.to_string(),
					))
				}
			}
		}
		self.take_frame()
	}

	/// Passive mode: block until at least one complete frame arrives or
	/// the deadline passes, then return every frame delivered together.
	pub fn read_batch(&mut self, deadline: Instant) -> Result<Vec<Frame>> {
		let mut batch = self.drain_frames()?;
		while batch.is_empty() {
			let remaining = deadline
				.checked_duration_since(Instant::now())
				.filter(|r| !r.is_zero())
				.ok_or(Error::Timeout)?;
			self.stream
				.set_read_timeout(Some(remaining))
				.map_err(|e| Error::Transport(e.to_string()))?;

			let mut chunk = [0u8; 8192];
			match self.stream.read(&mut chunk) {
				Ok(0) => {
					return Err(Error::Transport(
						"connection closed by peer"
							.to_string(),
					))
				}
				Ok(n) => {
					self.buffer
						.extend_from_slice(&chunk[..n]);
					batch = self.drain_frames()?;
				}
				Err(ref e)
					if e.kind() == io::ErrorKind::WouldBlock
						|| e.kind() == io::ErrorKind::TimedOut =>
				{
					return Err(Error::Timeout);
				}
				Err(e) => {
					return Err(Error::Transport(
						e.to_string(),
					))
				}
			}
		}
		Ok(batch)
	}

	fn drain_frames(&mut self) -> Result<Vec<Frame>> {
		let mut frames = Vec::new();
		while let Some(frame) = self.take_frame()? {
			frames.push(frame);
		}
		Ok(frames)
	}

	/// Extract the next complete message from the buffer, reassembling
	/// fragmented data frames and inflating compressed messages.
	/// Control frames pass through even between fragments.
	fn take_frame(&mut self) -> Result<Option<Frame>> {
		loop {
			let (raw, consumed) =
				match protocol::parse_frame(&self.buffer)? {
					Some(parsed) => parsed,
					None => return Ok(None),
				};
			self.buffer.drain(..consumed);
			trace!(opcode = ?raw.opcode, len = raw.payload.len(), fin = raw.fin, "frame");

			if raw.opcode.is_control() {
				return Ok(Some(Frame {
					opcode: raw.opcode,
					payload: raw.payload,
				}));
			}

			match (raw.fin, raw.opcode) {
				(true, Opcode::Continuation) => {
					let (opcode, compressed, mut payload) =
						self.partial.take().ok_or_else(
							stray_continuation,
						)?;
					payload.extend_from_slice(&raw.payload);
					return self
						.finish_message(
							opcode, compressed,
							payload,
						)
						.map(Some);
				}
				(false, Opcode::Continuation) => {
					let partial = self
						.partial
						.as_mut()
						.ok_or_else(stray_continuation)?;
					partial.2.extend_from_slice(&raw.payload);
				}
				(true, opcode) => {
					return self
						.finish_message(
							opcode, raw.rsv1,
							raw.payload,
						)
						.map(Some);
				}
				(false, opcode) => {
					self.partial = Some((
						opcode,
						raw.rsv1,
						raw.payload,
					));
				}
			}
		}
	}

	fn finish_message(
		&mut self,
		opcode: Opcode,
		compressed: bool,
		payload: Vec<u8>,
	) -> Result<Frame> {
		let payload = if compressed {
			match self.deflate.as_mut() {
				Some(deflate) => deflate.decompress(&payload)?,
				None => {
					return Err(Error::Transport(
						"compressed frame without negotiated extension".to_string(),
					))
				}
			}
		} else {
			payload
		};
		Ok(Frame {
			opcode,
			payload,
		})
	}
}

fn stray_continuation() -> Error {
	Error::Transport("continuation frame without a message".to_string())
}

fn open_stream(config: &Config) -> Result<MaybeTlsStream> {
	let addrs: Vec<_> = (config.host.as_str(), config.port)
		.to_socket_addrs()
		.map_err(|e| Error::Transport(e.to_string()))?
		.collect();

	let mut last_err = None;
	let mut tcp = None;
	for addr in addrs {
		match TcpStream::connect_timeout(
			&addr,
			config.opts.connect_timeout,
		) {
			Ok(stream) => {
				tcp = Some(stream);
				break;
			}
			Err(e) => last_err = Some(e),
		}
	}
	let tcp = tcp.ok_or_else(|| {
		Error::Transport(match last_err {
			Some(e) => e.to_string(),
			None => format!(
				"no addresses resolved for {}:{}",
				config.host, config.port
			),
		})
	})?;

	if config.opts.nodelay {
		tcp.set_nodelay(true)
			.map_err(|e| Error::Transport(e.to_string()))?;
	}

	if !config.secure {
		return Ok(MaybeTlsStream::Plain(tcp));
	}

	let connector = TlsConnector::builder()
		.danger_accept_invalid_certs(
			config.opts.danger_accept_invalid_certs,
		)
		.build()
		.map_err(|e| Error::Transport(e.to_string()))?;
	let tls = connector
		.connect(&config.host, tcp)
		.map_err(|e| Error::Transport(e.to_string()))?;
	Ok(MaybeTlsStream::Tls(Box::new(tls)))
}
