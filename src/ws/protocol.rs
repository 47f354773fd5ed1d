// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

use base64::{prelude::BASE64_STANDARD, Engine};
use flate2::{
	Compress, Compression, Decompress, FlushCompress, FlushDecompress,
};
use sha1::{digest::Digest, Sha1};

use crate::error::{Error, Result};

// === HTTP -> WebSocket handshake helpers ===

/// Find the end of HTTP headers (double CRLF).
pub(crate) fn find_header_end(buf: &[u8]) -> Option<usize> {
	let pattern = b"\r\n\r\n";
	buf.windows(4).position(|w| w == pattern).map(|i| i + 4)
}

/// Generate a random `Sec-WebSocket-Key` for the upgrade request.
pub(crate) fn generate_websocket_key() -> String {
	let random_bytes: [u8; 16] = rand::random();
	BASE64_STANDARD.encode(random_bytes)
}

/// The `Sec-WebSocket-Accept` value the server must echo for `key`.
pub(crate) fn compute_accept_key(key: &str) -> String {
	const GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";
	let mut sha1 = Sha1::new();
	sha1.update(key.as_bytes());
	sha1.update(GUID.as_bytes());
	let result = sha1.finalize();
	BASE64_STANDARD.encode(result)
}

/// The upgrade request, offering permessage-deflate.
pub(crate) fn build_upgrade_request(
	host: &str,
	port: u16,
	path: &str,
	key: &str,
) -> String {
	format!(
		"GET {} HTTP/1.1\r\n\
		Host: {}:{}\r\n\
		Upgrade: websocket\r\n\
		Connection: Upgrade\r\n\
		Sec-WebSocket-Key: {}\r\n\
		Sec-WebSocket-Version: 13\r\n\
		Sec-WebSocket-Extensions: permessage-deflate; client_max_window_bits\r\n\
		\r\n",
		path, host, port, key
	)
}

/// What the server's 101 response granted us.
#[derive(Debug)]
pub(crate) struct HandshakeReply {
	pub accept: Option<String>,
	pub extensions: Option<String>,
}

pub(crate) fn parse_upgrade_response(buf: &[u8]) -> Result<HandshakeReply> {
	let mut headers = [httparse::EMPTY_HEADER; 32];
	let mut response = httparse::Response::new(&mut headers);
	let status = response
		.parse(buf)
		.map_err(|e| Error::Handshake(e.to_string()))?;
	if status.is_partial() {
		return Err(Error::Handshake(
			"partial HTTP response".to_string(),
		));
	}
	if response.code != Some(101) {
		return Err(Error::Handshake(format!(
			"expected 101 Switching Protocols, got {:?}",
			response.code
		)));
	}

	let mut accept = None;
	let mut extensions = None;
	for header in response.headers.iter() {
		match header.name.to_ascii_lowercase().as_str() {
			"sec-websocket-accept" => {
				accept = Some(
					String::from_utf8_lossy(header.value)
						.trim()
						.to_string(),
				);
			}
			"sec-websocket-extensions" => {
				extensions = Some(
					String::from_utf8_lossy(header.value)
						.trim()
						.to_string(),
				);
			}
			_ => {}
		}
	}

	Ok(HandshakeReply {
		accept,
		extensions,
	})
}

// === WebSocket frame handling ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Opcode {
	Continuation,
	Text,
	Binary,
	Close,
	Ping,
	Pong,
	Unknown(u8),
}

impl From<u8> for Opcode {
	fn from(value: u8) -> Self {
		match value {
			0x0 => Self::Continuation,
			0x1 => Self::Text,
			0x2 => Self::Binary,
			0x8 => Self::Close,
			0x9 => Self::Ping,
			0xA => Self::Pong,
			other => Self::Unknown(other),
		}
	}
}

impl Opcode {
	pub(crate) fn code(self) -> u8 {
		match self {
			Self::Continuation => 0x0,
			Self::Text => 0x1,
			Self::Binary => 0x2,
			Self::Close => 0x8,
			Self::Ping => 0x9,
			Self::Pong => 0xA,
			Self::Unknown(other) => other,
		}
	}

	pub(crate) fn is_control(self) -> bool {
		matches!(self, Self::Close | Self::Ping | Self::Pong)
	}
}

/// One parsed frame. `rsv1` marks a compressed message (first frame only
/// under permessage-deflate).
#[derive(Debug, Clone)]
pub(crate) struct RawFrame {
	pub fin: bool,
	pub rsv1: bool,
	pub opcode: Opcode,
	pub payload: Vec<u8>,
}

/// Parse one frame from the front of `data`. Returns the frame and the
/// number of bytes it occupied, or `None` if the buffer is still short.
pub(crate) fn parse_frame(data: &[u8]) -> Result<Option<(RawFrame, usize)>> {
	if data.len() < 2 {
		return Ok(None);
	}

	let first_byte = data[0];
	let second_byte = data[1];

	let fin = (first_byte & 0x80) != 0;
	let rsv1 = (first_byte & 0x40) != 0;
	let opcode = Opcode::from(first_byte & 0x0F);
	let masked = (second_byte & 0x80) != 0;
	let mut payload_len = (second_byte & 0x7F) as usize;

	let mut header_len = 2;

	// Extended payload length
	if payload_len == 126 {
		if data.len() < 4 {
			return Ok(None);
		}
		payload_len = u16::from_be_bytes([data[2], data[3]]) as usize;
		header_len = 4;
	} else if payload_len == 127 {
		if data.len() < 10 {
			return Ok(None);
		}
		let len = u64::from_be_bytes([
			data[2], data[3], data[4], data[5], data[6], data[7],
			data[8], data[9],
		]);
		payload_len = usize::try_from(len).map_err(|_| {
			Error::Transport(format!("oversized frame: {}", len))
		})?;
		header_len = 10;
	}

	// Masking key (servers do not mask, but tolerate it)
	let mask_key = if masked {
		if data.len() < header_len + 4 {
			return Ok(None);
		}
		let key = [
			data[header_len],
			data[header_len + 1],
			data[header_len + 2],
			data[header_len + 3],
		];
		header_len += 4;
		Some(key)
	} else {
		None
	};

	if data.len() < header_len + payload_len {
		return Ok(None);
	}

	let mut payload = data[header_len..header_len + payload_len].to_vec();
	if let Some(mask) = mask_key {
		for (i, byte) in payload.iter_mut().enumerate() {
			*byte ^= mask[i % 4];
		}
	}

	Ok(Some((
		RawFrame {
			fin,
			rsv1,
			opcode,
			payload,
		},
		header_len + payload_len,
	)))
}

/// Build one frame. Client frames must be masked per RFC 6455.
pub(crate) fn build_frame(
	opcode: Opcode,
	payload: &[u8],
	mask: bool,
	rsv1: bool,
) -> Vec<u8> {
	let mut frame = Vec::with_capacity(payload.len() + 14);

	let mut first = 0x80 | opcode.code();
	if rsv1 {
		first |= 0x40;
	}
	frame.push(first);

	let mask_bit = if mask {
		0x80
	} else {
		0x00
	};
	let payload_len = payload.len();
	if payload_len < 126 {
		frame.push(mask_bit | payload_len as u8);
	} else if payload_len <= 65535 {
		frame.push(mask_bit | 126);
		frame.extend_from_slice(&(payload_len as u16).to_be_bytes());
	} else {
		frame.push(mask_bit | 127);
		frame.extend_from_slice(&(payload_len as u64).to_be_bytes());
	}

	if mask {
		let mask_key: [u8; 4] = rand::random();
		frame.extend_from_slice(&mask_key);
		for (i, &byte) in payload.iter().enumerate() {
			frame.push(byte ^ mask_key[i % 4]);
		}
	} else {
		frame.extend_from_slice(payload);
	}

	frame
}

// === permessage-deflate (RFC 7692) ===

/// The sync-flush trailer stripped from compressed messages on the wire.
const DEFLATE_TAIL: [u8; 4] = [0x00, 0x00, 0xFF, 0xFF];

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DeflateConfig {
	pub server_no_context_takeover: bool,
	pub client_no_context_takeover: bool,
}

/// Parse the server's `Sec-WebSocket-Extensions` answer. Returns `None`
/// when permessage-deflate was not granted.
pub(crate) fn parse_deflate_params(header: &str) -> Option<DeflateConfig> {
	for extension in header.split(',') {
		let mut parts = extension.split(';').map(str::trim);
		if parts.next() != Some("permessage-deflate") {
			continue;
		}
		let mut config = DeflateConfig::default();
		for param in parts {
			let name = param
				.split_once('=')
				.map(|(n, _)| n.trim())
				.unwrap_or(param);
			match name {
				"server_no_context_takeover" => {
					config.server_no_context_takeover =
						true;
				}
				"client_no_context_takeover" => {
					config.client_no_context_takeover =
						true;
				}
				// Window-bit hints only shrink the sliding
				// window; a full-window codec still decodes
				// them.
				"server_max_window_bits"
				| "client_max_window_bits" => {}
				_ => {}
			}
		}
		return Some(config);
	}
	None
}

/// Message compressor/decompressor for one negotiated connection.
///
/// Context takeover (the shared sliding window across messages) is kept
/// unless the negotiation turned it off, in which case the codec resets
/// after every message.
pub(crate) struct MessageDeflate {
	config: DeflateConfig,
	compress: Compress,
	decompress: Decompress,
}

impl MessageDeflate {
	pub fn new(config: DeflateConfig) -> Self {
		Self {
			config,
			compress: Compress::new(Compression::default(), false),
			decompress: Decompress::new(false),
		}
	}

	/// Deflate one outgoing message payload; the 4-byte sync-flush
	/// trailer is stripped per RFC 7692.
	pub fn compress(&mut self, data: &[u8]) -> Result<Vec<u8>> {
		let mut out = Vec::with_capacity(data.len() / 2 + 64);
		let mut consumed = 0usize;
		loop {
			if out.capacity() - out.len() < 64 {
				out.reserve(4096);
			}
			let before = self.compress.total_in();
			self.compress
				.compress_vec(
					&data[consumed..],
					&mut out,
					FlushCompress::Sync,
				)
				.map_err(|e| {
					Error::Transport(format!(
						"deflate failed: {}",
						e
					))
				})?;
			consumed += (self.compress.total_in() - before)
				as usize;
			// Complete only once zlib had output room to spare,
			// so the sync-flush trailer cannot be half-written.
			if consumed >= data.len()
				&& out.len() < out.capacity()
				&& out.ends_with(&DEFLATE_TAIL)
			{
				break;
			}
		}
		out.truncate(out.len() - DEFLATE_TAIL.len());
		if self.config.client_no_context_takeover {
			self.compress.reset();
		}
		Ok(out)
	}

	/// Inflate one incoming message payload (trailer restored first).
	pub fn decompress(&mut self, data: &[u8]) -> Result<Vec<u8>> {
		let mut input = Vec::with_capacity(
			data.len() + DEFLATE_TAIL.len(),
		);
		input.extend_from_slice(data);
		input.extend_from_slice(&DEFLATE_TAIL);

		let mut out = Vec::with_capacity(data.len() * 2 + 64);
		let mut consumed = 0usize;
		loop {
			if out.capacity() - out.len() < 64 {
				out.reserve(4096);
			}
			let before_in = self.decompress.total_in();
			let before_out = self.decompress.total_out();
			self.decompress
				.decompress_vec(
					&input[consumed..],
					&mut out,
					FlushDecompress::Sync,
				)
				.map_err(|e| {
					Error::Transport(format!(
						"inflate failed: {}",
						e
					))
				})?;
			let read = (self.decompress.total_in() - before_in)
				as usize;
			let wrote = (self.decompress.total_out() - before_out)
				as usize;
			consumed += read;
			if consumed >= input.len() {
				// Done once the output buffer had room left,
				// i.e. nothing is still pending inside zlib.
				if out.len() < out.capacity() {
					break;
				}
			} else if read == 0 && wrote == 0 {
				// No forward progress with space available:
				// the stream is truncated or corrupt.
				return Err(Error::Transport(
					"inflate stalled on corrupt payload"
						.to_string(),
				));
			}
		}
		if self.config.server_no_context_takeover {
			self.decompress.reset(false);
		}
		Ok(out)
	}
}
