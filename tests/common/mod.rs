// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

//! A scripted single-connection Gremlin server for integration tests.
//!
//! Speaks just enough RFC 6455 to upgrade, read the client's masked text
//! frames and play back a canned sequence of frames per request. The
//! `__ID__` placeholder in scripted text is replaced with the incoming
//! requestId so correlation works without fixing ids in advance.

use std::{
	io::{Read, Write},
	net::{TcpListener, TcpStream},
	thread,
};

use base64::{prelude::BASE64_STANDARD, Engine};
use sha1::{digest::Digest, Sha1};

/// One scripted server action, played after a request arrives.
#[derive(Clone)]
#[allow(dead_code)]
pub enum ServerAction {
	/// A text frame; `__ID__` is replaced with the requestId.
	Text(String),
	Pong,
	Ping,
	Close,
}

pub struct MockServer {
	pub port: u16,
	handle: Option<thread::JoinHandle<()>>,
}

impl MockServer {
	/// Start a server that answers one connection and plays one action
	/// list per successive request.
	pub fn start(scripts: Vec<Vec<ServerAction>>) -> Self {
		let listener = TcpListener::bind("127.0.0.1:0").unwrap();
		let port = listener.local_addr().unwrap().port();
		let handle = thread::spawn(move || {
			let (mut stream, _) = listener.accept().unwrap();
			upgrade(&mut stream);
			for script in scripts {
				let request_id = match read_request(&mut stream) {
					Some(id) => id,
					None => return,
				};
				for action in script {
					play(&mut stream, &action, &request_id);
				}
			}
			// Absorb whatever follows (keep-alives, the close
			// frame) until the client hangs up.
			let mut sink = [0u8; 1024];
			while let Ok(n) = stream.read(&mut sink) {
				if n == 0 {
					break;
				}
			}
		});
		Self {
			port,
			handle: Some(handle),
		}
	}

	pub fn join(mut self) {
		if let Some(handle) = self.handle.take() {
			let _ = handle.join();
		}
	}
}

fn upgrade(stream: &mut TcpStream) {
	let mut request = Vec::new();
	let mut chunk = [0u8; 1024];
	while !request.windows(4).any(|w| w == b"\r\n\r\n") {
		let n = stream.read(&mut chunk).unwrap();
		assert!(n > 0, "client hung up during handshake");
		request.extend_from_slice(&chunk[..n]);
	}

	let text = String::from_utf8_lossy(&request);
	let key = text
		.lines()
		.find_map(|line| {
			let (name, value) = line.split_once(':')?;
			name.eq_ignore_ascii_case("sec-websocket-key")
				.then(|| value.trim().to_string())
		})
		.expect("missing Sec-WebSocket-Key");

	const GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";
	let mut sha1 = Sha1::new();
	sha1.update(key.as_bytes());
	sha1.update(GUID.as_bytes());
	let accept = BASE64_STANDARD.encode(sha1.finalize());

	let response = format!(
		"HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Accept: {}\r\n\r\n",
		accept
	);
	stream.write_all(response.as_bytes()).unwrap();
}

/// Read frames until a text frame arrives; answer pings; return the
/// requestId from its JSON payload. `None` when the client went away.
fn read_request(stream: &mut TcpStream) -> Option<String> {
	loop {
		let (opcode, payload) = read_frame(stream)?;
		match opcode {
			0x1 => {
				let text = String::from_utf8(payload).ok()?;
				let json: serde_json::Value =
					serde_json::from_str(&text).ok()?;
				return Some(
					json["requestId"]
						.as_str()
						.unwrap_or_default()
						.to_string(),
				);
			}
			0x9 => write_frame(stream, 0xA, &payload),
			0x8 => return None,
			_ => {}
		}
	}
}

fn play(stream: &mut TcpStream, action: &ServerAction, request_id: &str) {
	match action {
		ServerAction::Text(template) => {
			let text = template.replace("__ID__", request_id);
			write_frame(stream, 0x1, text.as_bytes());
		}
		ServerAction::Pong => write_frame(stream, 0xA, b""),
		ServerAction::Ping => write_frame(stream, 0x9, b""),
		ServerAction::Close => write_frame(stream, 0x8, b""),
	}
}

/// Read one client frame, unmasking the payload.
fn read_frame(stream: &mut TcpStream) -> Option<(u8, Vec<u8>)> {
	let mut header = [0u8; 2];
	read_exact(stream, &mut header)?;
	let opcode = header[0] & 0x0F;
	let masked = (header[1] & 0x80) != 0;
	let mut len = (header[1] & 0x7F) as usize;

	if len == 126 {
		let mut ext = [0u8; 2];
		read_exact(stream, &mut ext)?;
		len = u16::from_be_bytes(ext) as usize;
	} else if len == 127 {
		let mut ext = [0u8; 8];
		read_exact(stream, &mut ext)?;
		len = u64::from_be_bytes(ext) as usize;
	}

	let mask = if masked {
		let mut key = [0u8; 4];
		read_exact(stream, &mut key)?;
		Some(key)
	} else {
		None
	};

	let mut payload = vec![0u8; len];
	read_exact(stream, &mut payload)?;
	if let Some(key) = mask {
		for (i, byte) in payload.iter_mut().enumerate() {
			*byte ^= key[i % 4];
		}
	}
	Some((opcode, payload))
}

fn read_exact(stream: &mut TcpStream, buf: &mut [u8]) -> Option<()> {
	stream.read_exact(buf).ok()
}

/// Write one unmasked server frame.
fn write_frame(stream: &mut TcpStream, opcode: u8, payload: &[u8]) {
	let mut frame = vec![0x80 | opcode];
	if payload.len() < 126 {
		frame.push(payload.len() as u8);
	} else if payload.len() <= 65535 {
		frame.push(126);
		frame.extend_from_slice(
			&(payload.len() as u16).to_be_bytes(),
		);
	} else {
		frame.push(127);
		frame.extend_from_slice(
			&(payload.len() as u64).to_be_bytes(),
		);
	}
	frame.extend_from_slice(payload);
	let _ = stream.write_all(&frame);
}
