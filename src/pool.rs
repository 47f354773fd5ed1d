// Copyright (c) reifydb.com 2025
// This file is licensed under the MIT

use std::{
	sync::{
		atomic::{AtomicUsize, Ordering},
		mpsc,
	},
	thread,
	time::Duration,
};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::warn;

use crate::{
	config::Config,
	domain::Value,
	error::{Error, Result},
	ws::{
		request::Request,
		worker::{worker_thread, InternalMessage},
	},
};

/// Handle to one worker thread. Owning the handle means owning the
/// worker: at most one query is in flight per worker at any time.
pub(crate) struct WorkerHandle {
	command_tx: mpsc::Sender<InternalMessage>,
	thread: Option<thread::JoinHandle<()>>,
	/// Extra time granted on top of the query timeout for the worker
	/// to finish a connect attempt before replying.
	reply_grace: Duration,
	transient: bool,
}

impl WorkerHandle {
	fn spawn(config: Config, transient: bool) -> Self {
		let (command_tx, command_rx) = mpsc::channel();
		let reply_grace = config.opts.connect_timeout
			+ Duration::from_secs(1);
		let thread = thread::Builder::new()
			.name("gremlin-ws-worker".to_string())
			.spawn(move || worker_thread(config, command_rx))
			.ok();
		if thread.is_none() {
			warn!("failed to spawn worker thread");
		}
		Self {
			command_tx,
			thread,
			reply_grace,
			transient,
		}
	}

	/// Submit one request and wait synchronously for the reply.
	pub fn query(
		&self,
		request: Request,
		timeout: Duration,
	) -> Result<Vec<Value>> {
		let (route, reply_rx) = mpsc::channel();
		self.command_tx
			.send(InternalMessage::Query {
				request,
				timeout,
				route,
			})
			.map_err(|_| Error::ConnectionUnavailable)?;

		match reply_rx.recv_timeout(timeout + self.reply_grace) {
			Ok(result) => result,
			Err(_) => Err(Error::Timeout),
		}
	}

	fn shutdown(&mut self) {
		let _ = self.command_tx.send(InternalMessage::Close);
		if let Some(thread) = self.thread.take() {
			let _ = thread.join();
		}
	}
}

/// Fixed-size pool of persistent workers with bounded overflow.
///
/// Idle handles circulate through an MPMC queue; a checkout blocks until
/// one frees up or the caller's timeout expires. When every persistent
/// worker is busy, up to `max_overflow` transient workers are created;
/// those are torn down again at check-in.
pub(crate) struct Pool {
	config: Config,
	idle_tx: Sender<WorkerHandle>,
	idle_rx: Receiver<WorkerHandle>,
	overflow: AtomicUsize,
}

impl Pool {
	pub fn new(config: Config) -> Self {
		let size = config.pool_size.max(1);
		let (idle_tx, idle_rx) = bounded(size);
		for _ in 0..size {
			let _ = idle_tx
				.send(WorkerHandle::spawn(config.clone(), false));
		}
		Self {
			config,
			idle_tx,
			idle_rx,
			overflow: AtomicUsize::new(0),
		}
	}

	pub fn checkout(&self, timeout: Duration) -> Result<WorkerHandle> {
		if let Ok(worker) = self.idle_rx.try_recv() {
			return Ok(worker);
		}

		let grew = self
			.overflow
			.fetch_update(
				Ordering::SeqCst,
				Ordering::SeqCst,
				|n| {
					(n < self.config.max_overflow)
						.then_some(n + 1)
				},
			)
			.is_ok();
		if grew {
			return Ok(WorkerHandle::spawn(
				self.config.clone(),
				true,
			));
		}

		self.idle_rx
			.recv_timeout(timeout)
			.map_err(|_| Error::PoolTimeout)
	}

	pub fn checkin(&self, mut worker: WorkerHandle) {
		if worker.transient {
			self.overflow.fetch_sub(1, Ordering::SeqCst);
			worker.shutdown();
		} else {
			let _ = self.idle_tx.send(worker);
		}
	}

	/// Shut down every idle worker. Workers still checked out are shut
	/// down when their handle is checked back in to a closed pool.
	pub fn close(&self) {
		while let Ok(mut worker) = self.idle_rx.try_recv() {
			worker.shutdown();
		}
	}
}
