//! Contracts for the native engine and the client handles it produces.
//!
//! The engine is an external collaborator: it performs one-time native
//! setup and mints per-credential client handles. A handle accepts JSON
//! requests and pushes an ordered stream of updates. Session logic upstream
//! drives these traits and never sees what is underneath them.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tdmux_protocol::{ClientConfig, Update};
use tokio::sync::mpsc;

use crate::error::Result;

/// Single-consumer stream of client updates.
pub struct UpdateStream {
	rx: mpsc::UnboundedReceiver<Update>,
}

impl UpdateStream {
	/// Wraps a receiver produced by an engine implementation.
	pub fn new(rx: mpsc::UnboundedReceiver<Update>) -> Self {
		Self { rx }
	}

	/// A stream that yields nothing, handed out when the live stream was
	/// already taken.
	pub fn exhausted() -> Self {
		let (_tx, rx) = mpsc::unbounded_channel();
		Self { rx }
	}

	/// Receives the next update, or `None` once the client is gone.
	pub async fn next(&mut self) -> Option<Update> {
		self.rx.recv().await
	}
}

/// Handle to one live client instance.
#[async_trait]
pub trait TdClient: Send + Sync {
	/// Sends one request and resolves with the engine's response.
	async fn invoke(&self, request: Value) -> Result<Value>;

	/// Takes the client's update stream.
	///
	/// Updates arrive in emission order to exactly one consumer. A second
	/// call returns an exhausted stream.
	fn updates(&self) -> UpdateStream;

	/// Shuts the underlying client down.
	async fn close(&self) -> Result<()>;
}

/// The native engine: one-time setup plus client-handle creation.
#[async_trait]
pub trait TdEngine: Send + Sync {
	/// Runs the engine's one-time native setup against the given tdjson
	/// library. Repeat calls report `Error::AlreadyConfigured`.
	async fn configure(&self, library: &Path) -> Result<()>;

	/// Creates a client bound to the directories in `config`.
	async fn create_client(&self, config: ClientConfig) -> Result<Arc<dyn TdClient>>;
}
