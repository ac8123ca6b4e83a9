//! Client creation and one-time engine setup.

use std::sync::Arc;

use tdmux_engine::{TdClient, TdEngine, locator};
use tdmux_protocol::ClientConfig;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::key::SessionKey;
use crate::paths::StorageLayout;

/// Creates per-credential clients, running the engine's one-time native
/// setup before the first one.
///
/// The setup flag lives on the factory, not in process globals. An
/// `AlreadyConfigured` answer from the engine counts as success, so a
/// factory racing another factory (or an embedding application that set
/// the engine up itself) converges instead of failing.
pub struct ClientFactory {
	engine: Arc<dyn TdEngine>,
	layout: StorageLayout,
	configured: Mutex<bool>,
}

impl ClientFactory {
	pub fn new(engine: Arc<dyn TdEngine>, layout: StorageLayout) -> Self {
		Self { engine, layout, configured: Mutex::new(false) }
	}

	/// Storage layout clients are created under.
	pub fn layout(&self) -> &StorageLayout {
		&self.layout
	}

	/// Creates a client for `key`, configuring the engine first when
	/// needed. Engine failures propagate; nothing is retried here.
	pub async fn create(&self, key: &SessionKey, api_hash: &str) -> Result<Arc<dyn TdClient>> {
		self.ensure_configured().await?;

		let config = ClientConfig {
			api_id: key.api_id(),
			api_hash: api_hash.to_string(),
			database_directory: self.layout.database_dir(key),
			files_directory: self.layout.files_dir(key),
		};
		debug!(target = "tdmux.session", key = %key, database = %config.database_directory.display(), "creating client");
		let client = self.engine.create_client(config).await?;
		Ok(client)
	}

	/// Runs the engine's setup at most once per factory. Concurrent first
	/// creations serialize here so setup never runs twice.
	async fn ensure_configured(&self) -> Result<()> {
		let mut configured = self.configured.lock().await;
		if *configured {
			return Ok(());
		}

		let library = locator::resolve_library()?;
		match self.engine.configure(&library).await {
			Ok(()) => {}
			Err(tdmux_engine::Error::AlreadyConfigured) => {
				debug!(target = "tdmux.engine", "engine was already configured");
			}
			Err(err) => return Err(err.into()),
		}
		*configured = true;
		Ok(())
	}
}
