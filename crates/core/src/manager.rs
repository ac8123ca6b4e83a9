//! Session orchestration across credentials.
//!
//! One `SessionManager` owns every live session in the process. Each
//! session pairs a client handle with a pump task that applies the
//! client's notification stream to the registry; the manager's operations
//! are thin orchestrations over the registry, the client factory, and the
//! advisory session store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tdmux_engine::{TdClient, TdEngine, UpdateStream};
use tdmux_protocol::{Update, request};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::auth::{AuthState, Transition};
use crate::error::{Error, Result};
use crate::factory::ClientFactory;
use crate::key::SessionKey;
use crate::paths::{StorageLayout, default_data_dir};
use crate::registry::{Registry, Session, SessionInfo, SessionSource};
use crate::store::SessionStore;

/// Configuration for a session manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
	/// Root directory for per-credential client state.
	pub data_dir: PathBuf,
	/// Path of the persisted session file.
	pub store_path: PathBuf,
	/// Fixed wait after attaching a session's pump, giving the engine time
	/// to surface its first authorization states before the login call
	/// returns. Nothing is awaited beyond the delay itself.
	pub settle_delay: Duration,
}

impl Default for ManagerConfig {
	fn default() -> Self {
		let data_dir = default_data_dir();
		let store_path = data_dir.join("sessions.json");
		Self { data_dir, store_path, settle_delay: Duration::from_millis(1000) }
	}
}

/// Result of [`SessionManager::begin_phone_login`].
#[derive(Debug, Clone)]
pub struct LoginOutcome {
	/// How the session came to exist. A reused live session reports
	/// whatever it reported when it was first created.
	pub source: SessionSource,
	/// Session view once the call returned.
	pub info: SessionInfo,
}

/// Orchestrates every live session in the process.
///
/// Cloning is cheap; clones share the registry, store, and factory.
#[derive(Clone)]
pub struct SessionManager {
	registry: Arc<Mutex<Registry>>,
	store: Arc<SessionStore>,
	factory: Arc<ClientFactory>,
	settle_delay: Duration,
}

impl SessionManager {
	pub fn new(engine: Arc<dyn TdEngine>, config: ManagerConfig) -> Self {
		let layout = StorageLayout::new(&config.data_dir);
		Self {
			registry: Arc::new(Mutex::new(Registry::default())),
			store: Arc::new(SessionStore::new(&config.store_path)),
			factory: Arc::new(ClientFactory::new(engine, layout)),
			settle_delay: config.settle_delay,
		}
	}

	/// Ensures a live session for `key` and reports how it came to exist.
	///
	/// An existing session is returned as-is. Otherwise a persisted record
	/// triggers a restoration attempt first; when restoring fails, one
	/// fresh creation follows and its errors propagate. New sessions
	/// return only after the settle window.
	pub async fn begin_phone_login(&self, key: &SessionKey, api_hash: &str) -> Result<LoginOutcome> {
		self.store.ensure_loaded().await;

		let source = {
			let mut registry = self.registry.lock().await;
			if let Some(session) = registry.get(key) {
				debug!(target = "tdmux.session", key = %key, state = ?session.auth_state(), "reusing live session");
				return Ok(LoginOutcome { source: session.source(), info: session.info() });
			}

			let (client, source) = self.create_or_restore(key, api_hash).await?;
			let updates = client.updates();
			if let Some(displaced) = registry.insert(Session::new(key.clone(), client, source)) {
				// Unreachable while creation happens under the registry
				// lock; tear the stray down if it ever shows up.
				warn!(target = "tdmux.session", key = %key, "displaced a live session during login");
				displaced.abandon();
			}
			let pump = tokio::spawn(run_pump(key.clone(), updates, self.registry.clone(), self.store.clone()));
			registry.attach_pump(key, pump);
			debug!(target = "tdmux.session", key = %key, source = ?source, "session attached");
			source
		};

		sleep(self.settle_delay).await;

		let info = self.lookup(key).await.unwrap_or_else(|| SessionInfo {
			api_id: key.api_id(),
			phone_number: key.phone_number().to_string(),
			auth_state: AuthState::NoConnection,
		});
		Ok(LoginOutcome { source, info })
	}

	/// Submits the phone number for `key`'s login, unless the session is
	/// not asking for one; the skipped case returns `Value::Null` without
	/// touching the client.
	pub async fn submit_phone_number(&self, key: &SessionKey, phone_number: &str) -> Result<Value> {
		let (client, state) = {
			let registry = self.registry.lock().await;
			let session = registry.require(key)?;
			(session.client(), session.auth_state())
		};

		if !state.accepts_phone_number() {
			debug!(target = "tdmux.auth", key = %key, state = ?state, "phone number not expected, skipping submission");
			return Ok(Value::Null);
		}

		let response = client.invoke(request::set_authentication_phone_number(phone_number)).await?;
		Ok(response)
	}

	/// Submits the one-time login code. The engine decides whether the
	/// current phase accepts it.
	pub async fn submit_code(&self, key: &SessionKey, code: &str) -> Result<Value> {
		let client = self.client_for(key).await?;
		let response = client.invoke(request::check_authentication_code(code)).await?;
		Ok(response)
	}

	/// Submits the two-step-verification password. The engine decides
	/// whether the current phase accepts it; an already-authenticated
	/// session gets its record refreshed afterwards.
	pub async fn submit_password(&self, key: &SessionKey, password: &str) -> Result<Value> {
		let client = self.client_for(key).await?;
		let response = client.invoke(request::check_authentication_password(password)).await?;
		self.persist_if_ready(key).await;
		Ok(response)
	}

	/// Closes `key`'s session: the pump stops, the client shuts down, and
	/// the persisted record is dropped.
	pub async fn close_session(&self, key: &SessionKey) -> Result<()> {
		let session = {
			let mut registry = self.registry.lock().await;
			registry.remove(key).ok_or_else(|| Error::NoSession { key: key.clone() })?
		};
		session.shutdown().await;
		self.store.remove(key).await;
		debug!(target = "tdmux.session", key = %key, "session closed");
		Ok(())
	}

	/// Deletes every local trace of `key`: closes the live session when
	/// one exists, then removes the credential's database and files
	/// directories. Cleanup is best-effort and never fails; the returned
	/// map says what happened to each directory.
	pub async fn delete_instance(&self, key: &SessionKey) -> HashMap<String, String> {
		let session = { self.registry.lock().await.remove(key) };
		match session {
			Some(session) => session.shutdown().await,
			None => debug!(target = "tdmux.session", key = %key, "no live session to close before delete"),
		}
		self.store.remove(key).await;

		let layout = self.factory.layout();
		let mut report = HashMap::new();
		report.insert("db_database".to_string(), remove_dir_report(&layout.database_dir(key)).await);
		report.insert("db_files".to_string(), remove_dir_report(&layout.files_dir(key)).await);
		report
	}

	/// Reports where `key`'s login stands. `NoConnection` when no live
	/// session exists. Never fails.
	pub async fn query_auth_state(&self, key: &SessionKey) -> AuthState {
		self.store.ensure_loaded().await;
		let registry = self.registry.lock().await;
		registry.get(key).map(|session| session.auth_state()).unwrap_or(AuthState::NoConnection)
	}

	/// Snapshot of every live session, in no particular order.
	pub async fn list_sessions(&self) -> Vec<SessionInfo> {
		self.registry.lock().await.snapshot()
	}

	/// Drops `key`'s session without driving the client's shutdown, for
	/// when the embedding service already knows the client is gone. Also
	/// drops the persisted record. Absent keys are a no-op.
	pub async fn mark_closed_externally(&self, key: &SessionKey) {
		let session = { self.registry.lock().await.remove(key) };
		match session {
			Some(session) => {
				session.abandon();
				debug!(target = "tdmux.session", key = %key, "session marked closed externally");
			}
			None => debug!(target = "tdmux.session", key = %key, "no live session to mark closed"),
		}
		self.store.remove(key).await;
	}

	/// Creates the client for a new session, preferring restoration when a
	/// persisted record exists. Restoration failures fall back to one
	/// fresh creation.
	async fn create_or_restore(&self, key: &SessionKey, api_hash: &str) -> Result<(Arc<dyn TdClient>, SessionSource)> {
		if self.store.get(key).await.is_some() {
			match self.factory.create(key, api_hash).await {
				Ok(client) => {
					debug!(target = "tdmux.session", key = %key, "restoring persisted session");
					return Ok((client, SessionSource::Restored));
				}
				Err(err) => {
					warn!(target = "tdmux.session", key = %key, error = %err, "restore failed, creating a fresh session");
				}
			}
		}
		let client = self.factory.create(key, api_hash).await?;
		Ok((client, SessionSource::Fresh))
	}

	async fn client_for(&self, key: &SessionKey) -> Result<Arc<dyn TdClient>> {
		let registry = self.registry.lock().await;
		Ok(registry.require(key)?.client())
	}

	async fn lookup(&self, key: &SessionKey) -> Option<SessionInfo> {
		self.registry.lock().await.get(key).map(Session::info)
	}

	async fn persist_if_ready(&self, key: &SessionKey) {
		let state = { self.registry.lock().await.get(key).map(|session| session.auth_state()) };
		if state == Some(AuthState::Ready) {
			self.store.record_ready(key).await;
		}
	}
}

/// Applies one session's notification stream to the registry.
///
/// The pump is the sole writer of its session's phase. A `Ready` edge
/// persists the credential; `Closed` evicts the session and ends the pump
/// with it.
async fn run_pump(key: SessionKey, mut updates: UpdateStream, registry: Arc<Mutex<Registry>>, store: Arc<SessionStore>) {
	while let Some(update) = updates.next().await {
		let Update::AuthorizationState { authorization_state } = update else {
			continue;
		};
		let next = AuthState::from_wire(authorization_state);
		if next == AuthState::Unknown {
			warn!(target = "tdmux.auth", key = %key, state = ?authorization_state, "unrecognized authorization state");
		}
		debug!(target = "tdmux.auth", key = %key, state = ?next, "authorization state changed");

		let applied = { registry.lock().await.apply_update(&key, next) };
		let Some(outcome) = applied else {
			// The session was removed from under the pump.
			break;
		};

		match outcome {
			Transition::BecameReady => {
				debug!(target = "tdmux.auth", key = %key, "session authenticated");
				store.record_ready(&key).await;
			}
			Transition::BecameClosed => {
				debug!(target = "tdmux.auth", key = %key, "session closed by the engine");
				store.remove(&key).await;
				break;
			}
			Transition::Applied | Transition::Ignored => {}
		}
	}
	debug!(target = "tdmux.auth", key = %key, "notification pump finished");
}

/// Removes one directory tree, reporting the outcome as text.
async fn remove_dir_report(path: &Path) -> String {
	match tokio::fs::remove_dir_all(path).await {
		Ok(()) => {
			debug!(target = "tdmux.session", path = %path.display(), "removed directory");
			format!("Removed {}", path.display())
		}
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => format!("Not found {}", path.display()),
		Err(err) => {
			warn!(target = "tdmux.session", path = %path.display(), error = %err, "failed to remove directory");
			format!("Failed to remove {}: {err}", path.display())
		}
	}
}
