//! Live sessions indexed by credential.

use std::collections::HashMap;
use std::sync::Arc;

use tdmux_engine::TdClient;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::auth::{AuthState, Transition, transition};
use crate::error::{Error, Result};
use crate::key::SessionKey;

/// How a live session came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
	/// Fresh client, no usable persisted record.
	Fresh,
	/// Client recreated on top of a previously authenticated credential.
	Restored,
}

/// Point-in-time view of one live session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
	/// Application id half of the credential.
	pub api_id: i32,
	/// Phone number half of the credential.
	pub phone_number: String,
	/// Phase the session was in when the snapshot was taken.
	pub auth_state: AuthState,
}

/// One live session. Exclusive owner of its client handle and of the pump
/// task applying the client's notifications.
pub struct Session {
	key: SessionKey,
	client: Arc<dyn TdClient>,
	auth_state: AuthState,
	source: SessionSource,
	pump: Option<JoinHandle<()>>,
}

impl Session {
	pub(crate) fn new(key: SessionKey, client: Arc<dyn TdClient>, source: SessionSource) -> Self {
		Self { key, client, auth_state: AuthState::NoConnection, source, pump: None }
	}

	/// Credential this session belongs to.
	pub fn key(&self) -> &SessionKey {
		&self.key
	}

	/// Phase last reported by the pump. `NoConnection` until the first
	/// notification lands.
	pub fn auth_state(&self) -> AuthState {
		self.auth_state
	}

	/// How the session came to exist.
	pub fn source(&self) -> SessionSource {
		self.source
	}

	pub(crate) fn client(&self) -> Arc<dyn TdClient> {
		self.client.clone()
	}

	pub(crate) fn info(&self) -> SessionInfo {
		SessionInfo {
			api_id: self.key.api_id(),
			phone_number: self.key.phone_number().to_string(),
			auth_state: self.auth_state,
		}
	}

	/// Stops the pump and shuts the client down. Client errors are logged;
	/// teardown proceeds regardless.
	pub(crate) async fn shutdown(self) {
		if let Some(pump) = self.pump {
			pump.abort();
		}
		if let Err(err) = self.client.close().await {
			warn!(target = "tdmux.session", key = %self.key, error = %err, "client shutdown reported an error");
		}
	}

	/// Stops the pump without touching the client, for sessions the
	/// engine already tore down on its own.
	pub(crate) fn abandon(self) {
		if let Some(pump) = self.pump {
			pump.abort();
		}
	}
}

/// Map of live sessions, one per credential.
///
/// All mutation happens through the orchestrator while it holds the
/// registry lock; the pump writes phases through [`Registry::apply_update`]
/// and nothing else writes them.
#[derive(Default)]
pub struct Registry {
	sessions: HashMap<SessionKey, Session>,
}

impl Registry {
	/// Looks up the session for `key`.
	pub fn get(&self, key: &SessionKey) -> Option<&Session> {
		self.sessions.get(key)
	}

	/// Looks up the session for `key` or reports the missing-session
	/// error callers surface to users.
	pub fn require(&self, key: &SessionKey) -> Result<&Session> {
		self.sessions.get(key).ok_or_else(|| Error::NoSession { key: key.clone() })
	}

	/// Inserts a session, returning any displaced one for teardown.
	pub fn insert(&mut self, session: Session) -> Option<Session> {
		self.sessions.insert(session.key.clone(), session)
	}

	/// Hands the pump task handle to `key`'s session.
	pub fn attach_pump(&mut self, key: &SessionKey, pump: JoinHandle<()>) {
		if let Some(session) = self.sessions.get_mut(key) {
			session.pump = Some(pump);
		}
	}

	/// Removes and returns the session for `key`.
	pub fn remove(&mut self, key: &SessionKey) -> Option<Session> {
		self.sessions.remove(key)
	}

	/// Applies an engine-reported phase to `key`'s session, removing the
	/// session when the phase is terminal.
	///
	/// Returns `None` when no session exists anymore.
	pub fn apply_update(&mut self, key: &SessionKey, next: AuthState) -> Option<Transition> {
		let session = self.sessions.get_mut(key)?;
		let outcome = transition(session.auth_state, next);
		match outcome {
			Transition::Ignored => {}
			Transition::BecameClosed => {
				// Dropping the session detaches its pump handle; the pump
				// is the caller and winds down on its own.
				self.sessions.remove(key);
			}
			Transition::Applied | Transition::BecameReady => session.auth_state = next,
		}
		Some(outcome)
	}

	/// Snapshot of every live session, in no particular order.
	pub fn snapshot(&self) -> Vec<SessionInfo> {
		self.sessions.values().map(Session::info).collect()
	}
}

#[cfg(test)]
mod tests {
	use tdmux_engine::TdEngine;
	use tdmux_engine::testing::ScriptedEngine;
	use tdmux_protocol::ClientConfig;

	use super::*;

	async fn session(key: &SessionKey) -> Session {
		let engine = ScriptedEngine::new();
		let client = engine
			.create_client(ClientConfig {
				api_id: key.api_id(),
				api_hash: "hash".into(),
				database_directory: "/tmp/db".into(),
				files_directory: "/tmp/files".into(),
			})
			.await
			.unwrap();
		Session::new(key.clone(), client, SessionSource::Fresh)
	}

	#[tokio::test]
	async fn missing_sessions_surface_the_login_hint() {
		let registry = Registry::default();
		let err = registry.require(&SessionKey::new(1, "+15550100")).err().unwrap();
		assert!(err.is_no_session());
		assert!(err.to_string().contains("Begin a phone login"));
	}

	#[tokio::test]
	async fn updates_advance_the_phase() {
		let key = SessionKey::new(1, "+15550100");
		let mut registry = Registry::default();
		registry.insert(session(&key).await);

		assert_eq!(registry.apply_update(&key, AuthState::WaitPhoneNumber), Some(Transition::Applied));
		assert_eq!(registry.get(&key).unwrap().auth_state(), AuthState::WaitPhoneNumber);

		assert_eq!(registry.apply_update(&key, AuthState::Ready), Some(Transition::BecameReady));
		assert_eq!(registry.get(&key).unwrap().auth_state(), AuthState::Ready);
	}

	#[tokio::test]
	async fn terminal_updates_evict_the_session() {
		let key = SessionKey::new(1, "+15550100");
		let mut registry = Registry::default();
		registry.insert(session(&key).await);

		assert_eq!(registry.apply_update(&key, AuthState::Closed), Some(Transition::BecameClosed));
		assert!(registry.get(&key).is_none());
		assert_eq!(registry.apply_update(&key, AuthState::Ready), None);
	}

	#[tokio::test]
	async fn snapshots_carry_credential_and_phase() {
		let key = SessionKey::new(94575, "+1 555 0100");
		let mut registry = Registry::default();
		registry.insert(session(&key).await);
		registry.apply_update(&key, AuthState::WaitCode);

		let infos = registry.snapshot();
		assert_eq!(infos.len(), 1);
		assert_eq!(infos[0].api_id, 94575);
		assert_eq!(infos[0].phone_number, "+1 555 0100");
		assert_eq!(infos[0].auth_state, AuthState::WaitCode);
	}
}
