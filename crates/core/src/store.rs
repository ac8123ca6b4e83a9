//! Durable record of authenticated sessions.
//!
//! The store remembers which credentials reached `Ready` so a later process
//! can offer restoration instead of a fresh login. It is advisory: read and
//! write failures are logged and absorbed, and losing the file costs
//! nothing but the restore shortcut.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::AuthState;
use crate::key::SessionKey;

/// One persisted session entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
	/// Application id half of the credential.
	pub application_id: i32,
	/// Phone number half of the credential.
	pub phone_number: String,
	/// Phase the session was in when recorded. Only `Ready` is written.
	pub auth_state: AuthState,
	/// Unix epoch milliseconds of the last save that touched this entry.
	pub last_used: u64,
}

/// Advisory persistence for authenticated sessions.
///
/// The file is a JSON map from rendered session keys to [`SessionRecord`]s.
/// It is read at most once per process; a missing or unreadable file comes
/// up empty. One process is assumed to own the file at a time.
pub struct SessionStore {
	path: PathBuf,
	state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
	loaded: bool,
	records: BTreeMap<String, SessionRecord>,
}

impl SessionStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), state: Mutex::new(StoreState::default()) }
	}

	/// Path of the persisted session file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Reads the store file exactly once per process. Later calls return
	/// without touching the disk.
	pub async fn ensure_loaded(&self) {
		let mut state = self.state.lock().await;
		if state.loaded {
			return;
		}
		state.loaded = true;

		let content = match fs::read_to_string(&self.path).await {
			Ok(content) => content,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
			Err(err) => {
				warn!(target = "tdmux.store", path = %self.path.display(), error = %err, "session store unreadable, starting empty");
				return;
			}
		};

		match serde_json::from_str::<BTreeMap<String, SessionRecord>>(&content) {
			Ok(records) => {
				debug!(target = "tdmux.store", path = %self.path.display(), count = records.len(), "loaded session store");
				state.records = records;
			}
			Err(err) => {
				warn!(target = "tdmux.store", path = %self.path.display(), error = %err, "session store malformed, starting empty");
			}
		}
	}

	/// Looks up the persisted record for `key`.
	pub async fn get(&self, key: &SessionKey) -> Option<SessionRecord> {
		self.ensure_loaded().await;
		self.state.lock().await.records.get(&key.to_string()).cloned()
	}

	/// Records `key` as authenticated and rewrites the file. The write is
	/// awaited; failures are logged and absorbed.
	pub async fn record_ready(&self, key: &SessionKey) {
		self.ensure_loaded().await;
		let mut state = self.state.lock().await;
		state.records.insert(
			key.to_string(),
			SessionRecord {
				application_id: key.api_id(),
				phone_number: key.phone_number().to_string(),
				auth_state: AuthState::Ready,
				last_used: now_ms(),
			},
		);
		self.write(&state.records).await;
	}

	/// Drops the record for `key` and rewrites the file. Removing an
	/// absent key changes nothing on disk.
	pub async fn remove(&self, key: &SessionKey) {
		self.ensure_loaded().await;
		let mut state = self.state.lock().await;
		if state.records.remove(&key.to_string()).is_none() {
			return;
		}
		self.write(&state.records).await;
	}

	async fn write(&self, records: &BTreeMap<String, SessionRecord>) {
		if let Some(parent) = self.path.parent() {
			if let Err(err) = fs::create_dir_all(parent).await {
				warn!(target = "tdmux.store", path = %self.path.display(), error = %err, "failed to create session store directory");
				return;
			}
		}
		let content = match serde_json::to_string_pretty(records) {
			Ok(content) => content,
			Err(err) => {
				warn!(target = "tdmux.store", path = %self.path.display(), error = %err, "failed to encode session store");
				return;
			}
		};
		if let Err(err) = fs::write(&self.path, content).await {
			warn!(target = "tdmux.store", path = %self.path.display(), error = %err, "failed to write session store");
			return;
		}
		debug!(target = "tdmux.store", path = %self.path.display(), count = records.len(), "session store written");
	}
}

/// Current Unix timestamp in milliseconds.
fn now_ms() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.unwrap_or_default()
		.as_millis() as u64
}
