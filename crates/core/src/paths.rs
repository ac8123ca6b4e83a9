//! On-disk layout for per-credential client state.

use std::env;
use std::path::PathBuf;

use crate::key::SessionKey;

/// Directory name for a client's protocol database.
const DATABASE_DIR: &str = "_td_database";
/// Directory name for a client's downloaded files.
const FILES_DIR: &str = "_td_files";

/// Derives per-credential directories under one data root.
///
/// Each credential owns `{root}/{api_id}_{digits}` where `digits` is the
/// phone number stripped to its digits. The application-id prefix keeps
/// two applications logging in the same phone number apart.
#[derive(Debug, Clone)]
pub struct StorageLayout {
	root: PathBuf,
}

impl StorageLayout {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// Credential directory for `key`.
	pub fn instance_dir(&self, key: &SessionKey) -> PathBuf {
		let digits: String = key.phone_number().chars().filter(char::is_ascii_digit).collect();
		self.root.join(format!("{}_{}", key.api_id(), digits))
	}

	/// Protocol database directory for `key`.
	pub fn database_dir(&self, key: &SessionKey) -> PathBuf {
		self.instance_dir(key).join(DATABASE_DIR)
	}

	/// Downloaded-files directory for `key`.
	pub fn files_dir(&self, key: &SessionKey) -> PathBuf {
		self.instance_dir(key).join(FILES_DIR)
	}
}

/// Default data root: `TDMUX_DATA_DIR`, else `$XDG_DATA_HOME/tdmux`, else
/// `~/.local/share/tdmux`, else `./tdmux`.
pub fn default_data_dir() -> PathBuf {
	if let Some(dir) = env::var_os("TDMUX_DATA_DIR") {
		return PathBuf::from(dir);
	}

	let data_home = env::var_os("XDG_DATA_HOME")
		.map(PathBuf::from)
		.or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
		.unwrap_or_else(|| PathBuf::from("."));

	data_home.join("tdmux")
}
