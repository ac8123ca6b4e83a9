//! Client creation parameters.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Parameter block for creating one client instance.
///
/// Field names follow the engine's camelCase creation API. The two
/// directories belong to exactly one credential; the session layer derives
/// them from its storage layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
	/// Application identifier issued by the platform.
	pub api_id: i32,
	/// Application secret issued alongside `api_id`.
	pub api_hash: String,
	/// Directory holding the client's protocol database.
	pub database_directory: PathBuf,
	/// Directory holding downloaded media and files.
	pub files_directory: PathBuf,
}
