//! Error types for session management.

use thiserror::Error;

use crate::key::SessionKey;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the session layer.
#[derive(Debug, Error)]
pub enum Error {
	/// An operation needed a live session that does not exist.
	#[error("No session for {key}. Begin a phone login first.")]
	NoSession {
		/// Credential the operation addressed.
		key: SessionKey,
	},

	/// Engine-level failure.
	#[error(transparent)]
	Engine(#[from] tdmux_engine::Error),
}

impl Error {
	/// Returns `true` when the error names a missing session.
	pub fn is_no_session(&self) -> bool {
		matches!(self, Error::NoSession { .. })
	}
}
