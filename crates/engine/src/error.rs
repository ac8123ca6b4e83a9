//! Error types for the engine layer.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the engine and its client handles.
#[derive(Debug, Error)]
pub enum Error {
	/// No prebuilt tdjson library exists for the host platform.
	#[error("No tdjson library for {os}/{arch}. Build TDLib from source (https://tdlib.github.io/td/#building) and set TDMUX_TDJSON to the result.")]
	UnsupportedPlatform {
		/// Operating system resolution ran on.
		os: &'static str,
		/// CPU architecture resolution ran on.
		arch: &'static str,
	},

	/// The engine's one-time setup already ran.
	#[error("Engine is already configured")]
	AlreadyConfigured,

	/// The engine's one-time setup failed.
	#[error("Engine configuration failed: {0}")]
	Configure(String),

	/// The engine could not produce a client handle.
	#[error("Client creation failed: {0}")]
	ClientCreate(String),

	/// The engine rejected a request.
	#[error("Request failed ({code}): {message}")]
	Invoke {
		/// Numeric error code reported by the engine.
		code: i64,
		/// Human-readable error message.
		message: String,
	},
}

impl Error {
	/// Converts an engine `error` response object into `Error::Invoke`.
	///
	/// Returns `None` when the value is not an error object.
	pub fn from_response(value: &serde_json::Value) -> Option<Self> {
		if value.get("@type").and_then(serde_json::Value::as_str) != Some("error") {
			return None;
		}
		let code = value.get("code").and_then(serde_json::Value::as_i64).unwrap_or(0);
		let message = value
			.get("message")
			.and_then(serde_json::Value::as_str)
			.unwrap_or("unknown engine error")
			.to_string();
		Some(Error::Invoke { code, message })
	}
}
