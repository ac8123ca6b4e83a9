//! Credential identity for sessions.

use std::fmt;

/// Identity of one credential pair: the platform application id plus the
/// phone number as supplied at login.
///
/// Renders as `"{api_id}:{phone_number}"`; the rendered form keys the
/// persisted session file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
	api_id: i32,
	phone_number: String,
}

impl SessionKey {
	pub fn new(api_id: i32, phone_number: impl Into<String>) -> Self {
		Self { api_id, phone_number: phone_number.into() }
	}

	/// Application id half of the credential.
	pub fn api_id(&self) -> i32 {
		self.api_id
	}

	/// Phone number half of the credential, unnormalized.
	pub fn phone_number(&self) -> &str {
		&self.phone_number
	}
}

impl fmt::Display for SessionKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.api_id, self.phone_number)
	}
}
