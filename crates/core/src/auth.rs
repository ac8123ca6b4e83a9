//! Authorization lifecycle of one session.

use serde::{Deserialize, Serialize};
use tdmux_protocol::AuthorizationState;

/// Authorization phase of a session as seen by callers.
///
/// `NoConnection` is synthetic: it is reported for credentials without a
/// live session (and for sessions that have not received their first
/// notification yet) and never arrives from the engine. Every other
/// variant mirrors one engine authorization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthState {
	NoConnection,
	WaitTdlibParams,
	WaitEncryptionKey,
	WaitPhoneNumber,
	WaitCode,
	WaitDeviceConfirmation,
	WaitRegistration,
	WaitPassword,
	Ready,
	LoggingOut,
	Closing,
	Closed,
	/// The engine reported a state this build does not recognize.
	Unknown,
}

impl AuthState {
	/// Maps an engine authorization state onto the session-level phase.
	///
	/// Unrecognized engine states land on `Unknown` so a newer engine can
	/// never put a session into a silently-invented phase.
	pub fn from_wire(state: AuthorizationState) -> Self {
		match state {
			AuthorizationState::WaitTdlibParameters => AuthState::WaitTdlibParams,
			AuthorizationState::WaitEncryptionKey => AuthState::WaitEncryptionKey,
			AuthorizationState::WaitPhoneNumber => AuthState::WaitPhoneNumber,
			AuthorizationState::WaitCode => AuthState::WaitCode,
			AuthorizationState::WaitOtherDeviceConfirmation => AuthState::WaitDeviceConfirmation,
			AuthorizationState::WaitRegistration => AuthState::WaitRegistration,
			AuthorizationState::WaitPassword => AuthState::WaitPassword,
			AuthorizationState::Ready => AuthState::Ready,
			AuthorizationState::LoggingOut => AuthState::LoggingOut,
			AuthorizationState::Closing => AuthState::Closing,
			AuthorizationState::Closed => AuthState::Closed,
			AuthorizationState::Unknown => AuthState::Unknown,
		}
	}

	/// Whether a session in this phase accepts a phone-number submission.
	pub fn accepts_phone_number(self) -> bool {
		self == AuthState::WaitPhoneNumber
	}

	/// Whether this phase ends the session's lifecycle.
	pub fn is_terminal(self) -> bool {
		self == AuthState::Closed
	}
}

/// Outcome of applying one engine notification to a session's phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
	/// Phase recorded; nothing else to do.
	Applied,
	/// Phase entered `Ready` from elsewhere; the credential is worth
	/// persisting.
	BecameReady,
	/// Phase entered `Closed`; the session is finished.
	BecameClosed,
	/// Phase is already terminal; the notification changes nothing.
	Ignored,
}

/// Classifies a phase change. `Closed` is terminal and `Ready` is
/// edge-triggered: repeating the current `Ready` phase is a plain
/// `Applied`, so one authentication persists exactly once.
pub fn transition(prev: AuthState, next: AuthState) -> Transition {
	if prev.is_terminal() {
		return Transition::Ignored;
	}
	if next == AuthState::Ready && prev != AuthState::Ready {
		return Transition::BecameReady;
	}
	if next == AuthState::Closed {
		return Transition::BecameClosed;
	}
	Transition::Applied
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wire_states_map_one_to_one() {
		assert_eq!(AuthState::from_wire(AuthorizationState::WaitPhoneNumber), AuthState::WaitPhoneNumber);
		assert_eq!(AuthState::from_wire(AuthorizationState::WaitCode), AuthState::WaitCode);
		assert_eq!(AuthState::from_wire(AuthorizationState::WaitPassword), AuthState::WaitPassword);
		assert_eq!(AuthState::from_wire(AuthorizationState::Ready), AuthState::Ready);
		assert_eq!(AuthState::from_wire(AuthorizationState::Closed), AuthState::Closed);
	}

	#[test]
	fn unrecognized_wire_states_stay_unknown() {
		let state = AuthState::from_wire(AuthorizationState::Unknown);
		assert_eq!(state, AuthState::Unknown);
		assert!(!state.accepts_phone_number());
	}

	#[test]
	fn persisted_names_are_screaming_snake() {
		assert_eq!(serde_json::to_value(AuthState::Ready).unwrap(), "READY");
		assert_eq!(serde_json::to_value(AuthState::NoConnection).unwrap(), "NO_CONNECTION");
		assert_eq!(serde_json::to_value(AuthState::WaitTdlibParams).unwrap(), "WAIT_TDLIB_PARAMS");
	}

	#[test]
	fn ready_is_edge_triggered() {
		assert_eq!(transition(AuthState::WaitPassword, AuthState::Ready), Transition::BecameReady);
		assert_eq!(transition(AuthState::Ready, AuthState::Ready), Transition::Applied);
	}

	#[test]
	fn closed_is_terminal() {
		assert_eq!(transition(AuthState::Closing, AuthState::Closed), Transition::BecameClosed);
		assert_eq!(transition(AuthState::Closed, AuthState::WaitPhoneNumber), Transition::Ignored);
		assert_eq!(transition(AuthState::Closed, AuthState::Ready), Transition::Ignored);
	}

	#[test]
	fn ordinary_progress_is_applied() {
		assert_eq!(transition(AuthState::NoConnection, AuthState::WaitTdlibParams), Transition::Applied);
		assert_eq!(transition(AuthState::WaitPhoneNumber, AuthState::WaitCode), Transition::Applied);
		assert_eq!(transition(AuthState::Ready, AuthState::LoggingOut), Transition::Applied);
	}
}
