//! Authorization phases reported by the engine.

use serde::{Deserialize, Serialize};

/// One `authorizationState*` object, keyed by its `@type` tag.
///
/// Payload fields (code hints, password hints, terms of service) are not
/// modeled; the session layer reacts to the phase alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum AuthorizationState {
	#[serde(rename = "authorizationStateWaitTdlibParameters")]
	WaitTdlibParameters,
	#[serde(rename = "authorizationStateWaitEncryptionKey")]
	WaitEncryptionKey,
	#[serde(rename = "authorizationStateWaitPhoneNumber")]
	WaitPhoneNumber,
	#[serde(rename = "authorizationStateWaitCode")]
	WaitCode,
	#[serde(rename = "authorizationStateWaitOtherDeviceConfirmation")]
	WaitOtherDeviceConfirmation,
	#[serde(rename = "authorizationStateWaitRegistration")]
	WaitRegistration,
	#[serde(rename = "authorizationStateWaitPassword")]
	WaitPassword,
	#[serde(rename = "authorizationStateReady")]
	Ready,
	#[serde(rename = "authorizationStateLoggingOut")]
	LoggingOut,
	#[serde(rename = "authorizationStateClosing")]
	Closing,
	#[serde(rename = "authorizationStateClosed")]
	Closed,
	/// Fallback for `authorizationState*` tags this build does not know.
	#[serde(other)]
	Unknown,
}
