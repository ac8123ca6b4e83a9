//! The engine's asynchronous notification envelope.

use serde::{Deserialize, Serialize};

use crate::AuthorizationState;

/// One update object from the engine's notification stream.
///
/// Only authorization-state changes are modeled. Everything else TDLib
/// pushes (chats, users, options, connection states) deserializes as
/// [`Update::Unknown`] and is ignored upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum Update {
	#[serde(rename = "updateAuthorizationState")]
	AuthorizationState { authorization_state: AuthorizationState },
	#[serde(other)]
	Unknown,
}
