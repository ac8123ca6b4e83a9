//! Constructors for the requests the login flow sends.
//!
//! Requests are plain tagged JSON objects; response correlation via the
//! `@extra` field is the engine layer's concern.

use serde_json::{Value, json};

/// `setAuthenticationPhoneNumber`: submits the phone number for the pending
/// login attempt.
pub fn set_authentication_phone_number(phone_number: &str) -> Value {
	json!({
		"@type": "setAuthenticationPhoneNumber",
		"phone_number": phone_number,
	})
}

/// `checkAuthenticationCode`: submits the one-time code sent to the user.
pub fn check_authentication_code(code: &str) -> Value {
	json!({
		"@type": "checkAuthenticationCode",
		"code": code,
	})
}

/// `checkAuthenticationPassword`: submits the two-step-verification
/// password.
pub fn check_authentication_password(password: &str) -> Value {
	json!({
		"@type": "checkAuthenticationPassword",
		"password": password,
	})
}

/// `close`: asks the client to flush state and shut down.
pub fn close() -> Value {
	json!({ "@type": "close" })
}

/// Returns the `@type` tag of a request or response object.
pub fn type_of(value: &Value) -> Option<&str> {
	value.get("@type").and_then(Value::as_str)
}
