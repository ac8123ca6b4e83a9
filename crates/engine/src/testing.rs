//! Scripted engine and client doubles.
//!
//! Session flows are exercised against these instead of a native tdjson
//! build: tests push authorization states through a scripted client and
//! assert on the calls the session layer made.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tdmux_protocol::{AuthorizationState, ClientConfig, Update, request};
use tokio::sync::mpsc;

use crate::client::{TdClient, TdEngine, UpdateStream};
use crate::error::{Error, Result};

/// One recorded call on the scripted engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
	/// `configure` ran with the given library path.
	Configure { library: PathBuf },
	/// `create_client` ran with the given parameter block.
	CreateClient { config: ClientConfig },
}

#[derive(Default)]
struct EngineState {
	configured: bool,
	calls: Vec<EngineCall>,
	clients: Vec<Arc<ScriptedClient>>,
	fail_configure: Option<String>,
	fail_creates: VecDeque<String>,
}

/// Engine double that mints [`ScriptedClient`]s and records every call.
#[derive(Default)]
pub struct ScriptedEngine {
	state: Mutex<EngineState>,
}

impl ScriptedEngine {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// All calls recorded so far, in order.
	pub fn calls(&self) -> Vec<EngineCall> {
		self.state.lock().calls.clone()
	}

	/// Number of `create_client` calls recorded so far.
	pub fn create_count(&self) -> usize {
		self.state
			.lock()
			.calls
			.iter()
			.filter(|call| matches!(call, EngineCall::CreateClient { .. }))
			.count()
	}

	/// Clients minted so far, in creation order.
	pub fn clients(&self) -> Vec<Arc<ScriptedClient>> {
		self.state.lock().clients.clone()
	}

	/// The most recently minted client.
	pub fn last_client(&self) -> Option<Arc<ScriptedClient>> {
		self.state.lock().clients.last().cloned()
	}

	/// Makes the next `configure` call fail with the given message.
	pub fn fail_configure(&self, message: &str) {
		self.state.lock().fail_configure = Some(message.to_string());
	}

	/// Queues a failure for the next `create_client` call.
	pub fn fail_next_create(&self, message: &str) {
		self.state.lock().fail_creates.push_back(message.to_string());
	}
}

#[async_trait]
impl TdEngine for ScriptedEngine {
	async fn configure(&self, library: &Path) -> Result<()> {
		let mut state = self.state.lock();
		state.calls.push(EngineCall::Configure { library: library.to_path_buf() });
		if let Some(message) = state.fail_configure.take() {
			return Err(Error::Configure(message));
		}
		if state.configured {
			return Err(Error::AlreadyConfigured);
		}
		state.configured = true;
		Ok(())
	}

	async fn create_client(&self, config: ClientConfig) -> Result<Arc<dyn TdClient>> {
		let mut state = self.state.lock();
		state.calls.push(EngineCall::CreateClient { config: config.clone() });
		if let Some(message) = state.fail_creates.pop_front() {
			return Err(Error::ClientCreate(message));
		}
		let client = Arc::new(ScriptedClient::new(config));
		state.clients.push(client.clone());
		Ok(client)
	}
}

struct ClientState {
	invocations: Vec<Value>,
	responses: VecDeque<Result<Value>>,
	stream: Option<mpsc::UnboundedReceiver<Update>>,
	fail_close: Option<String>,
	closed: bool,
}

/// Client double fed by tests.
///
/// Updates pushed through [`ScriptedClient::push_state`] flow into the
/// stream handed to the session layer. Invocations are recorded and
/// answered from the scripted response queue, or with a plain `ok` object
/// when the queue is empty.
pub struct ScriptedClient {
	config: ClientConfig,
	updates_tx: mpsc::UnboundedSender<Update>,
	state: Mutex<ClientState>,
}

impl ScriptedClient {
	fn new(config: ClientConfig) -> Self {
		let (updates_tx, rx) = mpsc::unbounded_channel();
		Self {
			config,
			updates_tx,
			state: Mutex::new(ClientState {
				invocations: Vec::new(),
				responses: VecDeque::new(),
				stream: Some(rx),
				fail_close: None,
				closed: false,
			}),
		}
	}

	/// Parameter block this client was created with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Pushes an authorization-state notification into the update stream.
	///
	/// Returns `false` when the consumer is gone.
	pub fn push_state(&self, state: AuthorizationState) -> bool {
		self.push_update(Update::AuthorizationState { authorization_state: state })
	}

	/// Pushes a raw update into the stream.
	pub fn push_update(&self, update: Update) -> bool {
		self.updates_tx.send(update).is_ok()
	}

	/// Queues the response for the next unanswered invocation.
	pub fn queue_response(&self, response: Result<Value>) {
		self.state.lock().responses.push_back(response);
	}

	/// Makes the next `close` call fail with the given message.
	pub fn fail_close(&self, message: &str) {
		self.state.lock().fail_close = Some(message.to_string());
	}

	/// Requests recorded so far, in order.
	pub fn invocations(&self) -> Vec<Value> {
		self.state.lock().invocations.clone()
	}

	/// `@type` tags of the recorded requests, in order.
	pub fn invoked_types(&self) -> Vec<String> {
		self.state
			.lock()
			.invocations
			.iter()
			.filter_map(|request| request::type_of(request).map(str::to_string))
			.collect()
	}

	/// Whether `close` ran on this client.
	pub fn was_closed(&self) -> bool {
		self.state.lock().closed
	}
}

#[async_trait]
impl TdClient for ScriptedClient {
	async fn invoke(&self, request: Value) -> Result<Value> {
		let mut state = self.state.lock();
		state.invocations.push(request);
		match state.responses.pop_front() {
			Some(response) => response,
			None => Ok(json!({ "@type": "ok" })),
		}
	}

	fn updates(&self) -> UpdateStream {
		match self.state.lock().stream.take() {
			Some(rx) => UpdateStream::new(rx),
			None => UpdateStream::exhausted(),
		}
	}

	async fn close(&self) -> Result<()> {
		let mut state = self.state.lock();
		state.closed = true;
		if let Some(message) = state.fail_close.take() {
			return Err(Error::Invoke { code: 500, message });
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config() -> ClientConfig {
		ClientConfig {
			api_id: 94575,
			api_hash: "a3406de8d171bb422bb6ddf3bbd800e2".into(),
			database_directory: "/tmp/94575_15550100/_td_database".into(),
			files_directory: "/tmp/94575_15550100/_td_files".into(),
		}
	}

	#[tokio::test]
	async fn repeated_configure_reports_already_configured() {
		let engine = ScriptedEngine::new();
		engine.configure(Path::new("libtdjson.so")).await.unwrap();
		let err = engine.configure(Path::new("libtdjson.so")).await.unwrap_err();
		assert!(matches!(err, Error::AlreadyConfigured));
	}

	#[tokio::test]
	async fn pushed_states_reach_the_single_consumer() {
		let engine = ScriptedEngine::new();
		let client = engine.create_client(config()).await.unwrap();
		let mut updates = client.updates();

		let scripted = engine.last_client().unwrap();
		assert!(scripted.push_state(AuthorizationState::WaitPhoneNumber));

		let update = updates.next().await.unwrap();
		assert_eq!(
			update,
			Update::AuthorizationState { authorization_state: AuthorizationState::WaitPhoneNumber }
		);

		// The stream was already taken; a second take yields nothing.
		let mut second = client.updates();
		scripted.push_state(AuthorizationState::Ready);
		assert_eq!(updates.next().await.unwrap(), Update::AuthorizationState { authorization_state: AuthorizationState::Ready });
		drop(updates);
		assert!(second.next().await.is_none());
	}

	#[tokio::test]
	async fn invocations_answer_from_the_queue_then_ok() {
		let engine = ScriptedEngine::new();
		let client = engine.create_client(config()).await.unwrap();
		let scripted = engine.last_client().unwrap();
		scripted.queue_response(Err(Error::Invoke { code: 400, message: "PHONE_NUMBER_INVALID".into() }));

		let err = client.invoke(request::set_authentication_phone_number("+1")).await.unwrap_err();
		assert!(matches!(err, Error::Invoke { code: 400, .. }));

		let ok = client.invoke(request::check_authentication_code("12345")).await.unwrap();
		assert_eq!(request::type_of(&ok), Some("ok"));
		assert_eq!(scripted.invoked_types(), vec!["setAuthenticationPhoneNumber", "checkAuthenticationCode"]);
	}
}
