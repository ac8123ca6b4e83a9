//! Multi-tenant session management for TDLib clients.
//!
//! One process serves many credential pairs (application id plus phone
//! number). Each pair owns at most one live client; [`SessionManager`]
//! creates, authenticates, restores, and tears these down, while an
//! advisory store remembers which credentials were authenticated so a
//! later process can pick them back up.
//!
//! The native engine stays behind `tdmux_engine::TdEngine`; nothing here
//! links tdjson directly, and the whole login flow can be exercised
//! against the scripted doubles in `tdmux_engine::testing`.

pub mod auth;
pub mod error;
pub mod factory;
pub mod key;
pub mod manager;
pub mod paths;
pub mod registry;
pub mod store;

pub use auth::{AuthState, Transition};
pub use error::{Error, Result};
pub use factory::ClientFactory;
pub use key::SessionKey;
pub use manager::{LoginOutcome, ManagerConfig, SessionManager};
pub use paths::StorageLayout;
pub use registry::{Session, SessionInfo, SessionSource};
pub use store::{SessionRecord, SessionStore};
