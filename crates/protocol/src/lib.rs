//! Wire types for the TDLib JSON interface.
//!
//! Everything the engine sends or accepts is a JSON object tagged with an
//! `@type` field. This crate models the slice of that surface the session
//! layer consumes: authorization-state notifications, the update envelope,
//! client creation parameters, and the login-flow request constructors.
//! Unrecognized tags deserialize into explicit `Unknown` variants instead of
//! failing the whole stream.

mod client;
pub mod request;
mod state;
mod update;

pub use client::ClientConfig;
pub use state::AuthorizationState;
pub use update::Update;
