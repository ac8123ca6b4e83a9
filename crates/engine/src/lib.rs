//! Engine lifecycle, client-handle contracts, and library discovery.
//!
//! The native engine stays behind the `TdEngine`/`TdClient` traits: session
//! logic upstream drives those and never links tdjson itself. This crate
//! also resolves where the tdjson library lives on the host and ships
//! scripted doubles for exercising flows without a native build.

pub mod client;
pub mod error;
pub mod locator;
pub mod testing;

pub use client::{TdClient, TdEngine, UpdateStream};
pub use error::{Error, Result};
