//! Raritan PDU plugin.
//!
//! Reads the apparent and active power of the PDU with a single JSON-RPC
//! `performBulk` call, and exposes them as metrics through [`RaritanPlugin`].

pub mod client;
pub mod config;
mod error;
mod plugin;
pub mod rpc;

pub use config::Config;
pub use error::{CallError, FailureKind};
pub use plugin::RaritanPlugin;
