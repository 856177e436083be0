//! Infrastructure layer providing external service integrations.
//!
//! This module contains the configuration loader, logging setup, the
//! request-node gateway client, the local key wallet, and file and
//! clipboard output.

pub mod clipboard;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod persistence;
pub mod wallet;

pub use clipboard::*;
pub use config::*;
pub use gateway::*;
pub use logging::*;
pub use persistence::*;
pub use wallet::*;
