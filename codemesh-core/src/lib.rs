//! # codemesh-core
//!
//! Core library for codemesh - a terminal dashboard client for a remote
//! code-analysis agent service.
//!
//! This library provides:
//! - Domain types for analysis requests, structured replies, and events
//! - The response normalizer (fenced-JSON extraction with narrative fallback)
//! - An HTTP client for the analysis service
//! - The polling event-sync loop
//! - The dashboard state container mutated through named transitions
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Two independent flows write into one [`DashboardState`]:
//! - **Analysis flow:** prompt -> [`MeshClient::analyze`] -> [`reply::interpret`]
//!   -> narrative text and/or structured panel updates
//! - **Sync flow:** [`sync::spawn_event_sync`] -> replace-wholesale event feed
//!
//! Neither flow may panic or propagate an unhandled fault: every remote
//! failure degrades to a visible-but-non-blocking UI state.

// Re-export commonly used items at the crate root
pub use client::MeshClient;
pub use config::Config;
pub use error::{Error, Result};
pub use state::DashboardState;
pub use types::*;

// Public modules
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod reply;
pub mod state;
pub mod sync;
pub mod types;
