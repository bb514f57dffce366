//! # Liftlog
//!
//! A workout-logging server, usable both as a standalone binary and as a
//! library. Callers authenticate with bearer tokens; every workout, linked
//! exercise, and set is reachable only through the owning user's identity.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! liftlog = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use liftlog::server::{AppState, create_router};
//! use liftlog::server::cache::ViewCache;
//! use liftlog::store::SqliteStore;
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/liftlog.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState {
//!     store: Arc::new(store),
//!     views: ViewCache::new(),
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the CLI entry point. Disable with
//!   `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
