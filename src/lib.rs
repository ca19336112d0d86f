//! Conference leaderboard with SQLite-backed slots, CSV/PDF exports and PNG
//! share cards.
//!
//! # Examples
//!
//! In-memory usage with [`core::store::EntryStore`]:
//! ```
//! use confboard::{
//!     core::store::EntryStore,
//!     entry::EntryForm,
//!     rank::{format_time, rank},
//! };
//!
//! let mut store = EntryStore::new();
//! store.add(&EntryForm::new("Alice", "MIT", "500", "10")).expect("add");
//! store.add(&EntryForm::new("Bob", "CMU", "900", "20")).expect("add");
//!
//! let ranked = rank(store.list());
//! assert_eq!(ranked[0].entry.name, "Bob");
//! assert_eq!(format_time(ranked[0].entry.time), "00:00:20");
//! ```
//!
//! Runtime usage with SQLite slots:
//! ```no_run
//! use confboard::{
//!     entry::EntryForm,
//!     persist::sqlite::SqliteSlots,
//!     runtime::handle::{RuntimeConfig, open_leaderboard},
//!     views::PublicView,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let slots = SqliteSlots::open("confboard.db").expect("open sqlite");
//! let handle = open_leaderboard(Box::new(slots), RuntimeConfig::default()).expect("load");
//! handle
//!     .add(EntryForm::new("Alice", "MIT", "500", "10"))
//!     .await
//!     .expect("add");
//! let page = PublicView::new(handle.clone()).snapshot("mit").await.expect("snapshot");
//! assert_eq!(page.rows.len(), 1);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![warn(missing_docs)]

/// Admin password hashing and session lifecycle.
pub mod auth;
/// Share-card rendering.
pub mod card;
/// TOML configuration.
pub mod config;
/// Core in-memory entry store and index helpers.
pub mod core;
/// Entry records, input forms and patches.
pub mod entry;
/// CSV and PDF exports.
pub mod export;
/// Mutation records emitted by the store.
pub mod op;
/// Slot persistence abstraction with SQLite and in-memory backends.
pub mod persist;
/// Ranking, search and time formatting.
pub mod rank;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Conference display settings.
pub mod settings;
/// Social share text and links.
pub mod share;
/// Shared primitive types.
pub mod types;
/// Public and admin views.
pub mod views;
