//! # Alembic Architecture
//!
//! Alembic finds minimal recipes: sets of catalog items whose shared
//! properties combine into a result that no smaller subset reproduces. The
//! reference data is alchemy ingredients and their effects, but nothing in
//! the engine knows about games.
//!
//! It is a library that happens to have a CLI client.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (cli/, wired by main.rs)                               │
//! │  - Parses arguments, prints results, sets up logging        │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs) + Commands (commands/*.rs)                    │
//! │  - References → names, engine lifecycle, CmdResult values   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (model, catalog, combination, engine)                 │
//! │  - Items, mixing rules, the two canonical recipe maps       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                           │
//! │  - SnapshotStore trait: FileStore, InMemoryStore            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Ways to Find Recipes
//!
//! - **Eager**: [`engine::Engine::catalog_all`] mixes every subset of the
//!   catalog up to the size bound. Complete, and expensive for large
//!   catalogs.
//! - **Lazy**: [`engine::Engine::research_for_properties`] only mixes items
//!   carrying one of the requested properties, and remembers which targets
//!   it has already researched.
//!
//! Both feed the same maps, and for any researched target they agree.
//!
//! ## Module Overview
//!
//! - [`model`]: `Item`, `Property`, `Mastery`, raw `ItemRecord`s
//! - [`catalog`]: the item collection and its property index
//! - [`combination`]: mixing and validity
//! - [`engine`]: enumeration, research, and the canonical maps
//! - [`store`]: gzip JSON snapshots
//! - [`config`]: engine settings and presets
//! - [`selector`]: `3`, `2-4`, `Garlic` style references
//! - [`api`] / [`commands`]: the entry point for clients
//! - [`error`]: error types

pub mod api;
pub mod catalog;
pub mod combination;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod selector;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
