//! # CLI Layer
//!
//! One possible client for the alembic library. This is the only place that
//! knows about terminal output, exit codes, and logging setup.
//!
//! - `setup.rs`: clap definitions, version string, tracing subscriber
//! - `commands.rs`: context wiring (paths, config, snapshot store) and dispatch
//! - `print.rs`: turns `CmdResult` values into colored terminal output
//!
//! Running `alembic` with no subcommand shows `info`.
//!
//! Items and properties are referenced by the number shown in `alembic items`
//! / `alembic properties`, by a range of numbers (`4-6`), or by name
//! (case-insensitive).

mod commands;
mod print;
mod setup;

pub use commands::run;
