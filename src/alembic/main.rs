//! # Alembic CLI
//!
//! The binary is intentionally thin: the CLI lives in `cli/`, and this file
//! only invokes `cli::run()` and handles process termination. Everything the
//! CLI calls goes through [`alembic::api::AlchemyApi`], which never prints
//! and never exits.
//!
//! Logging goes to stderr through `tracing-subscriber`; set `ALEMBIC_LOG`
//! (e.g. `ALEMBIC_LOG=alembic=debug`) or pass `-v`.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
