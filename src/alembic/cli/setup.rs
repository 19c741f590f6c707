use alembic::config::Preset;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter (e.g. `alembic=debug`).
pub const LOG_ENV: &str = "ALEMBIC_LOG";

/// Environment variable overriding the config and data directories.
pub const HOME_ENV: &str = "ALEMBIC_HOME";

/// `0.3.0` for tagged releases, `0.3.0@abc1234 2024-01-15 14:30` otherwise.
static VERSION: LazyLock<String> = LazyLock::new(|| {
    let hash = env!("GIT_HASH");
    if env!("IS_RELEASE") == "true" || hash.is_empty() {
        env!("CARGO_PKG_VERSION").to_string()
    } else {
        format!(
            "{}@{} {}",
            env!("CARGO_PKG_VERSION"),
            hash,
            env!("GIT_COMMIT_DATE")
        )
    }
});

#[derive(Parser, Debug)]
#[command(name = "alembic", bin_name = "alembic", version = VERSION.as_str())]
#[command(about = "Find minimal ingredient combinations and the effects they produce", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding config.json (and snapshots by default)
    #[arg(long, global = true, value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Snapshot file to load and save, overriding the configured one
    #[arg(long, global = true, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute every recipe up to the size bound and save a snapshot
    #[command(display_order = 1)]
    Catalog {
        /// JSON file of item records (defaults to the configured source)
        #[arg(long, value_name = "FILE")]
        items: Option<PathBuf>,

        /// Largest combination to enumerate
        #[arg(long, value_name = "N")]
        max: Option<usize>,

        /// Save only the reachable property sets
        #[arg(long)]
        lite: bool,
    },

    /// Show recipes producing exactly the given properties
    #[command(alias = "r", display_order = 2)]
    Recipes {
        /// Properties, by listing number or name (e.g. 3 5-7 "Restore Health")
        #[arg(required = true, num_args = 1..)]
        properties: Vec<String>,

        /// Search for recipes not yet known
        #[arg(long)]
        research: bool,

        /// Show known recipes whose result includes the properties
        #[arg(long, conflicts_with = "research")]
        containing: bool,
    },

    /// List items, or mix the given ones
    #[command(alias = "i", display_order = 3)]
    Items {
        /// Items to mix, by listing number or name
        #[arg(num_args = 0..)]
        items: Vec<String>,
    },

    /// List properties, or explore the given ones
    #[command(alias = "p", display_order = 4)]
    Properties {
        /// Properties, by listing number or name
        #[arg(num_args = 0..)]
        properties: Vec<String>,
    },

    /// Summarize the catalog and known recipes
    #[command(display_order = 5)]
    Info,

    /// Get or set configuration
    #[command(display_order = 6)]
    Config {
        /// Configuration key (items-source, max-items, negative-properties, reveal-level, snapshot)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,

        /// Replace the configuration with a built-in preset
        #[arg(long, value_enum, conflicts_with_all = ["key", "value"])]
        preset: Option<Preset>,
    },
}

/// Installs the stderr subscriber. `ALEMBIC_LOG` wins over `--verbose`.
pub fn setup_tracing(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_recipes_with_ranges() {
        let cli = Cli::parse_from(["alembic", "recipes", "2-3", "Fortify Health", "--research"]);
        match cli.command {
            Some(Commands::Recipes {
                properties,
                research,
                containing,
            }) => {
                assert_eq!(properties, vec!["2-3", "Fortify Health"]);
                assert!(research);
                assert!(!containing);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn research_conflicts_with_containing() {
        assert!(Cli::try_parse_from(["alembic", "r", "X", "--research", "--containing"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["alembic", "info", "--snapshot", "/tmp/s.json.gz", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.snapshot, Some(PathBuf::from("/tmp/s.json.gz")));
    }

    #[test]
    fn parses_preset() {
        let cli = Cli::parse_from(["alembic", "config", "--preset", "skyrim"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                preset: Some(Preset::Skyrim),
                ..
            })
        ));
    }
}
