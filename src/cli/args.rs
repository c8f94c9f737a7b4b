//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// envgraph - Development environment build graph compiler
///
/// Compiles an environment spec (editor plugins, notebook and IDE services,
/// language runtime) into a layered build plan.
#[derive(Parser, Debug)]
#[command(name = "envgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ENVGRAPH_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile an environment spec into a build plan
    Compile(CompileArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Manage the plugin cache
    Cache(CacheArgs),
}

/// Arguments for the compile command
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Environment spec file
    #[arg(short, long, default_value = "envgraph.toml")]
    pub spec: PathBuf,

    /// Working directory for services (overrides the spec)
    #[arg(short, long)]
    pub working_dir: Option<String>,

    /// Only use plugins already in the cache
    #[arg(long)]
    pub offline: bool,

    /// Plugins fetched at once (overrides config)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached plugins
    List {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the cache directory
    Path,

    /// Remove every cached plugin
    Clear,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_compile_defaults() {
        let cli = Cli::parse_from(["envgraph", "compile"]);
        match cli.command {
            Commands::Compile(args) => {
                assert_eq!(args.spec, PathBuf::from("envgraph.toml"));
                assert_eq!(args.format, OutputFormat::Text);
                assert!(!args.offline);
                assert!(args.jobs.is_none());
                assert!(args.working_dir.is_none());
            }
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn cli_parses_compile_flags() {
        let cli = Cli::parse_from([
            "envgraph",
            "compile",
            "--spec",
            "env/dev.toml",
            "--format",
            "json",
            "--offline",
            "-j",
            "4",
            "--working-dir",
            "/work",
        ]);
        match cli.command {
            Commands::Compile(args) => {
                assert_eq!(args.spec, PathBuf::from("env/dev.toml"));
                assert_eq!(args.format, OutputFormat::Json);
                assert!(args.offline);
                assert_eq!(args.jobs, Some(4));
                assert_eq!(args.working_dir.as_deref(), Some("/work"));
            }
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn cli_parses_config_init_force() {
        let cli = Cli::parse_from(["envgraph", "config", "init", "--force"]);
        match cli.command {
            Commands::Config(args) => {
                assert!(matches!(args.action, Some(ConfigAction::Init { force: true })))
            }
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn cli_parses_cache_clear() {
        let cli = Cli::parse_from(["envgraph", "cache", "clear"]);
        match cli.command {
            Commands::Cache(args) => assert!(matches!(args.action, CacheAction::Clear)),
            _ => panic!("expected Cache command"),
        }
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["envgraph", "cache", "path"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["envgraph", "-vv", "cache", "path"]);
        assert_eq!(cli.verbose, 2);
    }
}
