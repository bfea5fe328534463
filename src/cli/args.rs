// CLI argument definitions using Clap

use crate::config::{Config, OutputConfig};
use crate::state::DisplayOptions;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Log format types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    JUnit,
}

/// Declarative test runner for Crossplane compositions
#[derive(Parser, Debug)]
#[command(name = "xrtestify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Test Crossplane compositions with simple *_xrtest.yaml files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // Flatten RunArgs to support implicit run command at top-level.
    // This allows `xrtestify tests/` to work as expected.
    #[command(flatten)]
    pub run_args: RunArgs,

    /// Enable verbose output (=== RUN lines, passing cases, debug logs)
    #[arg(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Show current configuration and exit
    #[arg(long, default_value_t = false)]
    pub config: bool,

    /// Create default configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub init_config: Option<PathBuf>,

    /// Install shell completion (bash, zsh, fish, elvish, powershell)
    #[arg(long, value_name = "SHELL_TYPE", value_parser = ["bash", "zsh", "fish", "elvish", "powershell"])]
    pub completion: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run tests (default)
    Run(RunArgs),

    /// List test files and the tests they define
    List(ListArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Path to test file or directory to list
    #[arg(required = false)]
    pub path: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Path to test file or directory to execute
    // Optional so it does not clash with subcommand names at top level;
    // emptiness is checked by the caller.
    #[arg(required = false)]
    pub test_paths: Vec<PathBuf>,

    /// Crossplane CLI binary (overrides config and XRTESTIFY_CROSSPLANE)
    #[arg(long, value_name = "BINARY")]
    pub crossplane: Option<String>,

    /// Sort test files by path or name
    #[arg(short = 's', long, default_value = "path", value_parser = ["path", "name"])]
    pub sort: String,

    /// List rendered resources for passing renders
    #[arg(long, default_value_t = false)]
    pub show_render: bool,

    /// Show validator output for passing validations
    #[arg(long, default_value_t = false)]
    pub show_validate: bool,

    /// List every hook, not only failing ones
    #[arg(long, default_value_t = false)]
    pub show_hooks: bool,

    /// List every assertion (with --verbose), not only failing ones
    #[arg(long, default_value_t = false)]
    pub show_assertions: bool,

    /// Generate test reports in specified format
    #[arg(long, value_name = "FORMAT", value_parser = ["json", "junit"])]
    pub log_format: Option<String>,

    /// Output file for test reports (use with --log-format)
    #[arg(long, value_name = "OUTPUT_FILE")]
    pub log_output: Option<PathBuf>,
}

impl Cli {
    /// Helper to get effective RunArgs
    pub fn get_run_args(&self) -> &RunArgs {
        match &self.command {
            Some(Commands::Run(args)) => args,
            _ => &self.run_args,
        }
    }

    /// Get log format
    pub fn log_format_mode(&self) -> Option<LogFormat> {
        self.get_run_args()
            .log_format
            .as_deref()
            .and_then(|fmt| match fmt {
                "junit" => Some(LogFormat::JUnit),
                "json" => Some(LogFormat::Json),
                _ => None,
            })
    }

    /// Flags switch a display option on; the config file supplies the rest
    pub fn display_options(&self, output: OutputConfig) -> DisplayOptions {
        let args = self.get_run_args();
        DisplayOptions {
            verbose: self.verbose || output.verbose,
            show_render: args.show_render || output.show_render,
            show_validate: args.show_validate || output.show_validate,
            show_hooks: args.show_hooks || output.show_hooks,
            show_assertions: args.show_assertions || output.show_assertions,
        }
    }

    /// Crossplane binary: flag, then config file, then env/default
    pub fn crossplane(&self, config: Option<&Config>) -> String {
        self.get_run_args()
            .crossplane
            .clone()
            .or_else(|| config.map(|cfg| cfg.general.crossplane.clone()))
            .unwrap_or_else(crate::config::default_crossplane)
    }
}

fn is_json_format(value: &str) -> bool {
    value.eq_ignore_ascii_case("json")
}

impl ListArgs {
    pub fn is_json(&self) -> bool {
        is_json_format(&self.format)
    }
}
