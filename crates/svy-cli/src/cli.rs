//! CLI argument definitions for the survey analytics engine.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use crate::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "svy",
    version,
    about = "Survey analytics engine - weighted distributions, cross-tabs, and tests",
    long_about = "Analyze survey microdata with per-respondent weights.\n\n\
                  Computes weighted distributions, weighted cross-tabulations,\n\
                  chi-square tests of independence with Cramér's V, and\n\
                  design-effect-adjusted confidence intervals."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List every coded variable and battery block in the schema.
    Variables(SchemaArgs),

    /// Dataset KPIs and the weighted demographic profile.
    Overview(DataArgs),

    /// Weighted percentage distribution for one variable.
    Distribution(DistributionArgs),

    /// Per-item weighted distributions for a battery block.
    Battery(BatteryArgs),

    /// Weighted cross-tabulation of a question by a demographic.
    Crosstab(CrosstabArgs),

    /// Chi-square test of independence (unweighted counts).
    Test(TestArgs),

    /// Weighted proportions with 95% confidence intervals.
    Ci(CiArgs),

    /// Chi-square scan across the schema's question × demographic plan.
    Scan(DataArgs),
}

#[derive(Parser)]
pub struct SchemaArgs {
    /// Variable schema TOML (default: the embedded ATP W152 schema).
    #[arg(long = "schema", value_name = "TOML")]
    pub schema: Option<PathBuf>,
}

#[derive(Parser)]
pub struct DataArgs {
    /// Path to the respondent-level CSV file.
    #[arg(long = "data", value_name = "CSV")]
    pub data: PathBuf,

    #[command(flatten)]
    pub schema: SchemaArgs,
}

#[derive(Parser)]
pub struct DistributionArgs {
    /// Variable column name (e.g. AI_HEARD_W152).
    #[arg(value_name = "VARIABLE")]
    pub variable: String,

    #[command(flatten)]
    pub data: DataArgs,

    /// Keep refused answers as a category instead of excluding them.
    #[arg(long = "include-refused")]
    pub include_refused: bool,
}

#[derive(Parser)]
pub struct BatteryArgs {
    /// Battery key (e.g. ai-concerns); see `svy variables`.
    #[arg(value_name = "BATTERY")]
    pub key: String,

    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Parser)]
pub struct CrosstabArgs {
    /// Question column name.
    #[arg(value_name = "QUESTION")]
    pub question: String,

    /// Demographic column name.
    #[arg(value_name = "DEMOGRAPHIC")]
    pub demographic: String,

    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Parser)]
pub struct TestArgs {
    /// Question column name.
    #[arg(value_name = "QUESTION")]
    pub question: String,

    /// Demographic column name.
    #[arg(value_name = "DEMOGRAPHIC")]
    pub demographic: String,

    #[command(flatten)]
    pub data: DataArgs,

    /// Also print the expected frequency table.
    #[arg(long = "expected")]
    pub expected: bool,
}

#[derive(Parser)]
pub struct CiArgs {
    /// Variable column name.
    #[arg(value_name = "VARIABLE")]
    pub variable: String,

    #[command(flatten)]
    pub data: DataArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Build logging configuration from CLI flags with consistent precedence.
pub fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_log_level_overrides_verbosity() {
        let cli = Cli::parse_from([
            "svy",
            "--log-level",
            "trace",
            "-q",
            "variables",
        ]);
        let config = log_config_from_cli(&cli);
        assert_eq!(config.level_filter, LevelFilter::TRACE);
        assert!(!config.use_env_filter);
    }

    #[test]
    fn default_flags_defer_to_env_filter() {
        let cli = Cli::parse_from(["svy", "variables"]);
        let config = log_config_from_cli(&cli);
        assert!(config.use_env_filter);
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn log_file_disables_auto_ansi() {
        let cli = Cli::parse_from(["svy", "--log-file", "/tmp/svy.log", "variables"]);
        let config = log_config_from_cli(&cli);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/svy.log")));
        assert!(!config.with_ansi);
    }

    #[test]
    fn json_format_selected() {
        let cli = Cli::parse_from(["svy", "--log-format", "json", "variables"]);
        let config = log_config_from_cli(&cli);
        assert_eq!(config.format, LogFormat::Json);
    }
}
