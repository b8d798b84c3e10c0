//! Command-line interface handling for the simulation host.

use crate::config::AppConfig;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
///
/// Every option except `config_path` overrides the matching setting from
/// the configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the plugin data directory
    pub data_dir: Option<PathBuf>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Optional override for the number of scripted demo players
    pub demo_players: Option<usize>,
}

fn command() -> Command {
    Command::new("TintHealth Server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Simulated game host for the TintHealth border plugin")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Directory plugins keep their data folders in"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("demo-players")
                .long("demo-players")
                .value_name("COUNT")
                .help("Spawn scripted players that take damage over time")
                .value_parser(clap::value_parser!(usize)),
        )
}

impl CliArgs {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Parses an explicit argument list.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        command()
            .try_get_matches_from(args)
            .map(|matches| Self::from_matches(&matches))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config.toml")),
            data_dir: matches.get_one::<String>("data-dir").map(PathBuf::from),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            demo_players: matches.get_one::<usize>("demo-players").copied(),
        }
    }

    /// Applies the overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(data_dir) = &self.data_dir {
            config.server.data_dir = data_dir.to_string_lossy().to_string();
        }

        if let Some(log_level) = &self.log_level {
            config.logging.level = log_level.clone();
        }

        if self.json_logs {
            config.logging.json_format = true;
        }

        if let Some(demo_players) = self.demo_players {
            config.simulation.demo_players = demo_players;
        }
    }
}
