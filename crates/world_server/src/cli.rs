//! Command-line interface handling for the world server.
//!
//! Arguments are parsed with `clap`'s builder API; every option overrides
//! the matching setting of the configuration file.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use world_index::Point4D;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the region file
    pub regions_file: Option<PathBuf>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Run the full hierarchy conflict check after loading
    pub check: bool,
    /// Write the loaded regions back out to this file
    pub resave: Option<PathBuf>,
    /// Points whose region should be reported
    pub probes: Vec<Point4D>,
}

/// Parses `X,Y[,PLANE]`; probes always stand at z 0.
fn parse_probe(value: &str) -> Result<Point4D, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let number = |text: &str| {
        text.parse::<i32>()
            .map_err(|_| format!("'{text}' is not a number"))
    };
    match parts.as_slice() {
        [x, y] => Ok(Point4D::new(number(x)?, number(y)?, 0, 0)),
        [x, y, plane] => {
            let plane = plane
                .parse::<u8>()
                .map_err(|_| format!("'{plane}' is not a map plane"))?;
            Ok(Point4D::new(number(x)?, number(y)?, 0, plane))
        }
        _ => Err(format!("'{value}' is not a probe point (expected X,Y[,PLANE])")),
    }
}

impl CliArgs {
    fn command() -> Command {
        Command::new("World Server")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Loads a world's region hierarchy, checks it and answers point queries")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("world.toml"),
            )
            .arg(
                Arg::new("regions")
                    .short('r')
                    .long("regions")
                    .value_name("FILE")
                    .help("Region file to load"),
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
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("check")
                    .long("check")
                    .help("Check every region against its parent and same-depth neighbours")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("resave")
                    .long("resave")
                    .value_name("FILE")
                    .help("Save the loaded regions to FILE"),
            )
            .arg(
                Arg::new("probe")
                    .long("probe")
                    .value_name("X,Y[,PLANE]")
                    .help("Report the region at a point (repeatable)")
                    .value_parser(parse_probe)
                    .action(ArgAction::Append),
            )
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("world.toml")),
            regions_file: matches.get_one::<String>("regions").map(PathBuf::from),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            check: matches.get_flag("check"),
            resave: matches.get_one::<String>("resave").map(PathBuf::from),
            probes: matches
                .get_many::<Point4D>("probe")
                .map(|points| points.copied().collect())
                .unwrap_or_default(),
        }
    }

    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    /// Parses an explicit argument list; the first item is the program name.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::command()
            .try_get_matches_from(args)
            .map(|matches| Self::from_matches(&matches))
    }
}
