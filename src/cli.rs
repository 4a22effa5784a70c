use anyhow::Result;
use clap::{builder::PossibleValuesParser, value_parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Clone)]
pub struct AppArgs {
    pub config_file: String,
    pub config_test: bool,
    pub log_level: String,
}

fn command() -> clap::Command {
    clap::Command::new("streamkit-rs")
        .version(crate::VERSION)
        .about("Copy bytes between configured endpoints")
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .help("Config filename")
                .default_value("config.yaml")
                .value_parser(value_parser!(String))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("log-level")
                .short('l')
                .long("log")
                .help("Set log level")
                .value_parser(PossibleValuesParser::new([
                    "erro", "warn", "info", "debug", "trace",
                ]))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("config-check")
                .short('t')
                .long("test")
                .help("Load and check config file then exits")
                .action(clap::ArgAction::SetTrue),
        )
}

fn args_from(matches: &clap::ArgMatches) -> AppArgs {
    let config_file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.yaml")
        .to_string();
    let config_test = matches.get_flag("config-check");
    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info")
        .to_string();
    AppArgs {
        config_file,
        config_test,
        log_level,
    }
}

pub fn parse_args() -> Result<AppArgs> {
    let args = args_from(&command().get_matches());
    init_logging(&args.log_level)?;
    Ok(args)
}

// "erro" is accepted on the command line for symmetry with the other
// four-letter levels; tracing only knows "error".
fn level_directive(log_level: &str) -> &str {
    match log_level {
        "erro" => "error",
        other => other,
    }
}

pub fn init_logging(log_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(level_directive(log_level).parse()?)
                .from_env()?,
        )
        .init();
    Ok(())
}
