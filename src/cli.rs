use std::{
    fmt::{self, Write},
    path::PathBuf,
};

mod activity;
mod delete;
mod destinations;
mod edit;
mod init;
mod list;
mod new;
mod show;
mod terminal;

use chrono::{NaiveDate, NaiveTime};
use clap::ArgAction;
use tripplan::Config;
use uuid::Uuid;

/// Parse a calendar date given as `YYYY-MM-DD`.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

/// Parse a time of day given as `HH:MM` or `HH:MM:SS`.
fn parse_time(s: &str) -> Result<NaiveTime, String> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| format!("invalid time '{s}' (expected HH:MM): {e}"))
}

/// The first block of a UUID, enough to refer to it on the command line.
fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// Renders a `chrono` formatted value, falling back to `fallback` if the
/// configured format string is invalid.
fn render(formatted: impl fmt::Display, fallback: impl fmt::Display) -> String {
    let mut out = String::new();
    match write!(out, "{formatted}") {
        Ok(()) => out,
        Err(_) => fallback.to_string(),
    }
}

/// Rejects trips shorter than the configured minimum number of nights.
fn check_trip_length(config: &Config, start: NaiveDate, end: NaiveDate) -> anyhow::Result<()> {
    let nights = (end - start).num_days();
    let min_nights = i64::from(config.min_nights());
    if nights < min_nights {
        anyhow::bail!(
            "the trip must end at least {min_nights} night(s) after it starts ({start} to {end} is \
             {nights})"
        );
    }
    Ok(())
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the trips directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::List(list::Command::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new trips directory
    Init(init::Command),

    /// Plan a new trip
    New(new::Command),

    /// Change a trip's destination, dates or budget
    ///
    /// Activities are kept, even if they fall outside the new dates.
    Edit(edit::Command),

    /// Delete a trip and its activities
    Delete(delete::Command),

    /// List trips, soonest first (default)
    List(list::Command),

    /// Show a trip's day-by-day agenda
    Show(show::Command),

    /// List popular destinations
    Destinations(destinations::Command),

    /// Add, edit or remove activities
    Activity(activity::Command),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(&root)?,
            Self::New(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Delete(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Destinations(command) => command.run()?,
            Self::Activity(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use test_case::test_case;

    use super::*;

    #[test_case("2025-06-01", Some((2025, 6, 1)); "iso date")]
    #[test_case(" 2025-12-31 ", Some((2025, 12, 31)); "surrounding whitespace")]
    #[test_case("2025-02-30", None; "impossible day")]
    #[test_case("06/01/2025", None; "wrong format")]
    fn parses_dates(input: &str, expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(parse_date(input).ok(), expected);
    }

    #[test_case("08:30", Some((8, 30, 0)); "hours and minutes")]
    #[test_case("23:59:59", Some((23, 59, 59)); "with seconds")]
    #[test_case("25:00", None; "out of range")]
    #[test_case("noon", None; "words")]
    fn parses_times(input: &str, expected: Option<(u32, u32, u32)>) {
        let expected = expected.map(|(h, m, s)| NaiveTime::from_hms_opt(h, m, s).unwrap());
        assert_eq!(parse_time(input).ok(), expected);
    }

    #[test]
    fn short_id_is_first_eight_hex_digits() {
        let id = Uuid::parse_str("6f1c2a4e-8d3b-4b1e-9a55-0d1f3c2b7e10").unwrap();
        assert_eq!(short_id(id), "6f1c2a4e");
    }

    #[test]
    fn render_falls_back_on_invalid_format() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(render(date.format("%b %-d, %Y"), date), "Jun 1, 2025");
        assert_eq!(render(date.format("%Q"), date), "2025-06-01");
    }

    #[test]
    fn trip_length_respects_min_nights() {
        let mut config = Config::default();
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        assert!(check_trip_length(&config, start, start).is_err());
        assert!(check_trip_length(&config, start, start.succ_opt().unwrap()).is_ok());

        config.set_min_nights(0);
        assert!(check_trip_length(&config, start, start).is_ok());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_activity_add() {
        let cli = Cli::try_parse_from([
            "trip", "activity", "add", "paris", "--day", "2025-06-01", "--time", "09:00",
            "--name", "Louvre",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Activity(_))));
    }
}
