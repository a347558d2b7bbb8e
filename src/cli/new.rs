use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::instrument;
use tripplan::{
    Budget, Directory, TripPlan,
    domain::{destination, text::required},
};

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Where the trip goes. Prompts with popular destinations if omitted.
    #[arg(long, short)]
    destination: Option<String>,

    /// First day of the trip (YYYY-MM-DD)
    #[arg(long, value_parser = super::parse_date)]
    start: NaiveDate,

    /// Last day of the trip (YYYY-MM-DD)
    #[arg(long, value_parser = super::parse_date)]
    end: NaiveDate,

    /// Total budget, e.g. 1500 or 1,250.50
    #[arg(long, default_value = "0")]
    budget: Budget,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root).load_all()?;
        super::check_trip_length(directory.config(), self.start, self.end)?;

        let destination = match self.destination {
            Some(destination) => destination,
            None => prompt_destination()?,
        };
        let destination = required("destination", &destination)?;

        let trip = TripPlan::new(destination, self.start, self.end, self.budget);
        let summary = format!(
            "Planned {} ({} days) as {}",
            trip.destination(),
            trip.day_count(),
            super::short_id(trip.id())
        );
        directory.add_trip(trip)?;

        println!("{}", summary.success());
        Ok(())
    }
}

/// Lets the user pick a popular destination or type their own.
fn prompt_destination() -> anyhow::Result<String> {
    const OTHER: &str = "Somewhere else…";

    let mut choices: Vec<&str> = destination::POPULAR.iter().map(|d| d.name).collect();
    choices.push(OTHER);

    let selected = dialoguer::Select::new()
        .with_prompt("Where to?")
        .items(choices.as_slice())
        .default(0)
        .interact()?;

    match choices.get(selected) {
        Some(&name) if name != OTHER => Ok(name.to_string()),
        _ => Ok(dialoguer::Input::<String>::new()
            .with_prompt("Destination")
            .interact_text()?),
    }
}
