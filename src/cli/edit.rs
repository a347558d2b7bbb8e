use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::instrument;
use tripplan::{Budget, Directory, domain::text::required};

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The trip to edit: id, id prefix or destination
    trip: String,

    /// New destination
    #[arg(long, short)]
    destination: Option<String>,

    /// New first day (YYYY-MM-DD)
    #[arg(long, value_parser = super::parse_date)]
    start: Option<NaiveDate>,

    /// New last day (YYYY-MM-DD)
    #[arg(long, value_parser = super::parse_date)]
    end: Option<NaiveDate>,

    /// New total budget
    #[arg(long)]
    budget: Option<Budget>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root).load_all()?;
        let id = directory.trips().resolve(&self.trip)?;
        let config = directory.config().clone();

        let Some(trip) = directory.trips_mut().get_mut(id) else {
            anyhow::bail!("Trip {} not found", self.trip);
        };

        if self.destination.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.budget.is_none()
        {
            anyhow::bail!("Nothing to change; pass --destination, --start, --end or --budget");
        }

        if let Some(destination) = &self.destination {
            trip.set_destination(required("destination", destination)?);
        }
        if self.start.is_some() || self.end.is_some() {
            let start = self.start.unwrap_or_else(|| trip.start());
            let end = self.end.unwrap_or_else(|| trip.end());
            super::check_trip_length(&config, start, end)?;
            trip.set_dates(start, end);
        }
        if let Some(budget) = self.budget {
            trip.set_budget(budget);
        }

        let stray: Vec<_> = trip
            .out_of_range_agendas()
            .map(|agenda| super::render(agenda.date().format(config.date_format()), agenda.date()))
            .collect();
        let destination = trip.destination().to_string();

        directory.save_trip(id)?;

        println!("{}", format!("Updated the trip to {destination}").success());
        if !stray.is_empty() {
            eprintln!(
                "{}",
                format!(
                    "⚠️  Activities remain on days outside the trip: {}",
                    stray.join(", ")
                )
                .warning()
            );
        }
        Ok(())
    }
}
