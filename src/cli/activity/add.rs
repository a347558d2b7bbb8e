use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use tracing::instrument;
use tripplan::{Directory, ScheduledActivity, domain::text::required};

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The trip: id, id prefix or destination
    trip: String,

    /// The day of the activity (YYYY-MM-DD)
    #[arg(long, value_parser = crate::cli::parse_date)]
    day: NaiveDate,

    /// The time of the activity (HH:MM)
    #[arg(long, value_parser = crate::cli::parse_time)]
    time: NaiveTime,

    /// Short title
    #[arg(long, short)]
    name: String,

    #[command(flatten)]
    details: super::Details,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root).load_all()?;
        let id = directory.trips().resolve(&self.trip)?;
        let Some(trip) = directory.trips_mut().get_mut(id) else {
            anyhow::bail!("Trip {} not found", self.trip);
        };

        if self.day < trip.start() || self.day > trip.end() {
            eprintln!(
                "{}",
                format!(
                    "⚠️  {} is outside the trip ({} to {})",
                    self.day,
                    trip.start(),
                    trip.end()
                )
                .warning()
            );
        }

        let mut activity =
            ScheduledActivity::new(self.day.and_time(self.time), required("name", &self.name)?);
        self.details.apply(&mut activity);

        let activity_id = activity.id;
        let label = super::flight_summary(&activity)
            .map_or_else(|| activity.name.as_str().to_string(), |flight| {
                format!("{} ({flight})", activity.name.as_str())
            });
        trip.add_activity(self.day, activity)?;
        directory.save_trip(id)?;

        println!(
            "{}",
            format!(
                "Added {label} on {} as {}",
                self.day,
                crate::cli::short_id(activity_id)
            )
            .success()
        );
        Ok(())
    }
}
