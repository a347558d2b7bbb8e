use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use tracing::instrument;
use tripplan::{Directory, domain::text::required};

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The trip: id, id prefix or destination
    trip: String,

    /// The activity: id or id prefix (see `trip show --ids`)
    activity: String,

    /// Move the activity to this day (YYYY-MM-DD)
    #[arg(long, value_parser = crate::cli::parse_date)]
    day: Option<NaiveDate>,

    /// Change the time (HH:MM)
    #[arg(long, value_parser = crate::cli::parse_time)]
    time: Option<NaiveTime>,

    /// New title
    #[arg(long, short)]
    name: Option<String>,

    /// Remove the attached photo
    #[arg(long, conflicts_with = "photo")]
    remove_photo: bool,

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

        let activity_id = super::resolve_activity(trip, &self.activity)?;
        let Some(current) = trip.activity(activity_id) else {
            anyhow::bail!("Activity {} not found", self.activity);
        };

        let old_time = current.time;
        let mut updated = current.clone();
        let day = self.day.unwrap_or_else(|| old_time.date());
        updated.time = day.and_time(self.time.unwrap_or_else(|| old_time.time()));
        if let Some(name) = &self.name {
            updated.name = required("name", name)?;
        }
        if self.remove_photo {
            updated.set_photo(None);
        }
        self.details.apply(&mut updated);

        let moved = updated.day() != old_time.date();
        let name = updated.name.as_str().to_string();
        trip.relocate_activity(old_time, updated)?;
        directory.save_trip(id)?;

        let message = if moved {
            format!("Moved {name} to {day}")
        } else {
            format!("Updated {name}")
        };
        println!("{}", message.success());
        Ok(())
    }
}
