use std::{collections::BTreeSet, path::PathBuf};

use chrono::NaiveDate;
use tracing::instrument;
use tripplan::{ActivitySelection, Directory, domain::trips::resolve_id};

use crate::cli::terminal::Colorize;

/// Parse a 1-based position in a day's agenda.
fn parse_position(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("invalid position '{s}': positions start at 1")),
        Ok(position) => Ok(position),
    }
}

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The trip: id, id prefix or destination
    trip: String,

    /// The day to remove activities from (YYYY-MM-DD)
    #[arg(long, value_parser = crate::cli::parse_date)]
    day: NaiveDate,

    /// Positions in the day's agenda, counting from 1 (comma-separated)
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_position,
        required_unless_present = "activity",
        conflicts_with = "activity"
    )]
    position: Vec<usize>,

    /// Activity ids or id prefixes (comma-separated)
    #[arg(long, value_delimiter = ',')]
    activity: Vec<String>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root).load_all()?;
        let id = directory.trips().resolve(&self.trip)?;
        let Some(trip) = directory.trips_mut().get_mut(id) else {
            anyhow::bail!("Trip {} not found", self.trip);
        };

        let Some(agenda) = trip.agenda(self.day) else {
            anyhow::bail!("Nothing is planned on {}", self.day);
        };

        let selection = if self.activity.is_empty() {
            ActivitySelection::Positions(self.position.iter().map(|p| p - 1).collect())
        } else {
            let on_day: Vec<_> = agenda.activities().map(|activity| activity.id).collect();
            let ids = self
                .activity
                .iter()
                .map(|reference| resolve_id(reference, on_day.iter().copied()))
                .collect::<Result<BTreeSet<_>, _>>()?;
            ActivitySelection::Ids(ids)
        };

        let removed = trip.remove_activities(self.day, &selection);
        if removed.is_empty() {
            anyhow::bail!("No matching activities on {}", self.day);
        }
        directory.save_trip(id)?;

        for activity in &removed {
            println!("  • {}", activity.name.as_str());
        }
        println!(
            "{}",
            format!("Removed {} activities from {}", removed.len(), self.day).success()
        );
        Ok(())
    }
}
