use std::path::PathBuf;

use tracing::instrument;
use tripplan::{
    ActivityCategory, FlightDetails, ScheduledActivity, TripPlan,
    domain::{ImagePhase, ImageSlot, LocalImageSource, trips::resolve_id},
};
use uuid::Uuid;

use crate::cli::terminal::Colorize;

mod add;
mod edit;
mod remove;

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: ActivityCommand,
}

#[derive(Debug, clap::Parser)]
enum ActivityCommand {
    /// Schedule a new activity on a day
    Add(add::Command),

    /// Change an activity, moving it to another day if its date changes
    Edit(edit::Command),

    /// Remove activities from a day
    Remove(remove::Command),
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self.command {
            ActivityCommand::Add(add) => add.run(root),
            ActivityCommand::Edit(edit) => edit.run(root),
            ActivityCommand::Remove(remove) => remove.run(root),
        }
    }
}

/// Optional activity fields shared by `add` and `edit`.
#[derive(Debug, Default, clap::Args)]
struct Details {
    /// Free-text notes
    #[arg(long)]
    description: Option<String>,

    /// Category: car, entertainment, flight, food, hotel, train or misc
    #[arg(long, short)]
    category: Option<ActivityCategory>,

    /// A link, such as a booking page (pass an empty string to clear)
    #[arg(long)]
    url: Option<String>,

    /// Path of an image to attach
    #[arg(long, value_name = "PATH")]
    photo: Option<String>,

    /// Departure airport (makes this a flight)
    #[arg(long)]
    airport: Option<String>,

    /// Airline (makes this a flight)
    #[arg(long)]
    airline: Option<String>,

    /// Flight number (makes this a flight)
    #[arg(long = "flight", value_name = "NUMBER")]
    flight_number: Option<String>,

    /// Departure terminal (makes this a flight)
    #[arg(long)]
    terminal: Option<String>,
}

impl Details {
    /// Writes the given fields into `activity`, leaving the rest untouched.
    fn apply(self, activity: &mut ScheduledActivity) {
        if let Some(description) = self.description {
            activity.description = description;
        }
        if let Some(category) = self.category {
            activity.category = Some(category);
        }
        if let Some(url) = self.url {
            let url = url.trim();
            activity.url = (!url.is_empty()).then(|| url.to_string());
        }

        let flight_fields = [
            self.airport,
            self.airline,
            self.flight_number,
            self.terminal,
        ];
        if flight_fields.iter().any(Option::is_some) {
            let [airport, airline, flight_number, terminal] = flight_fields;
            let mut flight = activity.flight.take().unwrap_or_default();
            if let Some(airport) = airport {
                flight.airport = airport;
            }
            if let Some(airline) = airline {
                flight.airline = airline;
            }
            if let Some(flight_number) = flight_number {
                flight.flight_number = flight_number;
            }
            if let Some(terminal) = terminal {
                flight.terminal = terminal;
            }
            activity.flight = Some(flight);
            activity.category = Some(ActivityCategory::Flight);
        }

        if let Some(path) = self.photo {
            attach_photo(activity, path);
        }
    }
}

/// Loads the image at `path` into the activity's photo.
///
/// An image that cannot be loaded leaves the photo unchanged and prints a
/// warning.
fn attach_photo(activity: &mut ScheduledActivity, path: String) {
    let mut slot = ImageSlot::new(path);
    slot.resolve(&LocalImageSource::new());
    if let ImagePhase::Failed(reason) = slot.phase() {
        eprintln!(
            "{}",
            format!(
                "⚠️  Could not load photo {}, keeping the current one: {reason}",
                slot.location()
            )
            .warning()
        );
        return;
    }
    if let Some(photo) = slot.into_photo() {
        activity.set_photo(Some(photo));
    }
}

/// Resolves an activity reference (id or id prefix) within a trip.
fn resolve_activity(trip: &TripPlan, reference: &str) -> anyhow::Result<Uuid> {
    Ok(resolve_id(
        reference,
        trip.agendas().activities().map(|activity| activity.id),
    )?)
}

/// A one-line summary of a flight, or `None` for other activities.
fn flight_summary(activity: &ScheduledActivity) -> Option<String> {
    let FlightDetails {
        airline,
        flight_number,
        ..
    } = activity.flight.as_ref()?;
    activity
        .is_flight()
        .then(|| format!("{airline} {flight_number}").trim().to_string())
}
