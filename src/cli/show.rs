use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use serde_json::{Value, json};
use tracing::instrument;
use tripplan::{Config, DayAgenda, Directory, ScheduledActivity, TripPlan};

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Display a trip's day-by-day agenda")]
pub struct Command {
    /// The trip to show: id, id prefix or destination
    trip: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,

    /// Include activity ids
    #[arg(long)]
    ids: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root).load_all()?;
        let id = directory.trips().resolve(&self.trip)?;
        let Some(trip) = directory.trips().get(id) else {
            anyhow::bail!("Trip {} not found", self.trip);
        };

        match self.output {
            OutputFormat::Pretty => self.output_pretty(trip, directory.config()),
            OutputFormat::Json => output_json(trip)?,
        }
        Ok(())
    }

    fn output_pretty(&self, trip: &TripPlan, config: &Config) {
        let date = |day: NaiveDate| super::render(day.format(config.date_format()), day);

        // Header
        println!("{}", format!("# {}", trip.destination()).heading());
        println!(
            "{} to {} ({} days)\n",
            date(trip.start()),
            date(trip.end()),
            trip.day_count()
        );

        println!("{}", "Details".dim());
        println!("  ID:         {}", trip.id());
        println!("  Budget:     {}", trip.budget().with_currency(config.currency()));
        println!("  Activities: {}", trip.total_activities());
        println!("  Cover:      {}", trip.cover_image_url());

        for day in trip.days_in_trip() {
            self.print_day(day, trip.agenda(day), config);
        }

        let stray: Vec<_> = trip.out_of_range_agendas().collect();
        if !stray.is_empty() {
            println!(
                "\n{}",
                "⚠️  Activities outside the trip dates".warning()
            );
            for agenda in stray {
                self.print_day(agenda.date(), Some(agenda), config);
            }
        }
    }

    fn print_day(&self, day: NaiveDate, agenda: Option<&DayAgenda>, config: &Config) {
        println!(
            "\n{}",
            super::render(day.format(config.day_format()), day).info()
        );
        let Some(agenda) = agenda else {
            println!("  {}", "Nothing planned".dim());
            return;
        };
        for activity in agenda.activities() {
            self.print_activity(activity, config);
        }
    }

    fn print_activity(&self, activity: &ScheduledActivity, config: &Config) {
        let time = super::render(activity.time.format(config.time_format()), activity.time.time());
        let category = activity
            .category
            .map(|category| format!(" [{}]", category.label()))
            .unwrap_or_default();
        println!("  {time}  {}{}", activity.name.as_str(), category.dim());

        if self.ids {
            println!("         {}", activity.id.to_string().dim());
        }
        for line in activity.description_text().lines() {
            println!("         {line}");
        }
        if let Some(url) = &activity.url {
            println!("         {}", url.info());
        }
        if let Some(photo) = &activity.photo {
            println!(
                "         {}",
                format!("📷 photo ({} bytes)", photo.len()).dim()
            );
        } else if activity.has_unreadable_photo() {
            println!("         {}", "📷 photo (unavailable)".dim());
        }
    }
}

fn output_json(trip: &TripPlan) -> anyhow::Result<()> {
    let days: Vec<_> = trip
        .days_in_trip()
        .map(|day| day_json(day, trip.agenda(day)))
        .collect();
    let stray: Vec<_> = trip
        .out_of_range_agendas()
        .map(|agenda| day_json(agenda.date(), Some(agenda)))
        .collect();

    let output = json!({
        "id": trip.id().to_string(),
        "destination": trip.destination(),
        "start": trip.start().to_string(),
        "end": trip.end().to_string(),
        "budget_cents": trip.budget().cents(),
        "cover_image_url": trip.cover_image_url(),
        "days": days,
        "out_of_range": stray,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn day_json(day: NaiveDate, agenda: Option<&DayAgenda>) -> Value {
    let activities: Vec<_> = agenda
        .into_iter()
        .flat_map(DayAgenda::activities)
        .map(activity_json)
        .collect();
    json!({
        "date": day.to_string(),
        "agenda_id": agenda.map(|agenda| agenda.id().to_string()),
        "activities": activities,
    })
}

fn activity_json(activity: &ScheduledActivity) -> Value {
    json!({
        "id": activity.id.to_string(),
        "time": activity.time.to_string(),
        "name": activity.name.as_str(),
        "description": activity.description_text(),
        "category": activity.category,
        "flight": activity.flight,
        "url": activity.url,
        "photo": activity.photo_fingerprint(),
    })
}
