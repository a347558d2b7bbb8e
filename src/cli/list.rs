use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::instrument;
use tripplan::{Config, Directory, TripPlan};

use super::terminal::{self, Colorize};

/// Command arguments for `trip list`.
#[derive(Debug, Default, Parser)]
#[command(about = "List trips, soonest first")]
pub struct Command {
    /// Only show trips whose destination contains this text
    /// (case-insensitive).
    #[arg(long)]
    contains: Option<String>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and print tab-separated rows for scripting.
    #[arg(long)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// One trip as shown in the listing.
#[derive(Debug, Serialize)]
struct Row {
    id: String,
    destination: String,
    start: String,
    end: String,
    days: usize,
    activities: usize,
    budget: String,
}

impl Row {
    fn new(trip: &TripPlan, config: &Config) -> Self {
        let format = config.date_format();
        Self {
            id: trip.id().to_string(),
            destination: trip.destination().to_string(),
            start: super::render(trip.start().format(format), trip.start()),
            end: super::render(trip.end().format(format), trip.end()),
            days: trip.day_count(),
            activities: trip.total_activities(),
            budget: trip.budget().with_currency(config.currency()),
        }
    }
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root).load_all()?;
        let config = directory.config();

        for path in directory.skipped() {
            eprintln!(
                "{}",
                format!("⚠️  Skipped unreadable trip file {}", path.display()).warning()
            );
        }

        let needle = self.contains.as_deref().map(str::to_lowercase);
        let rows: Vec<_> = directory
            .trips()
            .sorted()
            .into_iter()
            .filter(|trip| {
                needle
                    .as_deref()
                    .is_none_or(|needle| trip.destination().to_lowercase().contains(needle))
            })
            .map(|trip| Row::new(trip, config))
            .collect();

        match self.output {
            OutputFormat::Table => render_table(&rows, self.quiet),
            OutputFormat::Json => render_json(&rows)?,
        }
        Ok(())
    }
}

fn render_table(rows: &[Row], quiet: bool) {
    if quiet {
        for row in rows {
            println!("{}\t{}\t{}\t{}", row.id, row.destination, row.start, row.end);
        }
        return;
    }

    if rows.is_empty() {
        println!("No trips planned yet. Create one with `trip new`.");
        return;
    }

    let narrow = terminal::is_narrow();
    let headers: &[&str] = if narrow {
        &["ID", "DESTINATION", "START"]
    } else {
        &["ID", "DESTINATION", "START", "END", "DAYS", "ACTIVITIES", "BUDGET"]
    };

    let data: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut values = vec![
                row.id[..8].to_string(),
                terminal::truncate(&row.destination, 24),
                row.start.clone(),
            ];
            if !narrow {
                values.extend([
                    row.end.clone(),
                    row.days.to_string(),
                    row.activities.to_string(),
                    row.budget.clone(),
                ]);
            }
            values
        })
        .collect();

    // Determine column widths for alignment.
    let widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect::<Vec<_>>();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();

    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in data {
        for (value, width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!();
    }
}

fn render_json(rows: &[Row]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), rows)
        .context("failed to render json output")?;
    println!();
    Ok(())
}
