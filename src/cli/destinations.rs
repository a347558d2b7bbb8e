use clap::Parser;
use tracing::instrument;
use tripplan::domain::destination::{self, Destination};

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "List popular destinations")]
pub struct Command {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl Command {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&destination::POPULAR)?);
            return Ok(());
        }

        for Destination {
            name,
            country,
            description,
            popularity,
            ..
        } in &destination::POPULAR
        {
            println!(
                "{} {}",
                name.heading(),
                format!("({country}, {popularity}% popularity)").dim()
            );
            println!("  {description}");
        }
        println!();
        println!("Plan one with: trip new --destination <NAME> --start <DATE> --end <DATE>");
        Ok(())
    }
}
