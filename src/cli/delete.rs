use std::path::PathBuf;

use tracing::instrument;
use tripplan::Directory;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// The trip to delete: id, id prefix or destination
    trip: String,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root).load_all()?;
        let id = directory.trips().resolve(&self.trip)?;

        if !self.yes {
            let Some(trip) = directory.trips().get(id) else {
                anyhow::bail!("Trip {} not found", self.trip);
            };
            let prompt = format!(
                "Delete the trip to {} with {} activities?",
                trip.destination(),
                trip.total_activities()
            );
            let confirmed = dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }
        }

        let trip = directory.delete_trip(id)?;
        println!(
            "{}",
            format!("Deleted the trip to {}", trip.destination()).success()
        );
        Ok(())
    }
}
