use std::path::Path;

use tracing::instrument;
use tripplan::{Config, Directory};

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Currency code shown with budgets
    #[arg(long, default_value = "USD")]
    currency: String,

    /// Minimum number of nights a trip must last
    #[arg(long, default_value_t = 1)]
    min_nights: u32,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut config = Config::default();
        config.set_currency(&self.currency);
        config.set_min_nights(self.min_nights);

        Directory::new(root.to_path_buf()).init(&config)?;

        println!(
            "{}",
            format!("Initialized trips directory in {}", root.display()).success()
        );
        println!("  Created: .trip/config.toml");
        println!("  Created: trips/");
        println!();
        println!("Next steps:");
        println!("  trip destinations");
        println!("  trip new --destination Paris --start 2025-06-01 --end 2025-06-05");

        Ok(())
    }
}
