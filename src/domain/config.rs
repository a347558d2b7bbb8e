use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a trip directory.
///
/// Controls how amounts and dates are displayed, the minimum trip length
/// accepted when creating or editing trips, and how strictly the trips
/// directory is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Currency code shown after budgets, e.g. `USD`.
    currency: String,

    /// `chrono` format string for full dates.
    date_format: String,

    /// `chrono` format string for agenda day headings.
    day_format: String,

    /// `chrono` format string for activity times.
    time_format: String,

    /// The minimum number of nights between a trip's start and end.
    min_nights: u32,

    /// Whether to skip trip files that cannot be read instead of failing.
    pub allow_unrecognised: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            date_format: default_date_format(),
            day_format: default_day_format(),
            time_format: default_time_format(),
            min_nights: default_min_nights(),
            allow_unrecognised: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The currency code shown with budgets.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Sets the currency code. Codes are normalized to uppercase.
    pub fn set_currency(&mut self, currency: &str) {
        self.currency = currency.trim().to_uppercase();
    }

    /// Format string for full dates.
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Format string for agenda day headings.
    #[must_use]
    pub fn day_format(&self) -> &str {
        &self.day_format
    }

    /// Format string for activity times.
    #[must_use]
    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    /// The minimum trip length in nights.
    #[must_use]
    pub const fn min_nights(&self) -> u32 {
        self.min_nights
    }

    /// Sets the minimum trip length in nights.
    pub const fn set_min_nights(&mut self, nights: u32) {
        self.min_nights = nights;
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_date_format() -> String {
    "%b %-d, %Y".to_string()
}

fn default_day_format() -> String {
    "%A, %b %-d".to_string()
}

fn default_time_format() -> String {
    "%H:%M".to_string()
}

const fn default_min_nights() -> u32 {
    1
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_currency")]
        currency: String,

        #[serde(default = "default_date_format")]
        date_format: String,

        #[serde(default = "default_day_format")]
        day_format: String,

        #[serde(default = "default_time_format")]
        time_format: String,

        /// Trips shorter than this are rejected by the CLI.
        #[serde(default = "default_min_nights")]
        min_nights: u32,

        #[serde(default)]
        allow_unrecognised: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                currency,
                date_format,
                day_format,
                time_format,
                min_nights,
                allow_unrecognised,
            } => Self {
                currency,
                date_format,
                day_format,
                time_format,
                min_nights,
                allow_unrecognised,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            currency: config.currency,
            date_format: config.date_format,
            day_format: config.day_format,
            time_format: config.time_format,
            min_nights: config.min_nights,
            allow_unrecognised: config.allow_unrecognised,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ncurrency = \"EUR\"\ntime_format = \"%I:%M %p\"\nmin_nights = 2\nallow_unrecognised = true\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.currency(), "EUR");
        assert_eq!(config.time_format(), "%I:%M %p");
        assert_eq!(config.date_format(), "%b %-d, %Y");
        assert_eq!(config.min_nights(), 2);
        assert!(config.allow_unrecognised);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nmin_nights = \"one\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let result: Result<Config, _> = toml::from_str(r#"_version = "2""#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.set_currency(" gbp ");
        config.set_min_nights(3);
        config.save(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("_version = \"1\""));

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.currency(), "GBP");
        assert_eq!(loaded, config);
    }
}
