//! Structured flight details and their legacy text encoding.
//!
//! Flight activities carry an airport, airline, flight number and terminal.
//! Older trip files stored these inside the free-text description as four
//! labelled lines; [`FlightDetails::encode`] and [`FlightDetails::decode`] keep
//! that form readable and writable.
//!
//! Decoding is lossy: a line is attributed to a field only when it starts with
//! the field's exact label, so user text that happens to begin with a label is
//! indistinguishable from an encoded field.

use serde::{Deserialize, Serialize};

const AIRPORT: &str = "Airport: ";
const AIRLINE: &str = "Airline: ";
const FLIGHT: &str = "Flight: ";
const TERMINAL: &str = "Terminal: ";

/// Details of a flight activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightDetails {
    /// Departure airport.
    #[serde(default)]
    pub airport: String,
    /// Operating airline.
    #[serde(default)]
    pub airline: String,
    /// Flight number, e.g. `DL100`.
    #[serde(default)]
    pub flight_number: String,
    /// Departure terminal.
    #[serde(default)]
    pub terminal: String,
}

impl FlightDetails {
    /// Creates flight details from the four fields.
    #[must_use]
    pub fn new(
        airport: impl Into<String>,
        airline: impl Into<String>,
        flight_number: impl Into<String>,
        terminal: impl Into<String>,
    ) -> Self {
        Self {
            airport: airport.into(),
            airline: airline.into(),
            flight_number: flight_number.into(),
            terminal: terminal.into(),
        }
    }

    /// Encodes the details as four newline-joined, labelled lines.
    #[must_use]
    pub fn encode(&self) -> String {
        [
            format!("{AIRPORT}{}", self.airport),
            format!("{AIRLINE}{}", self.airline),
            format!("{FLIGHT}{}", self.flight_number),
            format!("{TERMINAL}{}", self.terminal),
        ]
        .join("\n")
    }

    /// Decodes details from the labelled-line form.
    ///
    /// Unlabelled lines are ignored and missing fields are left empty. If a
    /// label appears more than once, the last occurrence wins.
    #[must_use]
    pub fn decode(text: &str) -> Self {
        let mut details = Self::default();
        for line in text.split('\n') {
            if let Some(value) = line.strip_prefix(AIRPORT) {
                details.airport = value.to_string();
            } else if let Some(value) = line.strip_prefix(AIRLINE) {
                details.airline = value.to_string();
            } else if let Some(value) = line.strip_prefix(FLIGHT) {
                details.flight_number = value.to_string();
            } else if let Some(value) = line.strip_prefix(TERMINAL) {
                details.terminal = value.to_string();
            }
        }
        details
    }

    /// Whether the text contains at least one labelled flight line.
    #[must_use]
    pub fn is_encoded(text: &str) -> bool {
        text.split('\n').any(|line| {
            [AIRPORT, AIRLINE, FLIGHT, TERMINAL]
                .iter()
                .any(|label| line.starts_with(label))
        })
    }

    /// Whether every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.airport.is_empty()
            && self.airline.is_empty()
            && self.flight_number.is_empty()
            && self.terminal.is_empty()
    }
}
