//! Domain models for trip planning.
//!
//! This module contains the core domain types: trips, their per-day agendas
//! and scheduled activities, and the supporting value types and catalogs.

pub mod activity;
pub use activity::{ActivityCategory, InvalidCategory, Photo, ScheduledActivity};

pub mod agenda;
pub use agenda::{ActivitySelection, AgendaError, DayAgenda, DayAgendas};

/// Trip budgets.
pub mod budget;
pub use budget::{Budget, BudgetError};

pub mod calendar;
pub use calendar::{DaysInRange, StartOfDay, days_in_range, start_of_day};

mod config;
pub use config::Config;

pub mod destination;
pub use destination::Destination;

pub mod flight;
pub use flight::FlightDetails;

pub mod media;
pub use media::{ImagePhase, ImageSlot, ImageSource, LocalImageSource};

pub mod ordering;

pub mod plan;
pub use plan::TripPlan;

/// Validation of required text fields.
pub mod text;
pub use text::EmptyStringError;

pub mod trips;
pub use trips::{LookupError, Trips};
