//! Plain-text vacation planning
//!
//! Trips are YAML documents stored in a directory. Each trip owns a set of
//! per-day agendas, and each agenda holds the activities scheduled on that
//! day in time order.

pub mod domain;
pub use domain::{
    ActivityCategory, ActivitySelection, AgendaError, Budget, Config, DayAgenda, DayAgendas,
    FlightDetails, Photo, ScheduledActivity, TripPlan, Trips,
};

/// Filesystem storage and directory management for trips.
pub mod storage;
pub use storage::Directory;
