//! A single trip: destination, dates, budget and day-by-day agenda.

use chrono::{NaiveDate, NaiveDateTime};
use non_empty_string::NonEmptyString;
use uuid::Uuid;

use crate::domain::{
    activity::ScheduledActivity,
    agenda::{ActivitySelection, AgendaError, DayAgenda, DayAgendas},
    budget::Budget,
    calendar::{DaysInRange, days_in_range},
    destination,
};

/// A vacation plan.
///
/// The plan owns its [`DayAgendas`]; activity operations are forwarded to
/// it. The date range is informational for the agenda store: activities may
/// be scheduled on any day, and days in the range without activities have no
/// agenda.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    id: Uuid,
    destination: NonEmptyString,
    start: NaiveDate,
    end: NaiveDate,
    budget: Budget,
    agendas: DayAgendas,
}

impl TripPlan {
    /// Creates a trip with a fresh id and no activities.
    ///
    /// The model does not require `end` to be after `start`; front ends
    /// enforce their own minimum trip length.
    #[must_use]
    pub fn new(destination: NonEmptyString, start: NaiveDate, end: NaiveDate, budget: Budget) -> Self {
        Self::with_id(Uuid::new_v4(), destination, start, end, budget)
    }

    pub(crate) fn with_id(
        id: Uuid,
        destination: NonEmptyString,
        start: NaiveDate,
        end: NaiveDate,
        budget: Budget,
    ) -> Self {
        Self {
            id,
            destination,
            start,
            end,
            budget,
            agendas: DayAgendas::new(),
        }
    }

    /// Unique identifier of the trip.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Where the trip goes.
    #[must_use]
    pub fn destination(&self) -> &str {
        self.destination.as_str()
    }

    /// First day of the trip.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the trip.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// The trip budget.
    #[must_use]
    pub const fn budget(&self) -> Budget {
        self.budget
    }

    /// Changes the destination.
    pub fn set_destination(&mut self, destination: NonEmptyString) {
        self.destination = destination;
    }

    /// Changes the date range.
    ///
    /// Existing agendas are kept even if they fall outside the new range; see
    /// [`TripPlan::out_of_range_agendas`].
    pub const fn set_dates(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start = start;
        self.end = end;
    }

    /// Changes the budget.
    pub const fn set_budget(&mut self, budget: Budget) {
        self.budget = budget;
    }

    /// The trip's agendas.
    #[must_use]
    pub const fn agendas(&self) -> &DayAgendas {
        &self.agendas
    }

    pub(crate) const fn agendas_mut(&mut self) -> &mut DayAgendas {
        &mut self.agendas
    }

    /// Every day of the trip, including days without activities.
    #[must_use]
    pub fn days_in_trip(&self) -> DaysInRange {
        days_in_range(self.start, self.end)
    }

    /// Number of days in the trip.
    #[must_use]
    pub fn day_count(&self) -> usize {
        self.days_in_trip().len()
    }

    /// The agenda for `day`, if any activities are scheduled on it.
    #[must_use]
    pub fn agenda(&self, day: NaiveDate) -> Option<&DayAgenda> {
        self.agendas.agenda(day)
    }

    /// Agendas on days outside the trip's date range.
    ///
    /// These appear when the dates are changed after activities were added.
    pub fn out_of_range_agendas(&self) -> impl Iterator<Item = &DayAgenda> {
        self.agendas
            .iter()
            .filter(|agenda| agenda.date() < self.start || agenda.date() > self.end)
    }

    /// Total number of scheduled activities.
    #[must_use]
    pub fn total_activities(&self) -> usize {
        self.agendas.activity_count()
    }

    /// Looks up an activity by id.
    #[must_use]
    pub fn activity(&self, id: Uuid) -> Option<&ScheduledActivity> {
        self.agendas.activity(id)
    }

    /// Cover image for the trip's destination.
    #[must_use]
    pub fn cover_image_url(&self) -> &'static str {
        destination::cover_image_url(self.destination())
    }

    /// Adds an activity on `day`.
    ///
    /// # Errors
    ///
    /// See [`DayAgendas::add_activity`].
    pub fn add_activity(
        &mut self,
        day: NaiveDate,
        activity: ScheduledActivity,
    ) -> Result<(), AgendaError> {
        self.agendas.add_activity(day, activity)
    }

    /// Applies an edited activity, moving it between days as needed.
    ///
    /// # Errors
    ///
    /// See [`DayAgendas::relocate_activity`].
    pub fn relocate_activity(
        &mut self,
        old_time: NaiveDateTime,
        updated: ScheduledActivity,
    ) -> Result<(), AgendaError> {
        self.agendas.relocate_activity(old_time, updated)
    }

    /// Removes the selected activities from `day`.
    pub fn remove_activities(
        &mut self,
        day: NaiveDate,
        selection: &ActivitySelection,
    ) -> Vec<ScheduledActivity> {
        self.agendas.remove_activities(day, selection)
    }

    /// Removes one activity by id.
    pub fn remove_activity(&mut self, id: Uuid) -> Option<ScheduledActivity> {
        self.agendas.remove_activity(id)
    }
}
