//! Per-day activity buckets.
//!
//! [`DayAgendas`] keeps a trip's activities grouped by calendar day. It
//! maintains two invariants under every operation:
//!
//! - there is at most one [`DayAgenda`] per calendar day, and
//! - there are no empty agendas. An agenda is created lazily by the first
//!   activity added to its day and dropped as soon as its last activity is
//!   removed or moved away.
//!
//! Within an agenda, activities are kept in ascending time order.

use std::{
    collections::{BTreeMap, BTreeSet, btree_map::Entry},
    iter,
};

use chrono::{NaiveDate, NaiveDateTime};
use nonempty::NonEmpty;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    activity::ScheduledActivity,
    calendar::start_of_day,
    ordering::{by_time, sort_by_time},
};

/// The activities scheduled for one calendar day.
///
/// An agenda always holds at least one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct DayAgenda {
    id: Uuid,
    date: NaiveDate,
    activities: NonEmpty<ScheduledActivity>,
}

impl DayAgenda {
    fn new(date: NaiveDate, activity: ScheduledActivity) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            activities: NonEmpty::new(activity),
        }
    }

    /// Unique identifier of this agenda.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The calendar day this agenda covers.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Number of activities. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Always `false`; agendas are never empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The activities in ascending time order.
    ///
    /// See [`sorted_activities`].
    pub fn activities(&self) -> SortedActivities<'_> {
        sorted_activities(self)
    }

    /// Looks up an activity by id.
    #[must_use]
    pub fn activity(&self, id: Uuid) -> Option<&ScheduledActivity> {
        self.activities().find(|activity| activity.id == id)
    }

    /// Whether this agenda holds the activity with the given id.
    #[must_use]
    pub fn contains(&self, id: Uuid) -> bool {
        self.activity(id).is_some()
    }

    fn activity_mut(&mut self, id: Uuid) -> Option<&mut ScheduledActivity> {
        let NonEmpty { head, tail } = &mut self.activities;
        iter::once(head)
            .chain(tail.iter_mut())
            .find(|activity| activity.id == id)
    }

    fn push(&mut self, activity: ScheduledActivity) {
        self.activities.push(activity);
        self.sort();
    }

    /// Restores ascending time order.
    ///
    /// The tail is sorted first; if its earliest activity precedes the head,
    /// the two are swapped and the tail re-sorted, leaving the earliest
    /// activity in the head.
    fn sort(&mut self) {
        let NonEmpty { head, tail } = &mut self.activities;
        sort_by_time(tail);
        if let Some(earliest) = tail.first_mut() {
            if by_time(earliest, head).is_lt() {
                std::mem::swap(head, earliest);
                sort_by_time(tail);
            }
        }
    }

    /// Keeps the activities for which `keep(position, activity)` is true.
    ///
    /// Positions refer to the time-sorted view. Returns the surviving agenda
    /// (or `None` if nothing survived) and the activities that were removed.
    fn retain<F>(self, mut keep: F) -> (Option<Self>, Vec<ScheduledActivity>)
    where
        F: FnMut(usize, &ScheduledActivity) -> bool,
    {
        let (kept, removed): (Vec<_>, Vec<_>) = Vec::from(self.activities)
            .into_iter()
            .enumerate()
            .partition(|(position, activity)| keep(*position, activity));

        let agenda = NonEmpty::from_vec(kept.into_iter().map(|(_, a)| a).collect()).map(
            |activities| Self {
                id: self.id,
                date: self.date,
                activities,
            },
        );
        (agenda, removed.into_iter().map(|(_, a)| a).collect())
    }
}

/// Iterator over an agenda's activities in ascending time order.
///
/// Lazy, finite and restartable: clone it to iterate again.
pub type SortedActivities<'a> =
    iter::Chain<iter::Once<&'a ScheduledActivity>, std::slice::Iter<'a, ScheduledActivity>>;

/// Returns the agenda's activities in ascending time order.
///
/// Activities with identical times appear in the order they were added.
#[must_use]
pub fn sorted_activities(agenda: &DayAgenda) -> SortedActivities<'_> {
    iter::once(&agenda.activities.head).chain(agenda.activities.tail.iter())
}

/// Selects activities within one day for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivitySelection {
    /// Activities with these ids.
    Ids(BTreeSet<Uuid>),
    /// Activities at these zero-based positions in the time-sorted view.
    Positions(BTreeSet<usize>),
}

impl ActivitySelection {
    fn matches(&self, position: usize, activity: &ScheduledActivity) -> bool {
        match self {
            Self::Ids(ids) => ids.contains(&activity.id),
            Self::Positions(positions) => positions.contains(&position),
        }
    }
}

/// Errors from agenda operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgendaError {
    /// The activity's time does not fall on the day it was added to.
    #[error("activity at {time} does not fall on {day}")]
    DayMismatch {
        /// The day the activity was added to.
        day: NaiveDate,
        /// The activity's time.
        time: NaiveDateTime,
    },
    /// No activity with this id exists where it was looked for.
    #[error("activity {0} not found")]
    ActivityNotFound(Uuid),
    /// An activity with this id is already scheduled.
    #[error("activity {0} is already scheduled")]
    DuplicateActivity(Uuid),
}

/// The set of per-day agendas belonging to one trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayAgendas {
    days: BTreeMap<NaiveDate, DayAgenda>,
}

impl DayAgendas {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an activity to the agenda for `day`, creating the agenda if this
    /// is the day's first activity.
    ///
    /// # Errors
    ///
    /// - [`AgendaError::DayMismatch`] if the activity's time is not on `day`.
    /// - [`AgendaError::DuplicateActivity`] if an activity with the same id is
    ///   already scheduled.
    pub fn add_activity(
        &mut self,
        day: NaiveDate,
        activity: ScheduledActivity,
    ) -> Result<(), AgendaError> {
        if activity.day() != day {
            return Err(AgendaError::DayMismatch {
                day,
                time: activity.time,
            });
        }
        if self.activity(activity.id).is_some() {
            return Err(AgendaError::DuplicateActivity(activity.id));
        }
        self.insert(day, activity);
        Ok(())
    }

    fn insert(&mut self, day: NaiveDate, activity: ScheduledActivity) {
        match self.days.entry(day) {
            Entry::Occupied(entry) => entry.into_mut().push(activity),
            Entry::Vacant(entry) => {
                debug!(%day, "creating agenda");
                entry.insert(DayAgenda::new(day, activity));
            }
        }
    }

    /// Replaces an activity with its edited version, moving it to another
    /// day's agenda if its time now falls on a different day.
    ///
    /// `old_time` is the activity's time before the edit and selects the
    /// agenda it is currently in; within that agenda the activity is matched
    /// by `updated.id`. An agenda emptied by the move is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AgendaError::ActivityNotFound`] if the agenda for `old_time`
    /// has no activity with `updated.id`. The store is left unchanged.
    pub fn relocate_activity(
        &mut self,
        old_time: NaiveDateTime,
        updated: ScheduledActivity,
    ) -> Result<(), AgendaError> {
        let id = updated.id;
        let old_day = start_of_day(old_time);
        let new_day = updated.day();

        if old_day == new_day {
            let agenda = self
                .days
                .get_mut(&old_day)
                .ok_or(AgendaError::ActivityNotFound(id))?;
            let slot = agenda
                .activity_mut(id)
                .ok_or(AgendaError::ActivityNotFound(id))?;
            *slot = updated;
            agenda.sort();
            return Ok(());
        }

        if !self.days.get(&old_day).is_some_and(|agenda| agenda.contains(id)) {
            return Err(AgendaError::ActivityNotFound(id));
        }

        self.remove_where(old_day, |_, activity| activity.id == id);
        debug!(%id, %old_day, %new_day, "moving activity to another day");
        self.insert(new_day, updated);
        Ok(())
    }

    /// Removes the selected activities from the agenda for `day`.
    ///
    /// Unknown ids and out-of-range positions are ignored. If the agenda ends
    /// up empty it is dropped. Returns the removed activities.
    pub fn remove_activities(
        &mut self,
        day: NaiveDate,
        selection: &ActivitySelection,
    ) -> Vec<ScheduledActivity> {
        self.remove_where(day, |position, activity| {
            selection.matches(position, activity)
        })
    }

    /// Removes a single activity, wherever it is scheduled.
    pub fn remove_activity(&mut self, id: Uuid) -> Option<ScheduledActivity> {
        let day = self.activity(id)?.day();
        self.remove_where(day, |_, activity| activity.id == id).pop()
    }

    fn remove_where<F>(&mut self, day: NaiveDate, mut remove: F) -> Vec<ScheduledActivity>
    where
        F: FnMut(usize, &ScheduledActivity) -> bool,
    {
        let Some(agenda) = self.days.remove(&day) else {
            return Vec::new();
        };
        let (survivor, removed) = agenda.retain(|position, activity| !remove(position, activity));
        match survivor {
            Some(agenda) => {
                self.days.insert(day, agenda);
            }
            None => debug!(%day, "dropping empty agenda"),
        }
        removed
    }

    /// Restores a previously saved agenda, keeping its id.
    ///
    /// Activities are merged into an existing agenda for the same day. An
    /// empty activity list is ignored.
    ///
    /// # Errors
    ///
    /// Fails if any activity is not on `date` or duplicates an existing id.
    /// Activities before the failing one have already been added.
    pub fn restore(
        &mut self,
        id: Uuid,
        date: NaiveDate,
        activities: Vec<ScheduledActivity>,
    ) -> Result<(), AgendaError> {
        let fresh = !self.days.contains_key(&date);
        for activity in activities {
            self.add_activity(date, activity)?;
        }
        if fresh {
            if let Some(agenda) = self.days.get_mut(&date) {
                agenda.id = id;
            }
        }
        Ok(())
    }

    /// The agenda for `day`, if it has any activities.
    #[must_use]
    pub fn agenda(&self, day: NaiveDate) -> Option<&DayAgenda> {
        self.days.get(&day)
    }

    /// All agendas in ascending date order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DayAgenda> + Clone {
        self.days.values()
    }

    /// The days that currently have agendas, ascending.
    pub fn days(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + Clone + '_ {
        self.days.keys().copied()
    }

    /// Looks up an activity by id across all days.
    #[must_use]
    pub fn activity(&self, id: Uuid) -> Option<&ScheduledActivity> {
        self.days.values().find_map(|agenda| agenda.activity(id))
    }

    /// Every activity, ordered by day and then by time.
    pub fn activities(&self) -> impl Iterator<Item = &ScheduledActivity> {
        self.days.values().flat_map(DayAgenda::activities)
    }

    /// Total number of activities across all days.
    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.days.values().map(DayAgenda::len).sum()
    }

    /// Number of days that have agendas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether no activities are scheduled at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl<'a> IntoIterator for &'a DayAgendas {
    type Item = &'a DayAgenda;
    type IntoIter = std::collections::btree_map::Values<'a, NaiveDate, DayAgenda>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.values()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;
    use crate::domain::{ordering::is_time_ordered, text::required};

    fn d1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn d2() -> NaiveDate {
        d1() + Days::new(1)
    }

    fn activity(day: NaiveDate, h: u32, m: u32, name: &str) -> ScheduledActivity {
        ScheduledActivity::new(
            day.and_hms_opt(h, m, 0).unwrap(),
            required("name", name).unwrap(),
        )
    }

    fn names(agenda: &DayAgenda) -> Vec<&str> {
        agenda.activities().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn first_activity_creates_agenda() {
        let mut store = DayAgendas::new();
        assert!(store.agenda(d1()).is_none());

        store
            .add_activity(d1(), activity(d1(), 9, 0, "Breakfast"))
            .unwrap();

        let agenda = store.agenda(d1()).unwrap();
        assert_eq!(agenda.date(), d1());
        assert_eq!(agenda.len(), 1);
    }

    #[test]
    fn added_activities_are_sorted_by_time() {
        let mut store = DayAgendas::new();
        store
            .add_activity(d1(), activity(d1(), 9, 0, "Breakfast"))
            .unwrap();
        store
            .add_activity(d1(), activity(d1(), 8, 0, "Coffee"))
            .unwrap();
        store
            .add_activity(d1(), activity(d1(), 21, 30, "Dinner"))
            .unwrap();
        store
            .add_activity(d1(), activity(d1(), 6, 15, "Run"))
            .unwrap();

        let agenda = store.agenda(d1()).unwrap();
        assert_eq!(names(agenda), ["Run", "Coffee", "Breakfast", "Dinner"]);
        assert!(is_time_ordered(agenda.activities()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn activity_on_wrong_day_is_rejected() {
        let mut store = DayAgendas::new();
        let err = store
            .add_activity(d1(), activity(d2(), 9, 0, "Museum"))
            .unwrap_err();
        assert!(matches!(err, AgendaError::DayMismatch { day, .. } if day == d1()));
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut store = DayAgendas::new();
        let museum = activity(d1(), 10, 0, "Museum");
        store.add_activity(d1(), museum.clone()).unwrap();
        assert_eq!(
            store.add_activity(d1(), museum.clone()),
            Err(AgendaError::DuplicateActivity(museum.id))
        );
    }

    #[test]
    fn relocating_within_a_day_resorts() {
        let mut store = DayAgendas::new();
        let coffee = activity(d1(), 8, 0, "Coffee");
        store.add_activity(d1(), coffee.clone()).unwrap();
        store
            .add_activity(d1(), activity(d1(), 9, 0, "Breakfast"))
            .unwrap();

        let mut later = coffee.clone();
        later.time = d1().and_hms_opt(10, 0, 0).unwrap();
        store.relocate_activity(coffee.time, later).unwrap();

        assert_eq!(names(store.agenda(d1()).unwrap()), ["Breakfast", "Coffee"]);
    }

    #[test]
    fn relocating_non_time_fields_replaces_in_place() {
        let mut store = DayAgendas::new();
        let museum = activity(d1(), 10, 0, "Museum");
        store.add_activity(d1(), museum.clone()).unwrap();

        let mut renamed = museum.clone();
        renamed.name = required("name", "Louvre").unwrap();
        renamed.description = "Book ahead".to_string();
        store.relocate_activity(museum.time, renamed).unwrap();

        let stored = store.activity(museum.id).unwrap();
        assert_eq!(stored.name.as_str(), "Louvre");
        assert_eq!(stored.description, "Book ahead");
        assert_eq!(store.activity_count(), 1);
    }

    #[test]
    fn relocating_only_activity_drops_old_agenda() {
        let mut store = DayAgendas::new();
        let museum = activity(d1(), 10, 0, "Museum");
        store.add_activity(d1(), museum.clone()).unwrap();

        let mut moved = museum.clone();
        moved.time = d2().and_hms_opt(11, 0, 0).unwrap();
        store.relocate_activity(museum.time, moved).unwrap();

        assert!(store.agenda(d1()).is_none());
        let new_agenda = store.agenda(d2()).unwrap();
        assert_eq!(
            new_agenda.activity(museum.id).unwrap().time,
            d2().and_hms_opt(11, 0, 0).unwrap()
        );
    }

    #[test]
    fn relocating_one_of_two_keeps_old_agenda() {
        let mut store = DayAgendas::new();
        let museum = activity(d1(), 10, 0, "Museum");
        store.add_activity(d1(), museum.clone()).unwrap();
        store
            .add_activity(d1(), activity(d1(), 13, 0, "Lunch"))
            .unwrap();
        store
            .add_activity(d2(), activity(d2(), 9, 0, "Train"))
            .unwrap();

        let mut moved = museum.clone();
        moved.time = d2().and_hms_opt(8, 0, 0).unwrap();
        store.relocate_activity(museum.time, moved).unwrap();

        let old = store.agenda(d1()).unwrap();
        assert!(!old.contains(museum.id));
        assert_eq!(names(old), ["Lunch"]);
        assert_eq!(names(store.agenda(d2()).unwrap()), ["Museum", "Train"]);
    }

    #[test]
    fn relocating_unknown_activity_changes_nothing() {
        let mut store = DayAgendas::new();
        store
            .add_activity(d1(), activity(d1(), 10, 0, "Museum"))
            .unwrap();
        let before = store.clone();

        let stranger = activity(d2(), 10, 0, "Stranger");
        let err = store
            .relocate_activity(d1().and_hms_opt(10, 0, 0).unwrap(), stranger.clone())
            .unwrap_err();

        assert_eq!(err, AgendaError::ActivityNotFound(stranger.id));
        assert_eq!(store, before);
    }

    #[test]
    fn removing_last_activity_drops_agenda() {
        let mut store = DayAgendas::new();
        let museum = activity(d1(), 10, 0, "Museum");
        store.add_activity(d1(), museum.clone()).unwrap();

        let removed =
            store.remove_activities(d1(), &ActivitySelection::Ids([museum.id].into()));

        assert_eq!(removed.len(), 1);
        assert!(store.agenda(d1()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn removing_one_of_two_keeps_agenda() {
        let mut store = DayAgendas::new();
        store
            .add_activity(d1(), activity(d1(), 10, 0, "Museum"))
            .unwrap();
        store
            .add_activity(d1(), activity(d1(), 8, 0, "Coffee"))
            .unwrap();

        // Position 0 in the sorted view is Coffee.
        let removed = store.remove_activities(d1(), &ActivitySelection::Positions([0].into()));

        assert_eq!(removed[0].name.as_str(), "Coffee");
        assert_eq!(names(store.agenda(d1()).unwrap()), ["Museum"]);
    }

    #[test]
    fn removing_from_missing_day_is_a_no_op() {
        let mut store = DayAgendas::new();
        let removed = store.remove_activities(d2(), &ActivitySelection::Positions([0].into()));
        assert!(removed.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn out_of_range_positions_are_ignored() {
        let mut store = DayAgendas::new();
        store
            .add_activity(d1(), activity(d1(), 10, 0, "Museum"))
            .unwrap();
        let removed = store.remove_activities(d1(), &ActivitySelection::Positions([3].into()));
        assert!(removed.is_empty());
        assert_eq!(store.activity_count(), 1);
    }

    #[test]
    fn remove_activity_finds_its_day() {
        let mut store = DayAgendas::new();
        let train = activity(d2(), 9, 0, "Train");
        store.add_activity(d2(), train.clone()).unwrap();
        store
            .add_activity(d1(), activity(d1(), 9, 0, "Walk"))
            .unwrap();

        assert_eq!(store.remove_activity(train.id).map(|a| a.id), Some(train.id));
        assert!(store.agenda(d2()).is_none());
        assert_eq!(store.remove_activity(train.id), None);
    }

    #[test]
    fn no_empty_agendas_after_mixed_operations() {
        let mut store = DayAgendas::new();
        let mut ids = Vec::new();
        for offset in 0..3 {
            let day = d1() + Days::new(offset);
            for hour in [9, 12, 18] {
                let a = activity(day, hour, 0, "Thing");
                ids.push((a.time, a.clone()));
                store.add_activity(day, a).unwrap();
            }
        }

        // Move everything from the first day onto the third.
        for (time, a) in ids.iter().take(3) {
            let mut moved = a.clone();
            moved.time = (d1() + Days::new(2)).and_time(time.time());
            store.relocate_activity(*time, moved).unwrap();
        }
        // Clear the second day by position.
        store.remove_activities(
            d1() + Days::new(1),
            &ActivitySelection::Positions([0, 1, 2].into()),
        );

        assert!(store.iter().all(|agenda| agenda.len() > 0));
        assert_eq!(store.days().collect::<Vec<_>>(), [d1() + Days::new(2)]);
        assert_eq!(store.activity_count(), 6);
        assert!(is_time_ordered(store.agenda(d1() + Days::new(2)).unwrap().activities()));
    }

    #[test]
    fn restore_keeps_agenda_id_and_sorts() {
        let mut store = DayAgendas::new();
        let id = Uuid::new_v4();
        store
            .restore(
                id,
                d1(),
                vec![activity(d1(), 18, 0, "Dinner"), activity(d1(), 7, 0, "Run")],
            )
            .unwrap();

        let agenda = store.agenda(d1()).unwrap();
        assert_eq!(agenda.id(), id);
        assert_eq!(names(agenda), ["Run", "Dinner"]);
    }

    #[test]
    fn sorted_view_is_restartable() {
        let mut store = DayAgendas::new();
        store
            .add_activity(d1(), activity(d1(), 10, 0, "Museum"))
            .unwrap();
        store
            .add_activity(d1(), activity(d1(), 8, 0, "Coffee"))
            .unwrap();

        let view = sorted_activities(store.agenda(d1()).unwrap());
        let first: Vec<_> = view.clone().map(|a| a.id).collect();
        let second: Vec<_> = view.map(|a| a.id).collect();
        assert_eq!(first, second);
    }
}
