//! Time ordering of activities.

use std::cmp::Ordering;

use crate::domain::activity::ScheduledActivity;

/// Compares two activities by time only.
#[must_use]
pub fn by_time(a: &ScheduledActivity, b: &ScheduledActivity) -> Ordering {
    a.time.cmp(&b.time)
}

/// Sorts activities ascending by time.
///
/// The sort is stable: activities with equal times keep their relative order.
pub fn sort_by_time(activities: &mut [ScheduledActivity]) {
    activities.sort_by(by_time);
}

/// Whether every adjacent pair satisfies `time[i] <= time[i + 1]`.
#[must_use]
pub fn is_time_ordered<'a, I>(activities: I) -> bool
where
    I: IntoIterator<Item = &'a ScheduledActivity>,
{
    let mut iter = activities.into_iter();
    let Some(mut previous) = iter.next() else {
        return true;
    };
    for current in iter {
        if current.time < previous.time {
            return false;
        }
        previous = current;
    }
    true
}
