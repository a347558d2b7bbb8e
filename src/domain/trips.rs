//! The collection of all trips.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::plan::TripPlan;

/// All known trips, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trips {
    trips: HashMap<Uuid, TripPlan>,
}

/// Errors from resolving a user-supplied reference to a trip or activity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Nothing matched the reference.
    #[error("nothing matches '{0}'")]
    NotFound(String),
    /// More than one item matched the reference.
    #[error("'{reference}' is ambiguous ({count} matches); use more characters of the id")]
    Ambiguous {
        /// The reference as given.
        reference: String,
        /// How many items matched.
        count: usize,
    },
}

impl Trips {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty collection with room for `capacity` trips.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            trips: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts a trip, returning the trip it replaced (same id), if any.
    pub fn insert(&mut self, trip: TripPlan) -> Option<TripPlan> {
        self.trips.insert(trip.id(), trip)
    }

    /// Removes a trip.
    pub fn remove(&mut self, id: Uuid) -> Option<TripPlan> {
        self.trips.remove(&id)
    }

    /// Looks up a trip by id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&TripPlan> {
        self.trips.get(&id)
    }

    /// Looks up a trip by id for modification.
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut TripPlan> {
        self.trips.get_mut(&id)
    }

    /// Trips ordered by start date, then destination, then id.
    #[must_use]
    pub fn sorted(&self) -> Vec<&TripPlan> {
        let mut trips: Vec<_> = self.trips.values().collect();
        trips.sort_by(|a, b| {
            a.start()
                .cmp(&b.start())
                .then_with(|| a.destination().cmp(b.destination()))
                .then_with(|| a.id().cmp(&b.id()))
        });
        trips
    }

    /// Trips in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TripPlan> {
        self.trips.values()
    }

    /// Number of trips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// Whether there are no trips.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Resolves a reference to a trip id.
    ///
    /// The reference may be a full id, a destination name (case-insensitive)
    /// or an id prefix, tried in that order. A destination such as "Cafe" is
    /// never mistaken for an id prefix.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if nothing or more than one trip matches.
    pub fn resolve(&self, reference: &str) -> Result<Uuid, LookupError> {
        if Uuid::parse_str(reference.trim()).is_ok() {
            return resolve_id(reference, self.trips.keys().copied());
        }

        let by_destination: Vec<_> = self
            .trips
            .values()
            .filter(|trip| trip.destination().eq_ignore_ascii_case(reference.trim()))
            .map(TripPlan::id)
            .collect();
        if by_destination.is_empty() {
            resolve_id(reference, self.trips.keys().copied())
        } else {
            single(reference, by_destination)
        }
    }
}

impl Extend<TripPlan> for Trips {
    fn extend<I: IntoIterator<Item = TripPlan>>(&mut self, iter: I) {
        for trip in iter {
            self.insert(trip);
        }
    }
}

impl FromIterator<TripPlan> for Trips {
    fn from_iter<I: IntoIterator<Item = TripPlan>>(iter: I) -> Self {
        let mut trips = Self::new();
        trips.extend(iter);
        trips
    }
}

/// Resolves a full id or unique id prefix against a set of ids.
///
/// Prefix matching ignores case and hyphens are significant.
///
/// # Errors
///
/// Returns [`LookupError`] if nothing or more than one id matches.
pub fn resolve_id(
    reference: &str,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<Uuid, LookupError> {
    let reference_trimmed = reference.trim();
    if reference_trimmed.is_empty() {
        return Err(LookupError::NotFound(reference.to_string()));
    }
    let wanted = reference_trimmed.to_ascii_lowercase();
    let ids: Vec<_> = ids.into_iter().collect();

    if let Ok(exact) = Uuid::parse_str(&wanted) {
        return if ids.contains(&exact) {
            Ok(exact)
        } else {
            Err(LookupError::NotFound(reference.to_string()))
        };
    }

    let matches: Vec<_> = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&wanted))
        .collect();
    single(reference, matches)
}

fn single(reference: &str, matches: Vec<Uuid>) -> Result<Uuid, LookupError> {
    match matches.as_slice() {
        [] => Err(LookupError::NotFound(reference.to_string())),
        [id] => Ok(*id),
        _ => Err(LookupError::Ambiguous {
            reference: reference.to_string(),
            count: matches.len(),
        }),
    }
}
