//! Scheduled activities and their categories.

use std::{borrow::Cow, fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::{calendar::start_of_day, flight::FlightDetails};

/// The kind of an activity, used for its icon and for flight handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    /// Driving, car hire, taxis.
    Car,
    /// Shows, museums, tours.
    Entertainment,
    /// Flights. Carries structured [`FlightDetails`].
    Flight,
    /// Meals.
    Food,
    /// Accommodation.
    Hotel,
    /// Rail travel.
    Train,
    /// Anything else.
    Misc,
}

impl ActivityCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 7] = [
        Self::Car,
        Self::Entertainment,
        Self::Flight,
        Self::Food,
        Self::Hotel,
        Self::Train,
        Self::Misc,
    ];

    /// The user-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Entertainment => "Entertainment",
            Self::Flight => "Flight",
            Self::Food => "Food",
            Self::Hotel => "Hotel",
            Self::Train => "Train",
            Self::Misc => "Misc.",
        }
    }

    /// Symbol name of the category's icon.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Car => "car.fill",
            Self::Entertainment => "ticket.fill",
            Self::Flight => "airplane",
            Self::Food => "fork.knife",
            Self::Hotel => "bed.double.fill",
            Self::Train => "tram.fill",
            Self::Misc => "ellipsis",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActivityCategory {
    type Err = InvalidCategory;

    /// Parses a category label, ignoring case and a trailing `.`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_end_matches('.');
        Self::ALL
            .into_iter()
            .find(|category| {
                category
                    .label()
                    .trim_end_matches('.')
                    .eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| InvalidCategory(s.to_string()))
    }
}

/// Error returned when parsing an unknown category label.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "unknown category '{0}' (expected one of: car, entertainment, flight, food, hotel, train, \
     misc)"
)]
pub struct InvalidCategory(String);

/// An image attached to an activity.
///
/// The payload is opaque bytes, owned exclusively by its activity.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo(Vec<u8>);

impl Photo {
    /// Wraps raw image bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw image bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Size of the payload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex-encoded SHA256 of the payload.
    ///
    /// Identical images share a fingerprint, which the photo store uses as the
    /// file name.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let hash = Sha256::digest(&self.0);
        format!("{hash:x}")
    }
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo").field("len", &self.0.len()).finish()
    }
}

/// One planned event within a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledActivity {
    /// Stable identifier. Used to find the activity again after edits.
    pub id: Uuid,
    /// When the activity takes place. Determines the owning day.
    pub time: NaiveDateTime,
    /// Short title.
    pub name: NonEmptyString,
    /// Free-text notes.
    pub description: String,
    /// Optional category.
    pub category: Option<ActivityCategory>,
    /// Flight details, meaningful when the category is [`ActivityCategory::Flight`].
    pub flight: Option<FlightDetails>,
    /// Optional link (booking page, map, etc.).
    pub url: Option<String>,
    /// Optional photo.
    pub photo: Option<Photo>,
    /// Fingerprint of a stored photo whose file exists but could not be read.
    /// Kept so that saving the activity does not lose the photo.
    pub(crate) unreadable_photo: Option<String>,
}

impl ScheduledActivity {
    /// Creates an activity with a fresh id and no optional fields.
    #[must_use]
    pub fn new(time: NaiveDateTime, name: NonEmptyString) -> Self {
        Self::with_id(Uuid::new_v4(), time, name)
    }

    pub(crate) const fn with_id(id: Uuid, time: NaiveDateTime, name: NonEmptyString) -> Self {
        Self {
            id,
            time,
            name,
            description: String::new(),
            category: None,
            flight: None,
            url: None,
            photo: None,
            unreadable_photo: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category: ActivityCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Marks this as a flight with the given details.
    #[must_use]
    pub fn with_flight(mut self, flight: FlightDetails) -> Self {
        self.category = Some(ActivityCategory::Flight);
        self.flight = Some(flight);
        self
    }

    /// Sets the link.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Attaches a photo.
    #[must_use]
    pub fn with_photo(mut self, photo: Photo) -> Self {
        self.set_photo(Some(photo));
        self
    }

    /// Replaces or removes the photo, including one that could not be read.
    pub fn set_photo(&mut self, photo: Option<Photo>) {
        self.photo = photo;
        self.unreadable_photo = None;
    }

    /// Fingerprint of the activity's photo, whether or not its payload could
    /// be read.
    #[must_use]
    pub fn photo_fingerprint(&self) -> Option<String> {
        self.photo
            .as_ref()
            .map(Photo::fingerprint)
            .or_else(|| self.unreadable_photo.clone())
    }

    /// Whether the activity refers to a stored photo that could not be read.
    /// Such a photo is shown as a placeholder.
    #[must_use]
    pub const fn has_unreadable_photo(&self) -> bool {
        self.photo.is_none() && self.unreadable_photo.is_some()
    }

    /// The calendar day this activity belongs to.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        start_of_day(self.time)
    }

    /// Whether this activity is a flight.
    #[must_use]
    pub fn is_flight(&self) -> bool {
        self.category == Some(ActivityCategory::Flight)
    }

    /// The description as shown to the user.
    ///
    /// For flights with details this is the labelled-line encoding of the
    /// details; otherwise it is the free-text description.
    #[must_use]
    pub fn description_text(&self) -> Cow<'_, str> {
        match (&self.flight, self.is_flight()) {
            (Some(flight), true) => Cow::Owned(flight.encode()),
            _ => Cow::Borrowed(&self.description),
        }
    }
}
