use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        ActivityCategory, AgendaError, Budget, EmptyStringError, FlightDetails, ScheduledActivity,
        TripPlan, text::required,
    },
    storage::photos::PhotoStore,
};

/// Name of the trips directory under the root.
pub const TRIPS_DIR: &str = "trips";

/// File extension of trip files.
pub const EXTENSION: &str = "yaml";

/// The path of the file a trip is stored in: `root/trips/<id>.yaml`.
#[must_use]
pub fn trip_path(root: &Path, id: Uuid) -> PathBuf {
    root.join(TRIPS_DIR).join(format!("{id}.{EXTENSION}"))
}

/// A trip serialized as YAML.
///
/// Photos are not embedded; activities refer to them by fingerprint and the
/// payloads live in the [`PhotoStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TripFileVersion", into = "TripFileVersion")]
pub struct TripFile {
    id: Uuid,
    destination: String,
    start: NaiveDate,
    end: NaiveDate,
    budget: Budget,
    agendas: Vec<AgendaRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AgendaRecord {
    id: Uuid,
    date: NaiveDate,
    activities: Vec<ActivityRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ActivityRecord {
    id: Uuid,
    time: NaiveDateTime,
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<ActivityCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flight: Option<FlightDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    /// Fingerprint of the photo in the photo store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    photo: Option<String>,
}

impl TripFile {
    /// The id of the serialized trip.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let yaml = serde_yaml::to_string(self).expect("this must never fail");
        writer.write_all(yaml.as_bytes())
    }

    pub(crate) fn read<R: Read>(reader: R) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Writes the trip to `root/trips/<id>.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save(&self, root: &Path) -> io::Result<PathBuf> {
        let path = trip_path(root, self.id);
        self.save_to_path(&path)?;
        Ok(path)
    }

    /// Writes the trip to a specific file path.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save_to_path(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()
    }

    /// Reads a trip file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or is not
    /// a valid trip file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|io_error| match io_error.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound,
            _ => LoadError::Io(io_error),
        })?;
        Self::read(BufReader::new(file))
    }

    /// Rebuilds the domain trip, reading photos from `photos`.
    ///
    /// Flight activities written before flight details had their own field
    /// carry the details in their description; these are decoded into
    /// structured details. A photo that cannot be read is dropped with a
    /// warning and the activity shows a placeholder instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination or an activity name is empty, or
    /// if an agenda holds an activity that is not on its day or whose id is
    /// used twice.
    pub fn into_plan(self, photos: &PhotoStore) -> Result<TripPlan, LoadError> {
        let destination = required("destination", &self.destination)?;
        let mut plan = TripPlan::with_id(self.id, destination, self.start, self.end, self.budget);

        for agenda in self.agendas {
            let activities = agenda
                .activities
                .into_iter()
                .map(|record| record.into_activity(photos))
                .collect::<Result<Vec<_>, _>>()?;
            plan.agendas_mut()
                .restore(agenda.id, agenda.date, activities)?;
        }

        Ok(plan)
    }
}

impl From<&TripPlan> for TripFile {
    fn from(plan: &TripPlan) -> Self {
        let agendas = plan
            .agendas()
            .iter()
            .map(|agenda| AgendaRecord {
                id: agenda.id(),
                date: agenda.date(),
                activities: agenda.activities().map(ActivityRecord::from).collect(),
            })
            .collect();

        Self {
            id: plan.id(),
            destination: plan.destination().to_string(),
            start: plan.start(),
            end: plan.end(),
            budget: plan.budget(),
            agendas,
        }
    }
}

impl From<&ScheduledActivity> for ActivityRecord {
    fn from(activity: &ScheduledActivity) -> Self {
        Self {
            id: activity.id,
            time: activity.time,
            name: activity.name.as_str().to_string(),
            description: activity.description.clone(),
            category: activity.category,
            flight: activity.flight.clone(),
            url: activity.url.clone(),
            photo: activity.photo_fingerprint(),
        }
    }
}

impl ActivityRecord {
    fn into_activity(self, photos: &PhotoStore) -> Result<ScheduledActivity, EmptyStringError> {
        let name = required("name", &self.name)?;
        let (flight, description) = migrate_flight(self.category, self.flight, self.description);

        let mut activity = ScheduledActivity::with_id(self.id, self.time, name);
        activity.description = description;
        activity.category = self.category;
        activity.flight = flight;
        activity.url = self.url;

        if let Some(fingerprint) = self.photo {
            match photos.load(&fingerprint) {
                Ok(photo) => activity.photo = Some(photo),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::warn!(
                        "Photo {fingerprint} for '{}' is missing, dropping it",
                        activity.name.as_str()
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to read photo {fingerprint} for '{}': {e}",
                        activity.name.as_str()
                    );
                    activity.unreadable_photo = Some(fingerprint);
                }
            }
        }
        Ok(activity)
    }
}

/// The photo fingerprints a trip file refers to, read without interpreting
/// the rest of the file.
///
/// Used for files that cannot be loaded as trips, so that their photos are
/// not mistaken for unreferenced ones.
pub(crate) fn photo_references(path: &Path) -> Result<Vec<String>, LoadError> {
    let file = File::open(path)?;
    let value: serde_yaml::Value = serde_yaml::from_reader(BufReader::new(file))?;
    let mut fingerprints = Vec::new();
    collect_photos(&value, &mut fingerprints);
    Ok(fingerprints)
}

fn collect_photos(value: &serde_yaml::Value, fingerprints: &mut Vec<String>) {
    match value {
        serde_yaml::Value::Mapping(mapping) => {
            for (key, value) in mapping {
                match (key.as_str(), value.as_str()) {
                    (Some("photo"), Some(fingerprint)) => fingerprints.push(fingerprint.to_string()),
                    _ => collect_photos(value, fingerprints),
                }
            }
        }
        serde_yaml::Value::Sequence(values) => {
            for value in values {
                collect_photos(value, fingerprints);
            }
        }
        serde_yaml::Value::Tagged(tagged) => collect_photos(&tagged.value, fingerprints),
        _ => {}
    }
}

/// Moves flight details stored in the description into their own field.
fn migrate_flight(
    category: Option<ActivityCategory>,
    flight: Option<FlightDetails>,
    description: String,
) -> (Option<FlightDetails>, String) {
    match flight {
        Some(flight) => (Some(flight), description),
        None if category == Some(ActivityCategory::Flight)
            && FlightDetails::is_encoded(&description) =>
        {
            tracing::debug!("Migrating flight details out of the description");
            (Some(FlightDetails::decode(&description)), String::new())
        }
        None => (None, description),
    }
}

/// Errors that can occur when loading a trip file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The trip file was not found.
    #[error("trip file not found")]
    NotFound,
    /// An I/O error occurred.
    #[error("failed to read trip file: {0}")]
    Io(#[from] io::Error),
    /// The YAML could not be parsed.
    #[error("invalid trip file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A required text field was empty.
    #[error("invalid trip file: {0}")]
    EmptyField(#[from] EmptyStringError),
    /// An agenda was inconsistent.
    #[error("invalid agenda: {0}")]
    Agenda(#[from] AgendaError),
}

/// The serialized versions of a trip file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum TripFileVersion {
    #[serde(rename = "1")]
    V1 {
        id: Uuid,
        destination: String,
        start: NaiveDate,
        end: NaiveDate,
        /// The budget in minor units.
        #[serde(default)]
        budget_cents: Budget,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        agendas: Vec<AgendaRecord>,
    },
}

impl From<TripFileVersion> for TripFile {
    fn from(version: TripFileVersion) -> Self {
        match version {
            TripFileVersion::V1 {
                id,
                destination,
                start,
                end,
                budget_cents,
                agendas,
            } => Self {
                id,
                destination,
                start,
                end,
                budget: budget_cents,
                agendas,
            },
        }
    }
}

impl From<TripFile> for TripFileVersion {
    fn from(trip: TripFile) -> Self {
        let TripFile {
            id,
            destination,
            start,
            end,
            budget,
            agendas,
        } = trip;
        Self::V1 {
            id,
            destination,
            start,
            end,
            budget_cents: budget,
            agendas,
        }
    }
}
