//! A filesystem backed store of trips
//!
//! The [`Directory`] loads every trip under a root into memory, lets callers
//! modify the in-memory [`Trips`], and writes trips back on request. It is a
//! wrapper around the filesystem agnostic [`Trips`] collection.
//!
//! Layout under the root:
//!
//! ```text
//! .trip/config.toml
//! trips/<uuid>.yaml
//! photos/<sha256>.jpg
//! ```

use std::{
    collections::HashSet,
    ffi::OsStr,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use nonempty::NonEmpty;
use rayon::iter::{Either, IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{
    domain::{Config, ScheduledActivity, TripPlan, Trips},
    storage::{
        photos::{PHOTOS_DIR, PhotoStore},
        trip_file::{self, TRIPS_DIR, TripFile, trip_path},
    },
};

/// Name of the metadata directory under the root.
pub const METADATA_DIR: &str = ".trip";

/// A directory whose trips have been loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    trips: Trips,
    config: Config,
    /// Trip files that were skipped on load. They are never overwritten or
    /// removed, and their photos are never pruned.
    skipped: Vec<PathBuf>,
}

/// A directory that has not been read yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A filesystem backed store of trips.
#[derive(Debug)]
pub struct Directory<S> {
    /// The root of the directory trips are stored in.
    root: PathBuf,
    state: S,
}

impl<S> Directory<S> {
    /// The root path of the directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Directory<Unloaded> {
    /// Opens a directory at the given path.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self {
            root,
            state: Unloaded,
        }
    }

    /// Creates the metadata directory, a configuration file and an empty
    /// trips directory.
    ///
    /// # Errors
    ///
    /// Fails with [`InitError::AlreadyInitialised`] if the metadata directory
    /// exists, or if any file or directory cannot be created.
    #[instrument(skip(config))]
    pub fn init(self, config: &Config) -> Result<Directory<Loaded>, InitError> {
        let metadata = self.root.join(METADATA_DIR);
        if metadata.exists() {
            return Err(InitError::AlreadyInitialised(metadata));
        }

        fs::create_dir_all(&metadata)?;
        config
            .save(&config_path(&self.root))
            .map_err(InitError::Config)?;
        fs::create_dir_all(self.root.join(TRIPS_DIR))?;

        tracing::info!("Initialised trip directory at {}", self.root.display());

        Ok(Directory {
            root: self.root,
            state: Loaded {
                trips: Trips::new(),
                config: config.clone(),
                skipped: Vec::new(),
            },
        })
    }

    /// Load all trips from disk
    ///
    /// # Errors
    ///
    /// This method has different behaviour depending on the configuration file
    /// in the trips root. If `allow_unrecognised` is `true`, then any files
    /// whose names are not trip ids, or that cannot be parsed as trips, are
    /// skipped. If `allow_unrecognised` is `false` (the default), then any
    /// unrecognised or invalid YAML file in the trips directory will return an
    /// error.
    ///
    /// Skipped files are left alone by later saves, and the photos they refer
    /// to are not pruned.
    #[instrument]
    pub fn load_all(self) -> Result<Directory<Loaded>, DirectoryLoadError> {
        let config = load_config(&self.root);
        let photos = PhotoStore::new(&self.root);
        let paths = collect_trip_paths(&self.root);

        let (trips, unrecognised_paths): (Vec<_>, Vec<_>) =
            paths
                .par_iter()
                .partition_map(|path| match try_load_trip(path, &photos) {
                    Ok(trip) => Either::Left(trip),
                    Err(path) => Either::Right(path),
                });

        if !unrecognised_paths.is_empty() {
            if !config.allow_unrecognised {
                return Err(DirectoryLoadError::UnrecognisedFiles(unrecognised_paths));
            }
            tracing::debug!("Skipped {} unrecognised files", unrecognised_paths.len());
        }

        let mut collection = Trips::with_capacity(trips.len());
        collection.extend(trips);
        tracing::debug!("Loaded {} trips", collection.len());

        Ok(Directory {
            root: self.root,
            state: Loaded {
                trips: collection,
                config,
                skipped: unrecognised_paths,
            },
        })
    }
}

/// Errors from loading a directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryLoadError {
    /// Files in the trips directory that are not valid trip files.
    UnrecognisedFiles(Vec<PathBuf>),
}

impl fmt::Display for DirectoryLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognisedFiles(paths) => {
                write!(f, "Unrecognised files: ")?;
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", path.display())?;
                }
                Ok(())
            }
        }
    }
}

/// Errors from initialising a directory.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// The metadata directory already exists.
    #[error("already initialised (found existing {})", .0.display())]
    AlreadyInitialised(PathBuf),
    /// The configuration file could not be written.
    #[error("failed to create config.toml: {0}")]
    Config(String),
    /// A directory could not be created.
    #[error("failed to create directory: {0}")]
    Io(#[from] io::Error),
}

fn config_path(root: &Path) -> PathBuf {
    root.join(METADATA_DIR).join("config.toml")
}

fn load_config(root: &Path) -> Config {
    let path = config_path(root);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn collect_trip_paths(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root.join(TRIPS_DIR))
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new(trip_file::EXTENSION)))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// The trip id encoded in a trip file's name.
fn id_from_path(path: &Path) -> Option<Uuid> {
    path.file_stem()
        .and_then(OsStr::to_str)
        .and_then(|stem| Uuid::parse_str(stem).ok())
}

fn try_load_trip(path: &Path, photos: &PhotoStore) -> Result<TripPlan, PathBuf> {
    let Some(id) = id_from_path(path) else {
        tracing::debug!("Skipping file with invalid trip id at {}", path.display());
        return Err(path.to_path_buf());
    };

    let trip = TripFile::load(path).and_then(|file| file.into_plan(photos));
    match trip {
        Ok(trip) if trip.id() == id => Ok(trip),
        Ok(trip) => {
            tracing::debug!(
                "Trip {} stored under mismatched name {}",
                trip.id(),
                path.display()
            );
            Err(path.to_path_buf())
        }
        Err(e) => {
            tracing::debug!("Failed to load trip from {}: {:?}", path.display(), e);
            Err(path.to_path_buf())
        }
    }
}

impl Directory<Loaded> {
    /// The loaded trips.
    #[must_use]
    pub const fn trips(&self) -> &Trips {
        &self.state.trips
    }

    /// The loaded trips, for modification.
    ///
    /// Changes are not written until [`Directory::save_trip`] or
    /// [`Directory::save_all`] is called.
    pub const fn trips_mut(&mut self) -> &mut Trips {
        &mut self.state.trips
    }

    /// The configuration the directory was loaded with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.state.config
    }

    /// Trip files that could not be read and were skipped on load.
    #[must_use]
    pub fn skipped(&self) -> &[PathBuf] {
        &self.state.skipped
    }

    /// Adds a new trip and writes it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip or its photos cannot be written.
    pub fn add_trip(&mut self, trip: TripPlan) -> Result<Uuid, SaveError> {
        let id = trip.id();
        self.state.trips.insert(trip);
        self.save_trip(id)?;
        tracing::info!("Added trip {id}");
        Ok(id)
    }

    /// Writes one trip and its photos, then prunes photos no trip refers to.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip is not loaded or a file cannot be written.
    #[instrument(skip(self))]
    pub fn save_trip(&self, id: Uuid) -> Result<PathBuf, SaveError> {
        let trip = self.state.trips.get(id).ok_or(SaveError::TripNotFound(id))?;
        let path = self
            .write_trip(trip)
            .map_err(|(path, source)| SaveError::Io { path, source })?;
        self.prune_photos().map_err(|source| SaveError::Io {
            path: self.root.join(PHOTOS_DIR),
            source,
        })?;
        Ok(path)
    }

    /// Removes a trip and deletes its file.
    ///
    /// # Errors
    ///
    /// Returns an error if the trip is not loaded or its file cannot be
    /// removed.
    #[instrument(skip(self))]
    pub fn delete_trip(&mut self, id: Uuid) -> Result<TripPlan, SaveError> {
        let trip = self
            .state
            .trips
            .remove(id)
            .ok_or(SaveError::TripNotFound(id))?;

        let path = trip_path(&self.root, id);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Trip {id} had no file at {}", path.display());
            }
            Err(source) => {
                self.state.trips.insert(trip);
                return Err(SaveError::Io { path, source });
            }
        }
        self.prune_photos().map_err(|source| SaveError::Io {
            path: self.root.join(PHOTOS_DIR),
            source,
        })?;

        tracing::info!("Deleted trip {id}");
        Ok(trip)
    }

    /// Writes every trip, deletes files of trips that are no longer loaded and
    /// prunes unreferenced photos.
    ///
    /// # Errors
    ///
    /// This method does *not* fail fast. It attempts to write every trip
    /// before returning the paths that failed.
    #[instrument(skip(self))]
    pub fn save_all(&self) -> Result<(), SaveAllError> {
        let mut failures: Vec<_> = self
            .state
            .trips
            .iter()
            .filter_map(|trip| self.write_trip(trip).err())
            .collect();

        for path in collect_trip_paths(&self.root) {
            let stale = !self.state.skipped.contains(&path)
                && id_from_path(&path).is_some_and(|id| self.state.trips.get(id).is_none());
            if stale {
                tracing::debug!("Removing stale trip file {}", path.display());
                if let Err(e) = fs::remove_file(&path) {
                    failures.push((path, e));
                }
            }
        }

        if let Err(e) = self.prune_photos() {
            failures.push((self.root.join(PHOTOS_DIR), e));
        }

        NonEmpty::from_vec(failures).map_or(Ok(()), |failures| Err(SaveAllError { failures }))
    }

    fn write_trip(&self, trip: &TripPlan) -> Result<PathBuf, (PathBuf, io::Error)> {
        let photos = PhotoStore::new(&self.root);
        for photo in trip.agendas().activities().filter_map(|a| a.photo.as_ref()) {
            photos
                .save(photo)
                .map_err(|e| (photos.path(&photo.fingerprint()), e))?;
        }

        let file = TripFile::from(trip);
        let path = trip_path(&self.root, trip.id());
        file.save_to_path(&path).map_err(|e| (path.clone(), e))?;
        tracing::debug!("Saved trip {} to {}", trip.id(), path.display());
        Ok(path)
    }

    fn prune_photos(&self) -> io::Result<()> {
        let mut referenced: HashSet<_> = self
            .state
            .trips
            .iter()
            .flat_map(|trip| trip.agendas().activities())
            .filter_map(ScheduledActivity::photo_fingerprint)
            .collect();

        for path in &self.state.skipped {
            match trip_file::photo_references(path) {
                Ok(fingerprints) => referenced.extend(fingerprints),
                Err(e) => {
                    tracing::debug!(
                        "Not pruning photos, skipped trip file {} is unreadable: {e}",
                        path.display()
                    );
                    return Ok(());
                }
            }
        }

        let removed = PhotoStore::new(&self.root).prune(&referenced)?;
        if !removed.is_empty() {
            tracing::debug!("Pruned {} photos", removed.len());
        }
        Ok(())
    }
}

/// Errors from writing trips.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// No loaded trip has this id.
    #[error("trip {0} not found")]
    TripNotFound(Uuid),
    /// A file could not be written or removed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// The file being written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

/// Errors from [`Directory::save_all`].
#[derive(Debug, thiserror::Error)]
pub struct SaveAllError {
    failures: NonEmpty<(PathBuf, io::Error)>,
}

impl SaveAllError {
    /// The paths that could not be written, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = &(PathBuf, io::Error)> {
        self.failures.iter()
    }
}

impl fmt::Display for SaveAllError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_DISPLAY: usize = 5;

        write!(f, "failed to save trips: ")?;

        let total = self.failures.len();

        let displayed_paths: Vec<String> = self
            .failures
            .iter()
            .take(MAX_DISPLAY)
            .map(|(p, _e)| p.display().to_string())
            .collect();

        let msg = displayed_paths.join(", ");

        if total <= MAX_DISPLAY {
            write!(f, "{msg}")
        } else {
            write!(f, "{msg}... (and {} more)", total - MAX_DISPLAY)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{Budget, Photo, ScheduledActivity, text::required};

    fn setup_temp_directory() -> (TempDir, Directory<Loaded>) {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let path = tmp.path().to_path_buf();
        (tmp, Directory::new(path).load_all().unwrap())
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn trip(destination: &str) -> TripPlan {
        TripPlan::new(
            required("destination", destination).unwrap(),
            date(1),
            date(3),
            Budget::ZERO,
        )
    }

    fn with_photo(mut trip: TripPlan, bytes: &[u8]) -> TripPlan {
        let activity = ScheduledActivity::new(
            date(1).and_hms_opt(9, 0, 0).unwrap(),
            required("name", "Beach").unwrap(),
        )
        .with_photo(Photo::new(bytes.to_vec()));
        trip.add_activity(date(1), activity).unwrap();
        trip
    }

    #[test]
    fn empty_root_loads_no_trips() {
        let (_tmp, dir) = setup_temp_directory();
        assert!(dir.trips().is_empty());
        assert_eq!(dir.config(), &Config::default());
    }

    #[test]
    fn can_add_trip() {
        let (_tmp, mut dir) = setup_temp_directory();
        let id = dir.add_trip(trip("Paris")).unwrap();

        assert!(trip_path(dir.root(), id).exists());

        let reloaded = Directory::new(dir.root().to_path_buf()).load_all().unwrap();
        assert_eq!(reloaded.trips().get(id), dir.trips().get(id));
    }

    #[test]
    fn init_writes_config_once() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.set_currency("EUR");

        Directory::new(tmp.path().to_path_buf())
            .init(&config)
            .unwrap();
        assert!(tmp.path().join(TRIPS_DIR).is_dir());

        let loaded = Directory::new(tmp.path().to_path_buf()).load_all().unwrap();
        assert_eq!(loaded.config().currency(), "EUR");

        let again = Directory::new(tmp.path().to_path_buf()).init(&config);
        assert!(matches!(again, Err(InitError::AlreadyInitialised(_))));
    }

    #[test]
    fn delete_removes_file_and_photos() {
        let (_tmp, mut dir) = setup_temp_directory();
        let keep = dir.add_trip(with_photo(trip("Bali"), b"keep")).unwrap();
        let gone = dir.add_trip(with_photo(trip("Tokyo"), b"gone")).unwrap();
        let photos = PhotoStore::new(dir.root());
        let gone_photo = photos.path(&Photo::new(b"gone".to_vec()).fingerprint());
        assert!(gone_photo.exists());

        let removed = dir.delete_trip(gone).unwrap();

        assert_eq!(removed.destination(), "Tokyo");
        assert!(!trip_path(dir.root(), gone).exists());
        assert!(!gone_photo.exists());
        assert!(photos.path(&Photo::new(b"keep".to_vec()).fingerprint()).exists());
        assert!(dir.trips().get(keep).is_some());
    }

    #[test]
    fn deleting_unknown_trip_fails() {
        let (_tmp, mut dir) = setup_temp_directory();
        let id = Uuid::new_v4();
        assert!(matches!(
            dir.delete_trip(id),
            Err(SaveError::TripNotFound(missing)) if missing == id
        ));
    }

    #[test]
    fn save_all_removes_stale_files() {
        let (_tmp, mut dir) = setup_temp_directory();
        let paris = dir.add_trip(trip("Paris")).unwrap();
        let tokyo = dir.add_trip(trip("Tokyo")).unwrap();

        dir.trips_mut().remove(tokyo);
        dir.trips_mut()
            .get_mut(paris)
            .unwrap()
            .set_budget(Budget::from_cents(500));
        dir.save_all().unwrap();

        assert!(!trip_path(dir.root(), tokyo).exists());
        let reloaded = Directory::new(dir.root().to_path_buf()).load_all().unwrap();
        assert_eq!(reloaded.trips().len(), 1);
        assert_eq!(
            reloaded.trips().get(paris).map(TripPlan::budget),
            Some(Budget::from_cents(500))
        );
    }

    #[test]
    fn unrecognised_files_fail_the_load() {
        let (_tmp, dir) = setup_temp_directory();
        let trips_dir = dir.root().join(TRIPS_DIR);
        fs::create_dir_all(&trips_dir).unwrap();
        fs::write(trips_dir.join("notes.yaml"), "hello").unwrap();

        let result = Directory::new(dir.root().to_path_buf()).load_all();
        assert!(matches!(
            result,
            Err(DirectoryLoadError::UnrecognisedFiles(paths)) if paths.len() == 1
        ));
    }

    #[test]
    fn unrecognised_files_can_be_skipped() {
        let (_tmp, mut dir) = setup_temp_directory();
        dir.add_trip(trip("Paris")).unwrap();
        fs::write(
            dir.root().join(TRIPS_DIR).join(format!("{}.yaml", Uuid::new_v4())),
            "not: [valid",
        )
        .unwrap();

        let mut config = Config::default();
        config.allow_unrecognised = true;
        fs::create_dir_all(dir.root().join(METADATA_DIR)).unwrap();
        config.save(&config_path(dir.root())).unwrap();

        let reloaded = Directory::new(dir.root().to_path_buf()).load_all().unwrap();
        assert_eq!(reloaded.trips().len(), 1);
    }

    #[test]
    fn skipped_trips_keep_their_file_and_photos() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.allow_unrecognised = true;
        let mut dir = Directory::new(tmp.path().to_path_buf())
            .init(&config)
            .unwrap();
        let broken = dir.add_trip(with_photo(trip("Bali"), b"shells")).unwrap();
        let other = dir.add_trip(trip("Tokyo")).unwrap();

        let path = trip_path(dir.root(), broken);
        let yaml = fs::read_to_string(&path)
            .unwrap()
            .replace("budget_cents: 0", "budget_cents: lots");
        assert!(yaml.contains("budget_cents: lots"));
        fs::write(&path, &yaml).unwrap();

        let mut dir = Directory::new(tmp.path().to_path_buf()).load_all().unwrap();
        assert_eq!(dir.skipped(), [path.clone()]);
        let photo = PhotoStore::new(dir.root()).path(&Photo::new(b"shells".to_vec()).fingerprint());

        dir.trips_mut()
            .get_mut(other)
            .unwrap()
            .set_budget(Budget::from_cents(100));
        dir.save_trip(other).unwrap();
        assert!(photo.exists());

        dir.save_all().unwrap();
        assert!(photo.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), yaml);
    }

    #[test]
    fn unparseable_skipped_file_stops_photo_pruning() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.allow_unrecognised = true;
        let mut dir = Directory::new(tmp.path().to_path_buf())
            .init(&config)
            .unwrap();
        let id = dir.add_trip(with_photo(trip("Bali"), b"shells")).unwrap();
        let garbage = trip_path(dir.root(), Uuid::new_v4());
        fs::write(&garbage, "not: [valid").unwrap();

        let mut dir = Directory::new(tmp.path().to_path_buf()).load_all().unwrap();
        dir.delete_trip(id).unwrap();
        dir.save_all().unwrap();

        assert!(garbage.exists());
        let photo = PhotoStore::new(dir.root()).path(&Photo::new(b"shells".to_vec()).fingerprint());
        assert!(photo.exists());
    }

    #[test]
    fn unreadable_photo_is_not_pruned() {
        let (_tmp, mut dir) = setup_temp_directory();
        let id = dir.add_trip(with_photo(trip("Bali"), b"shells")).unwrap();
        let fingerprint = Photo::new(b"shells".to_vec()).fingerprint();
        let photo = PhotoStore::new(dir.root()).path(&fingerprint);
        fs::remove_file(&photo).unwrap();
        fs::create_dir(&photo).unwrap();

        let mut dir = Directory::new(dir.root().to_path_buf()).load_all().unwrap();
        dir.trips_mut()
            .get_mut(id)
            .unwrap()
            .set_budget(Budget::from_cents(100));
        dir.save_trip(id).unwrap();

        assert!(photo.exists());
        let reloaded = Directory::new(dir.root().to_path_buf()).load_all().unwrap();
        let activity = reloaded
            .trips()
            .get(id)
            .unwrap()
            .agendas()
            .activities()
            .next()
            .unwrap();
        assert!(activity.has_unreadable_photo());
        assert_eq!(activity.photo_fingerprint(), Some(fingerprint));
    }

    #[test]
    fn trip_under_wrong_name_is_unrecognised() {
        let (_tmp, mut dir) = setup_temp_directory();
        let id = dir.add_trip(trip("Paris")).unwrap();
        let other = trip_path(dir.root(), Uuid::new_v4());
        fs::rename(trip_path(dir.root(), id), &other).unwrap();

        let result = Directory::new(dir.root().to_path_buf()).load_all();
        assert!(matches!(result, Err(DirectoryLoadError::UnrecognisedFiles(_))));
    }
}
