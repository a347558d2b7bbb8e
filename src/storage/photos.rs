//! Content-addressed storage for activity photos.
//!
//! Photos live next to the trip files as `photos/<fingerprint>.jpg`, where the
//! fingerprint is the SHA256 of the payload. Trip files refer to photos by
//! fingerprint only, so identical photos are stored once.

use std::{
    collections::HashSet,
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use crate::domain::Photo;

/// Name of the photo directory under the root.
pub const PHOTOS_DIR: &str = "photos";

const EXTENSION: &str = "jpg";

/// The photo directory of a trip root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    /// The photo store under `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            dir: root.join(PHOTOS_DIR),
        }
    }

    /// The path a photo with this fingerprint is stored at.
    #[must_use]
    pub fn path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(format!("{fingerprint}.{EXTENSION}"))
    }

    /// Writes a photo, returning its fingerprint.
    ///
    /// Photos that are already stored are not rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written.
    pub fn save(&self, photo: &Photo) -> io::Result<String> {
        let fingerprint = photo.fingerprint();
        let path = self.path(&fingerprint);
        if !path.exists() {
            fs::create_dir_all(&self.dir)?;
            fs::write(&path, photo.as_bytes())?;
            tracing::debug!("Saved photo {}", path.display());
        }
        Ok(fingerprint)
    }

    /// Reads the photo with this fingerprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    pub fn load(&self, fingerprint: &str) -> io::Result<Photo> {
        let bytes = fs::read(self.path(fingerprint))?;
        Ok(Photo::new(bytes))
    }

    /// Deletes every stored photo whose fingerprint is not in `referenced`.
    ///
    /// Only `*.jpg` regular files directly in the photo directory are
    /// considered. A missing directory has nothing to prune. Returns the
    /// removed paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed or a file cannot be
    /// removed.
    pub fn prune(&self, referenced: &HashSet<String>) -> io::Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut removed = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension() != Some(OsStr::new(EXTENSION)) {
                continue;
            }
            let Some(fingerprint) = path.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            if !referenced.contains(fingerprint) {
                fs::remove_file(&path)?;
                tracing::debug!("Pruned unreferenced photo {}", path.display());
                removed.push(path);
            }
        }
        Ok(removed)
    }
}
