//! Image loading and photo selection capabilities.
//!
//! The core does not speak HTTP. Images are obtained through an
//! [`ImageSource`], and their progress is observed as an [`ImagePhase`]. Any
//! phase other than [`ImagePhase::Ready`] is shown as a neutral placeholder;
//! failures are never propagated as errors.

use std::{fs, path::PathBuf};

use tracing::debug;

use crate::domain::activity::Photo;

/// The observable state of an image load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePhase {
    /// Not resolved yet.
    Pending,
    /// Loaded successfully.
    Ready(Vec<u8>),
    /// Could not be loaded. Carries a human-readable reason.
    Failed(String),
}

impl ImagePhase {
    /// Whether a placeholder should be shown instead of the image.
    #[must_use]
    pub const fn shows_placeholder(&self) -> bool {
        !matches!(self, Self::Ready(_))
    }

    /// Converts a loaded image into a photo payload.
    #[must_use]
    pub fn into_photo(self) -> Option<Photo> {
        match self {
            Self::Ready(bytes) => Some(Photo::new(bytes)),
            Self::Pending | Self::Failed(_) => None,
        }
    }
}

/// Something that can fetch image bytes for a location.
pub trait ImageSource {
    /// Fetches the image at `location`.
    ///
    /// Implementations report problems as [`ImagePhase::Failed`] rather than
    /// returning an error.
    fn fetch(&self, location: &str) -> ImagePhase;
}

/// Loads images from the local filesystem.
///
/// Accepts plain paths (relative ones are resolved against the working
/// directory) and `file://` URLs. Remote URLs are reported as failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalImageSource;

impl LocalImageSource {
    /// Creates a local image source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn resolve(location: &str) -> Result<PathBuf, String> {
        if let Some(path) = location.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if location.contains("://") {
            return Err(format!("remote images are not supported: {location}"));
        }
        Ok(PathBuf::from(location))
    }
}

impl ImageSource for LocalImageSource {
    fn fetch(&self, location: &str) -> ImagePhase {
        let path = match Self::resolve(location) {
            Ok(path) => path,
            Err(reason) => return ImagePhase::Failed(reason),
        };
        match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => {
                ImagePhase::Failed(format!("{} is empty", path.display()))
            }
            Ok(bytes) => ImagePhase::Ready(bytes),
            Err(e) => {
                debug!("failed to read image {}: {e}", path.display());
                ImagePhase::Failed(format!("{}: {e}", path.display()))
            }
        }
    }
}

/// An image that is loaded at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    location: String,
    phase: ImagePhase,
}

impl ImageSlot {
    /// Creates a pending slot for `location`.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            phase: ImagePhase::Pending,
        }
    }

    /// The location being loaded.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> &ImagePhase {
        &self.phase
    }

    /// Fetches the image if it has not been fetched yet, and returns the
    /// resulting phase.
    pub fn resolve(&mut self, source: &impl ImageSource) -> &ImagePhase {
        if self.phase == ImagePhase::Pending {
            self.phase = source.fetch(&self.location);
        }
        &self.phase
    }

    /// Consumes the slot, returning the photo if it loaded.
    #[must_use]
    pub fn into_photo(self) -> Option<Photo> {
        self.phase.into_photo()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, io::Write};

    use super::*;

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl ImageSource for CountingSource {
        fn fetch(&self, _location: &str) -> ImagePhase {
            self.calls.set(self.calls.get() + 1);
            ImagePhase::Ready(vec![0xFF, 0xD8])
        }
    }

    #[test]
    fn reads_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"jpeg bytes").unwrap();

        let phase = LocalImageSource::new().fetch(file.path().to_str().unwrap());
        assert_eq!(phase, ImagePhase::Ready(b"jpeg bytes".to_vec()));
        assert!(!phase.shows_placeholder());
    }

    #[test]
    fn accepts_file_urls() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"x").unwrap();
        let url = format!("file://{}", file.path().display());

        assert!(matches!(
            LocalImageSource::new().fetch(&url),
            ImagePhase::Ready(_)
        ));
    }

    #[test]
    fn remote_and_missing_images_fail_with_placeholder() {
        let source = LocalImageSource::new();
        let remote = source.fetch("https://example.com/a.jpg");
        let missing = source.fetch("/definitely/not/here.jpg");

        assert!(matches!(remote, ImagePhase::Failed(_)));
        assert!(matches!(missing, ImagePhase::Failed(_)));
        assert!(remote.shows_placeholder());
        assert!(missing.into_photo().is_none());
    }

    #[test]
    fn slot_fetches_once() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let mut slot = ImageSlot::new("cover.jpg");
        assert_eq!(slot.location(), "cover.jpg");
        assert!(slot.phase().shows_placeholder());

        slot.resolve(&source);
        slot.resolve(&source);

        assert_eq!(source.calls.get(), 1);
        assert!(slot.into_photo().is_some());
    }
}
