pub mod directory;
pub mod photos;
/// YAML serialization of trips.
pub mod trip_file;

pub use directory::{
    Directory, DirectoryLoadError, InitError, Loaded, SaveAllError, SaveError, Unloaded,
};
pub use photos::PhotoStore;
pub use trip_file::{LoadError, TripFile};
