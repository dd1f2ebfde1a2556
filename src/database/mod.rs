// Database module
// SQLite-backed vector storage and the distance metrics used to search it

pub mod distance;
pub mod sqlite;

pub use distance::DistanceMetric;
pub use sqlite::*;
