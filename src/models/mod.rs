pub mod location;
pub mod status;

pub use location::{LocationFix, LocationPoint, PointId, PointRow};
pub use status::StatusEvent;
