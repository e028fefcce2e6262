pub use crate::geo::{EarthCenteredPosition, GeoPosition};
pub use crate::observer::ObserverLocation;
pub use crate::pass::{Pass, PassEvent, PassEventKind};
pub use crate::time::UtcTimestamp;
pub use crate::tle::UnstructuredTle;
pub use crate::track::TrackPoint;
