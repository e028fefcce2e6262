pub use crate::element_set::{ElementSetError, OrbitalElementSet};
pub use crate::parser::{find_element_set, parse_catalog, ParseError};

pub mod element_set;
pub mod parser;

/// Fixed width of a single element line, checksum column included
pub const ELEMENT_LINE_LEN: usize = 69;

/// Element sets older (or younger) than this are not trusted for prediction
pub const RELIABLE_PREDICTION_HORIZON_DAYS: i64 = 14;
