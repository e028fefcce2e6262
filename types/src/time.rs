/// All instants are carried in UTC; local zones only exist at the presentation edge
pub type UtcTimestamp = chrono::DateTime<chrono::Utc>;
