/// Discord snowflake ids, kept as strings end to end.
pub type DiscordId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
