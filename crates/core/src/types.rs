/// All row identifiers are server-assigned UUIDs.
pub type DbId = uuid::Uuid;

/// User identifiers issued by the hosted identity provider.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
