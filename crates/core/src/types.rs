/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A calendar day a completion counts toward. Serializes as `YYYY-MM-DD`.
pub type CalendarDate = chrono::NaiveDate;
