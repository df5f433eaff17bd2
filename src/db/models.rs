use chrono::{DateTime, Utc};
use serde::Serialize;

/// One submitted email/password pair as persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginRecord {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
