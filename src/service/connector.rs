use crate::db::{SqlitePool, init_schema};
use crate::error::ConnectionError;
use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const MEMORY_ENDPOINT: &str = ":memory:";

/// Where to connect: endpoint, logical database name and the selection timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbTarget {
    pub url: String,
    pub name: String,
    pub timeout: Duration,
}

impl DbTarget {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            timeout: Duration::from_secs(7),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> &str {
        self.url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))
            .unwrap_or(&self.url)
    }

    pub fn is_memory(&self) -> bool {
        self.endpoint() == MEMORY_ENDPOINT
    }

    /// Database file for this target: `<endpoint dir>/<name>.sqlite`.
    pub fn database_path(&self) -> Option<PathBuf> {
        if self.is_memory() {
            return None;
        }
        Some(PathBuf::from(self.endpoint()).join(format!("{}.sqlite", self.name)))
    }
}

/// One connect operation against a target. Implementations must not retry.
pub trait Connect: Send + Sync + 'static {
    fn connect(&self, target: &DbTarget) -> BoxFuture<'static, Result<SqlitePool, ConnectionError>>;
}

/// Opens a SQLite pool for the target and makes sure the schema exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConnector;

impl Connect for SqliteConnector {
    fn connect(&self, target: &DbTarget) -> BoxFuture<'static, Result<SqlitePool, ConnectionError>> {
        let target = target.clone();
        Box::pin(async move {
            let pool = match target.database_path() {
                Some(path) => {
                    let opts = SqliteConnectOptions::new()
                        .filename(path)
                        .create_if_missing(true)
                        .busy_timeout(Duration::from_secs(5));
                    SqlitePoolOptions::new()
                        .acquire_timeout(target.timeout)
                        .connect_with(opts)
                        .await?
                }
                None => {
                    // An in-memory database lives only as long as its single connection.
                    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
                    SqlitePoolOptions::new()
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None)
                        .acquire_timeout(target.timeout)
                        .connect_with(opts)
                        .await?
                }
            };
            init_schema(&pool).await?;
            Ok(pool)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_file_is_named_after_the_logical_database() {
        let target = DbTarget::new("sqlite://./data", "projectSchool");
        assert_eq!(
            target.database_path(),
            Some(PathBuf::from("./data/projectSchool.sqlite"))
        );

        let bare = DbTarget::new("/var/lib/stepform", "school");
        assert_eq!(
            bare.database_path(),
            Some(PathBuf::from("/var/lib/stepform/school.sqlite"))
        );
    }

    #[test]
    fn memory_endpoint_has_no_file() {
        let target = DbTarget::new("sqlite::memory:", "ignored");
        assert!(target.is_memory());
        assert_eq!(target.database_path(), None);
    }

    #[tokio::test]
    async fn missing_directory_fails_to_connect() {
        let target = DbTarget::new("sqlite:///nonexistent-stepform-dir/nested", "school")
            .with_timeout(Duration::from_secs(2));
        let result = SqliteConnector.connect(&target).await;
        assert!(matches!(
            result,
            Err(ConnectionError::Other(_)) | Err(ConnectionError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn memory_target_connects_and_creates_schema() {
        let target = DbTarget::new("sqlite::memory:", "school");
        let pool = SqliteConnector
            .connect(&target)
            .await
            .expect("in-memory connect failed");
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM login_records")
            .fetch_one(&pool)
            .await
            .expect("schema missing");
        assert_eq!(count, 0);
    }
}
