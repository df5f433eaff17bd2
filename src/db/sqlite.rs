use crate::db::models::LoginRecord;
use crate::db::schema::SQLITE_INIT;
use crate::error::StoreError;
use crate::service::connection_actor::ConnectionManager;
use crate::types::{NormalizedEmail, Password};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub type SqlitePool = Pool<Sqlite>;

/// Execute the bundled DDL statement by statement.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}

/// Append-only store of login records.
///
/// Uses whatever pool the [`ConnectionManager`] currently holds and never
/// connects on its own: callers run `ensure_connected` first.
#[derive(Clone)]
pub struct LoginRecordStore {
    connection: ConnectionManager,
}

impl LoginRecordStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    async fn pool(&self) -> Result<SqlitePool, StoreError> {
        self.connection
            .current_pool()
            .await?
            .ok_or(StoreError::NotConnected)
    }

    /// Normalize, validate and insert one record. No retries.
    pub async fn append(
        &self,
        email: impl AsRef<str>,
        password: impl Into<String>,
    ) -> Result<LoginRecord, StoreError> {
        let email = NormalizedEmail::parse(email)?;
        let password = Password::parse(password)?;
        let pool = self.pool().await?;

        let now = Utc::now();
        let stamp = now.to_rfc3339();
        let result = sqlx::query(
            r#"
            INSERT INTO login_records (email, password, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(email.as_str())
        .bind(password.as_str())
        .bind(&stamp)
        .bind(&stamp)
        .execute(&pool)
        .await?;

        Ok(LoginRecord {
            id: result.last_insert_rowid(),
            email: email.into_inner(),
            password: password.into_inner(),
            created_at: now,
            updated_at: now,
        })
    }

    /// All records, oldest first.
    pub async fn list(&self) -> Result<Vec<LoginRecord>, StoreError> {
        let pool = self.pool().await?;
        let rows = sqlx::query(
            r#"SELECT id, email, password, created_at, updated_at
               FROM login_records ORDER BY id"#,
        )
        .fetch_all(&pool)
        .await?;
        rows.into_iter()
            .map(|row| Self::row_to_model(row).map_err(StoreError::from))
            .collect()
    }

    fn row_to_model(row: SqliteRow) -> Result<LoginRecord, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let email: String = row.try_get("email")?;
        let password: String = row.try_get("password")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(LoginRecord {
            id,
            email,
            password,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc))
}
