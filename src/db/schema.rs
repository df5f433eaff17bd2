//! SQL DDL for the login record collection.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT
/// - `email` normalized (trimmed, lowercased), `password` verbatim
/// - `created_at`/`updated_at` RFC3339 text, written once at insert
///
/// No secondary indexes: rows are only ever appended.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS login_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL CHECK (length(email) > 0),
    password TEXT NOT NULL CHECK (length(password) > 0),
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL  -- RFC3339
);
"#;
