//! SQL schema for the Gigboard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    uid           TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,   -- trimmed, lower-cased
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- The signed-in identity survives restarts, like a browser SDK's persisted
-- auth state. At most one row.
CREATE TABLE IF NOT EXISTS current_session (
    slot INTEGER PRIMARY KEY CHECK (slot = 1),
    uid  TEXT NOT NULL REFERENCES accounts(uid)
);

-- `seq` gives queries a stable insertion order.
CREATE TABLE IF NOT EXISTS documents (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    doc_id     TEXT NOT NULL UNIQUE,
    collection TEXT NOT NULL,
    body_json  TEXT NOT NULL,   -- JSON object; never contains the doc id
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents(collection, seq);

PRAGMA user_version = 1;
";
