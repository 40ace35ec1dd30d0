//! SQL schema for the Nivaran SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS profiles (
    profile_id         TEXT PRIMARY KEY,
    name               TEXT NOT NULL,
    email              TEXT NOT NULL UNIQUE,
    password_hash      TEXT NOT NULL,   -- argon2 PHC string
    role               TEXT NOT NULL DEFAULT 'user',  -- 'user' | 'admin'
    preferred_language TEXT NOT NULL DEFAULT 'en',
    created_at         TEXT NOT NULL
);

-- Bearer-token sessions. Only the SHA-256 digest of a token is stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    profile_id TEXT NOT NULL REFERENCES profiles(profile_id),
    created_at TEXT NOT NULL
);

-- Sub-category/question definitions are embedded JSON, parsed leniently
-- on read. Treated as read-only reference data.
CREATE TABLE IF NOT EXISTS sectors (
    sector_id      TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    sub_categories TEXT NOT NULL DEFAULT '[]',
    created_at     TEXT NOT NULL
);

-- Complaints are created once and never deleted. The only UPDATEs ever
-- issued set status/updated_at.
CREATE TABLE IF NOT EXISTS complaints (
    complaint_id         TEXT PRIMARY KEY,
    title                TEXT NOT NULL,
    description          TEXT NOT NULL,
    submission_type      TEXT NOT NULL,   -- 'complaint' | 'feedback' | 'compliment'
    sector_id            TEXT REFERENCES sectors(sector_id),
    status               TEXT,            -- NULL reads as pending
    language             TEXT NOT NULL DEFAULT 'en',
    is_public            INTEGER NOT NULL DEFAULT 1,
    attachments          TEXT NOT NULL DEFAULT '[]',  -- JSON metadata list
    feedback_category    TEXT,
    compliment_recipient TEXT,
    submitter_name       TEXT,
    submitter_email      TEXT,
    state                TEXT,
    district             TEXT,
    incident_date        TEXT,            -- ISO 8601 calendar date
    sub_category         TEXT,
    answers              TEXT NOT NULL DEFAULT '{}',  -- question id -> answer
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL,
    user_id              TEXT REFERENCES profiles(profile_id)
);

-- Append-only log of notes on a complaint; read newest-first.
CREATE TABLE IF NOT EXISTS complaint_updates (
    update_id    TEXT PRIMARY KEY,
    complaint_id TEXT NOT NULL REFERENCES complaints(complaint_id),
    author_id    TEXT NOT NULL REFERENCES profiles(profile_id),
    content      TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS community_posts (
    post_id    TEXT PRIMARY KEY,
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    post_type  TEXT NOT NULL,
    sector_id  TEXT REFERENCES sectors(sector_id),
    upvotes    INTEGER NOT NULL DEFAULT 0,
    views      INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    author_id  TEXT REFERENCES profiles(profile_id)
);

CREATE INDEX IF NOT EXISTS complaints_user_idx    ON complaints(user_id);
CREATE INDEX IF NOT EXISTS complaints_sector_idx  ON complaints(sector_id);
CREATE INDEX IF NOT EXISTS complaints_created_idx ON complaints(created_at);
CREATE INDEX IF NOT EXISTS updates_complaint_idx  ON complaint_updates(complaint_id);
CREATE INDEX IF NOT EXISTS posts_type_idx         ON community_posts(post_type);
CREATE INDEX IF NOT EXISTS sessions_profile_idx   ON sessions(profile_id);

PRAGMA user_version = 1;
";
