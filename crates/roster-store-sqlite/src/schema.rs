//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    record_id            TEXT NOT NULL UNIQUE,   -- '{TYPE}-{NNN}'; never rewritten
    type                 TEXT NOT NULL CHECK (type IN ('IND', 'INF')),
    full_name            TEXT,
    preferred_name       TEXT,
    gender               TEXT,
    birth_date           TEXT,                   -- YYYY-MM-DD or NULL
    email                TEXT,
    phone                TEXT,
    city                 TEXT,
    country              TEXT,
    occupation           TEXT,
    interests            TEXT,
    notes                TEXT,
    collaboration_status TEXT,
    languages            TEXT,
    last_contact_date    TEXT,                   -- YYYY-MM-DD or NULL
    portfolio_url        TEXT,
    created_at           TEXT NOT NULL,          -- RFC 3339 UTC
    updated_at           TEXT NOT NULL
);

-- Present iff the owning person's type is 'INF'.
CREATE TABLE IF NOT EXISTS influencer_profiles (
    id                        INTEGER PRIMARY KEY AUTOINCREMENT,
    people_id                 INTEGER NOT NULL UNIQUE
                              REFERENCES people(id) ON DELETE CASCADE,
    category                  TEXT,
    primary_platform          TEXT,
    primary_followers         INTEGER,
    total_followers_count     INTEGER,
    engagement_rate           REAL,
    engagement_rate_tier      TEXT,
    secondary_platform        TEXT,
    secondary_followers_count INTEGER,
    average_monthly_reach     INTEGER,
    created_at                TEXT NOT NULL,
    updated_at                TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS accounts (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    full_name     TEXT,
    password_hash TEXT NOT NULL,             -- argon2 PHC string
    role          TEXT NOT NULL,             -- 'admin' | 'editor' | 'viewer'
    status        TEXT NOT NULL DEFAULT 'active',
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS people_type_idx   ON people(type);
CREATE INDEX IF NOT EXISTS people_city_idx   ON people(city);
CREATE INDEX IF NOT EXISTS profiles_cat_idx  ON influencer_profiles(category);

PRAGMA user_version = 1;
";
