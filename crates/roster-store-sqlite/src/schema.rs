//! SQL schema for the roster SQLite store.
//!
//! Executed once at connection startup. The version is stamped into
//! `PRAGMA user_version` so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Names and titles compare without regard to case.
CREATE TABLE IF NOT EXISTS department (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE COLLATE NOCASE
);

CREATE TABLE IF NOT EXISTS occupation (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    title          TEXT NOT NULL COLLATE NOCASE,
    salary         TEXT NOT NULL,   -- exact decimal, canonical text form
    department_id  INTEGER NOT NULL REFERENCES department(id),
    UNIQUE (title, department_id)
);

CREATE TABLE IF NOT EXISTS employee (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name     TEXT NOT NULL COLLATE NOCASE,
    last_name      TEXT NOT NULL COLLATE NOCASE,
    occupation_id  INTEGER REFERENCES occupation(id),
    manager_id     INTEGER REFERENCES employee(id),
    CHECK (manager_id IS NULL OR manager_id != id)
);

-- Archive of removed employees. Append-only: no UPDATE or DELETE is ever
-- issued against this table. prior_occupation is a title, not a key.
CREATE TABLE IF NOT EXISTS former_employees (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name        TEXT NOT NULL,
    last_name         TEXT NOT NULL,
    prior_occupation  TEXT,
    laid_off_date     TEXT NOT NULL   -- YYYY-MM-DD
);

CREATE INDEX IF NOT EXISTS occupation_department_idx ON occupation(department_id);
CREATE INDEX IF NOT EXISTS employee_occupation_idx   ON employee(occupation_id);
CREATE INDEX IF NOT EXISTS employee_manager_idx      ON employee(manager_id);

PRAGMA user_version = 1;
";
