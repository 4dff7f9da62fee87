//! SQL schema for the Plantafel SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Assignment and absence dates are plain TEXT: legacy records hold either
/// `YYYY-MM-DD` dates or RFC 3339 instants, and both sort correctly on their
/// first ten characters.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS employees (
    employee_id TEXT PRIMARY KEY,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    active      INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS projects (
    project_id    TEXT PRIMARY KEY,
    number        TEXT,
    name          TEXT NOT NULL,
    customer_name TEXT,
    status        TEXT NOT NULL,   -- 'in_planning' | 'active' | 'completed' | 'cancelled'
    street        TEXT,
    postal_code   TEXT,
    city          TEXT
);

-- Loosely typed on purpose: rows are parsed and validated on read.
CREATE TABLE IF NOT EXISTS assignments (
    assignment_id  TEXT PRIMARY KEY,
    employee_id    TEXT,           -- NULL = unassigned
    employee_name  TEXT,
    project_id     TEXT,
    project_name   TEXT,
    start_at       TEXT,
    end_at         TEXT,
    role           TEXT,
    planned_hours  REAL,
    notes          TEXT,
    confirmed      INTEGER NOT NULL DEFAULT 0,
    setup_date     TEXT,           -- whole-day markers
    teardown_date  TEXT,
    setup_start    TEXT,           -- legacy timed windows
    setup_end      TEXT,
    setup_hours    REAL,
    teardown_start TEXT,
    teardown_end   TEXT,
    teardown_hours REAL,
    created_at     TEXT,
    updated_at     TEXT
);

CREATE TABLE IF NOT EXISTS absences (
    absence_id    TEXT PRIMARY KEY,
    employee_id   TEXT,
    employee_name TEXT,
    start_at      TEXT,
    end_at        TEXT,
    kind          TEXT,
    status        TEXT,            -- 'requested' | 'approved' | 'rejected'
    reason        TEXT
);

-- Entries derived from confirmed assignments; replaced wholesale on sync.
CREATE TABLE IF NOT EXISTS time_entries (
    entry_id      TEXT PRIMARY KEY,
    assignment_id TEXT NOT NULL,
    employee_id   TEXT,
    employee_name TEXT,
    project_id    TEXT NOT NULL,
    project_name  TEXT NOT NULL,
    work_date     TEXT NOT NULL,   -- YYYY-MM-DD
    from_time     TEXT NOT NULL,   -- HH:MM
    to_time       TEXT NOT NULL,
    hours         REAL NOT NULL,
    activity      TEXT NOT NULL,   -- 'setup' | 'teardown'
    status        TEXT NOT NULL,
    description   TEXT NOT NULL,
    auto_created  INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS assignments_employee_idx ON assignments(employee_id);
CREATE INDEX IF NOT EXISTS assignments_project_idx  ON assignments(project_id);
CREATE INDEX IF NOT EXISTS assignments_start_idx    ON assignments(start_at);
CREATE INDEX IF NOT EXISTS absences_employee_idx    ON absences(employee_id);
CREATE INDEX IF NOT EXISTS time_entries_assign_idx  ON time_entries(assignment_id);

PRAGMA user_version = 1;
";
