//! SQL schema for the dockboard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Reference tables ─────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS drivers (
    driver_id  TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'active',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS trucks (
    truck_id   TEXT PRIMARY KEY,
    number     TEXT NOT NULL UNIQUE,
    kind       TEXT NOT NULL DEFAULT 'tractor',   -- 'tractor' | 'box_truck'
    status     TEXT NOT NULL DEFAULT 'active',
    notes      TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS trailers (
    trailer_id TEXT PRIMARY KEY,
    number     TEXT NOT NULL UNIQUE,
    kind       TEXT NOT NULL DEFAULT 'standard',  -- 'standard' | 'transfer'
    status     TEXT NOT NULL DEFAULT 'active',
    notes      TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS loaders (
    loader_id  TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'active',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS routes (
    route_id    TEXT PRIMARY KEY,
    code        TEXT NOT NULL UNIQUE,
    description TEXT,
    status      TEXT NOT NULL DEFAULT 'active',
    created_at  TEXT NOT NULL
);

-- ── Weekly templates ─────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS weekly_templates (
    template_id   TEXT PRIMARY KEY,
    day_of_week   INTEGER NOT NULL CHECK (day_of_week BETWEEN 1 AND 5),
    route_id      TEXT REFERENCES routes(route_id),
    driver_id     TEXT REFERENCES drivers(driver_id),
    truck_id      TEXT REFERENCES trucks(truck_id),
    trailer_id    TEXT REFERENCES trailers(trailer_id),
    dispatch_time TEXT,             -- 'HH:MM:SS'
    backhaul      TEXT,
    notes         TEXT,
    sort_order    INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);

-- ── Daily assignments ────────────────────────────────────────────────────

-- A date either has zero rows here (virtual: templates shown read-only) or
-- carries the whole roster. Promotion inserts all rows of a date in one
-- transaction; finalize/unfinalize update the whole date in one statement.
CREATE TABLE IF NOT EXISTS daily_assignments (
    assignment_id          TEXT PRIMARY KEY,
    date                   TEXT NOT NULL,   -- 'YYYY-MM-DD', local wall-clock
    kind                   TEXT NOT NULL DEFAULT 'standard',
    route_id               TEXT REFERENCES routes(route_id),
    driver_id              TEXT REFERENCES drivers(driver_id),
    truck_id               TEXT REFERENCES trucks(truck_id),
    trailer_id             TEXT REFERENCES trailers(trailer_id),
    dispatch_time          TEXT,
    backhaul               TEXT,
    notes                  TEXT,
    planning_status        TEXT NOT NULL DEFAULT 'draft',
    loading_status         TEXT NOT NULL DEFAULT 'not_started',
    modified_from_template INTEGER NOT NULL DEFAULT 0,
    sort_order             INTEGER NOT NULL DEFAULT 0,
    created_at             TEXT NOT NULL
);

-- ── Dock doors ───────────────────────────────────────────────────────────

-- Soft-deleted via removed_at; only rows with removed_at IS NULL occupy a
-- door. Plan rows survive a roster reset as storage-like occupancy
-- (ON DELETE SET NULL): the trailer is still physically at the door even if
-- the plan was torn up.
CREATE TABLE IF NOT EXISTS door_assignments (
    door_id             TEXT PRIMARY KEY,
    door_number         INTEGER NOT NULL,
    trailer_id          TEXT NOT NULL REFERENCES trailers(trailer_id),
    daily_assignment_id TEXT REFERENCES daily_assignments(assignment_id)
                             ON DELETE SET NULL,
    date                TEXT NOT NULL,
    move_status         TEXT NOT NULL DEFAULT 'at_door',
    assigned_at         TEXT NOT NULL,
    removed_at          TEXT
);

-- At most one active occupant per door per date.
CREATE UNIQUE INDEX IF NOT EXISTS door_active_idx
    ON door_assignments(door_number, date)
    WHERE removed_at IS NULL;

-- A route's trailer sits at no more than one door at a time.
CREATE UNIQUE INDEX IF NOT EXISTS door_assignment_active_idx
    ON door_assignments(daily_assignment_id)
    WHERE removed_at IS NULL AND daily_assignment_id IS NOT NULL;

-- ── Loader crews ─────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS assignment_loaders (
    crew_id       TEXT PRIMARY KEY,
    assignment_id TEXT NOT NULL REFERENCES daily_assignments(assignment_id)
                       ON DELETE CASCADE,
    loader_id     TEXT NOT NULL REFERENCES loaders(loader_id),
    created_at    TEXT NOT NULL,
    UNIQUE (assignment_id, loader_id)
);

CREATE INDEX IF NOT EXISTS assignments_date_idx ON daily_assignments(date);
CREATE INDEX IF NOT EXISTS templates_day_idx    ON weekly_templates(day_of_week);
CREATE INDEX IF NOT EXISTS doors_date_idx       ON door_assignments(date);

PRAGMA user_version = 1;
";
