//! SQLite schema definition.

/// Complete database schema for vetdesk.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS veterinarians (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    license_number TEXT,
    work_schedule TEXT,                          -- JSON WorkSchedule, NULL = unrestricted
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS service_types (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT NOT NULL CHECK (category IN (
        'consultation', 'exam', 'vaccination', 'surgery', 'grooming', 'hospitalization'
    )),
    price REAL NOT NULL DEFAULT 0,
    duration_minutes INTEGER NOT NULL DEFAULT 30,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    unit_price REAL NOT NULL DEFAULT 0,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Appointments
-- ============================================================================

CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    animal_id TEXT NOT NULL,                     -- owned by the external animal registry
    veterinarian_id TEXT REFERENCES veterinarians(id),
    service_type_id TEXT NOT NULL REFERENCES service_types(id),
    room_id TEXT,
    date TEXT NOT NULL,                          -- YYYY-MM-DD
    time TEXT NOT NULL,                          -- HH:MM
    status TEXT NOT NULL DEFAULT 'scheduled' CHECK (status IN (
        'scheduled', 'confirmed', 'in_progress', 'completed', 'cancelled', 'no_show'
    )),
    products TEXT NOT NULL DEFAULT '[]',         -- JSON array of AppointmentProduct
    total_price REAL NOT NULL DEFAULT 0,
    notes TEXT,
    cancellation_reason TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_appointments_slot ON appointments(date, time);
CREATE INDEX IF NOT EXISTS idx_appointments_animal ON appointments(animal_id, date);
CREATE INDEX IF NOT EXISTS idx_appointments_vet ON appointments(veterinarian_id, date);

-- ============================================================================
-- Settings (single row)
-- ============================================================================

CREATE TABLE IF NOT EXISTS clinic_settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    policy TEXT NOT NULL,                        -- JSON ClinicPolicy
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Point of sale hand-off
-- ============================================================================

CREATE TABLE IF NOT EXISTS pending_sales (
    id TEXT PRIMARY KEY,
    appointment_id TEXT NOT NULL UNIQUE REFERENCES appointments(id),
    summary TEXT NOT NULL,                       -- JSON PricedSummary
    subtotal REAL NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'exported')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    exported_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_pending_sales_status ON pending_sales(status);

-- ============================================================================
-- Vaccination records
-- ============================================================================

CREATE TABLE IF NOT EXISTS vaccination_records (
    id TEXT PRIMARY KEY,
    animal_id TEXT NOT NULL,
    vaccine_name TEXT NOT NULL,
    veterinarian_id TEXT REFERENCES veterinarians(id),
    series_id TEXT NOT NULL,
    sequence_number INTEGER NOT NULL,
    application_date TEXT NOT NULL,
    due_interval_days INTEGER NOT NULL,
    next_due TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('applied', 'scheduled', 'canceled')),
    cancellation_reason TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (series_id, sequence_number)
);

-- A canceled dose must carry its reason
CREATE TRIGGER IF NOT EXISTS vaccination_cancel_reason BEFORE UPDATE ON vaccination_records
WHEN new.status = 'canceled' AND (new.cancellation_reason IS NULL OR trim(new.cancellation_reason) = '')
BEGIN
    SELECT RAISE(ABORT, 'Canceled doses require a reason');
END;

CREATE INDEX IF NOT EXISTS idx_vaccinations_animal ON vaccination_records(animal_id, application_date);
"#;
