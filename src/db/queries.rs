pub const CREATE_INCIDENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS incidentes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cargo_id TEXT,
    vehicle_id TEXT,
    employee_id TEXT,
    type TEXT,
    description TEXT,
    lat REAL,
    lon REAL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

pub const INCIDENT_COLUMNS: &str = r#"
SELECT name FROM pragma_table_info('incidentes');
"#;

pub const INSERT_INCIDENT: &str = r#"
INSERT INTO incidentes (cargo_id, vehicle_id, employee_id, type, description, lat, lon)
VALUES (?, ?, ?, ?, ?, ?, ?);
"#;

pub const SELECT_INCIDENT_BY_ID: &str = r#"
SELECT id, cargo_id, vehicle_id, employee_id, type, description, lat, lon, created_at
FROM incidentes
WHERE id = ?;
"#;

// Older databases predate created_at.
pub const SELECT_INCIDENT_BY_ID_LEGACY: &str = r#"
SELECT id, cargo_id, vehicle_id, employee_id, type, description, lat, lon, NULL AS created_at
FROM incidentes
WHERE id = ?;
"#;

pub const SELECT_RECENT_INCIDENTS: &str = r#"
SELECT id, cargo_id, vehicle_id, employee_id, type, description, lat, lon, created_at
FROM incidentes
ORDER BY id DESC
LIMIT ?;
"#;

pub const SELECT_RECENT_INCIDENTS_LEGACY: &str = r#"
SELECT id, cargo_id, vehicle_id, employee_id, type, description, lat, lon, NULL AS created_at
FROM incidentes
ORDER BY id DESC
LIMIT ?;
"#;

pub const DELETE_INCIDENT: &str = r#"
DELETE FROM incidentes WHERE id = ?;
"#;

pub const SELECT_USER_BY_RUT: &str = r#"
SELECT rut, is_active FROM users WHERE rut = ? LIMIT 1;
"#;

pub const SELECT_TABLE_NAMES: &str = r#"
SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;
"#;

pub const SELECT_ALL_INCIDENTS: &str = r#"
SELECT id, cargo_id, employee_id, type FROM incidentes ORDER BY id;
"#;

pub const COUNT_INCIDENTS: &str = r#"
SELECT COUNT(*) FROM incidentes;
"#;

pub const DELETE_ALL_INCIDENTS: &str = r#"
DELETE FROM incidentes;
"#;

pub const RESET_INCIDENT_SEQUENCE: &str = r#"
DELETE FROM sqlite_sequence WHERE name = 'incidentes';
"#;

pub const BEGIN_IMMEDIATE: &str = "BEGIN IMMEDIATE;";

pub const COMMIT: &str = "COMMIT;";

pub const ROLLBACK: &str = "ROLLBACK;";
