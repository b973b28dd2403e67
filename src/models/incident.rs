use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// Flat shape of an `incidentes` row; `lat`/`lon` are reassembled into
/// [`Location`] when converted to [`Incident`].
#[derive(Debug, FromRow)]
pub struct IncidentRow {
    pub id: i64,
    pub cargo_id: String,
    pub vehicle_id: String,
    pub employee_id: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub description: String,
    pub lat: f64,
    pub lon: f64,
    pub created_at: Option<NaiveDateTime>, // absent on legacy tables
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Incident {
    pub id: i64,
    pub cargo_id: String,
    pub vehicle_id: String,
    pub employee_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub location: Location,
    pub created_at: Option<NaiveDateTime>,
}

impl From<IncidentRow> for Incident {
    fn from(row: IncidentRow) -> Self {
        Self {
            id: row.id,
            cargo_id: row.cargo_id,
            vehicle_id: row.vehicle_id,
            employee_id: row.employee_id,
            kind: row.kind,
            description: row.description,
            location: Location {
                lat: row.lat,
                lon: row.lon,
            },
            created_at: row.created_at,
        }
    }
}

/// Registration request body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewIncident {
    pub cargo_id: String,
    pub vehicle_id: String,
    pub employee_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub location: Location,
}

impl NewIncident {
    /// Rejects field values no incident can carry. Returns a message fit for
    /// the client.
    pub fn check(&self) -> Result<(), String> {
        if self.employee_id.trim().is_empty() {
            return Err("employee_id must not be blank".to_string());
        }
        let Location { lat, lon } = self.location;
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(format!("location.lat {} is outside [-90, 90]", lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(format!("location.lon {} is outside [-180, 180]", lon));
        }
        Ok(())
    }
}

/// Trims and uppercases an employee RUT before lookup and storage.
pub fn normalize_rut(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A freshly registered incident, marked as having passed the employee gate.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredIncident {
    #[serde(flatten)]
    pub incident: Incident,
    pub status: &'static str,
    pub validated: bool,
}

impl RegisteredIncident {
    pub fn validated(incident: Incident) -> Self {
        Self {
            incident,
            status: "ok",
            validated: true,
        }
    }
}
