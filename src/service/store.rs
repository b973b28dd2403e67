//! Incident store: CRUD over the `incidentes` table.
//!
//! Every operation takes the connection it runs on; callers decide whether
//! that is a pooled connection or an open transaction.

use crate::db::queries;
use crate::models::incident::{Incident, IncidentRow, NewIncident};
use sqlx::SqliteConnection;
use tracing::debug;

/// What the `incidentes` table looks like in the opened database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Missing,
    /// Table predates the `created_at` column.
    Legacy,
    Current,
}

pub async fn ensure_schema(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(queries::CREATE_INCIDENTS_TABLE)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn probe_schema(conn: &mut SqliteConnection) -> Result<SchemaState, sqlx::Error> {
    let columns: Vec<String> = sqlx::query_scalar(queries::INCIDENT_COLUMNS)
        .fetch_all(&mut *conn)
        .await?;

    let state = if columns.is_empty() {
        SchemaState::Missing
    } else if columns.iter().any(|c| c == "created_at") {
        SchemaState::Current
    } else {
        SchemaState::Legacy
    };
    debug!("incidentes schema: {:?}", state);
    Ok(state)
}

/// Persists `incident` as given and returns the row re-read by its new id,
/// storage defaults included.
pub async fn insert(
    conn: &mut SqliteConnection,
    incident: &NewIncident,
) -> Result<Incident, sqlx::Error> {
    ensure_schema(conn).await?;

    let new_id = sqlx::query(queries::INSERT_INCIDENT)
        .bind(&incident.cargo_id)
        .bind(&incident.vehicle_id)
        .bind(&incident.employee_id)
        .bind(&incident.kind)
        .bind(&incident.description)
        .bind(incident.location.lat)
        .bind(incident.location.lon)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    let reread = match probe_schema(conn).await? {
        SchemaState::Legacy => queries::SELECT_INCIDENT_BY_ID_LEGACY,
        _ => queries::SELECT_INCIDENT_BY_ID,
    };
    let row: IncidentRow = sqlx::query_as(reread)
        .bind(new_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(row.into())
}

/// Most recent incidents first, at most `limit` of them.
pub async fn list_recent(
    conn: &mut SqliteConnection,
    limit: u32,
) -> Result<Vec<Incident>, sqlx::Error> {
    let query = match probe_schema(conn).await? {
        SchemaState::Missing => return Ok(Vec::new()),
        SchemaState::Legacy => queries::SELECT_RECENT_INCIDENTS_LEGACY,
        SchemaState::Current => queries::SELECT_RECENT_INCIDENTS,
    };

    let rows: Vec<IncidentRow> = sqlx::query_as(query)
        .bind(i64::from(limit))
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.into_iter().map(Incident::from).collect())
}

/// Removes the incident with `id`. Returns whether a row existed.
pub async fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    if probe_schema(conn).await? == SchemaState::Missing {
        return Ok(false);
    }

    let affected = sqlx::query(queries::DELETE_INCIDENT)
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(affected > 0)
}
