//! Registration gate: an incident is only stored when the reporting employee
//! is a known, active user.

use crate::db::queries;
use crate::models::incident::{normalize_rut, Incident, NewIncident, RegisteredIncident};
use crate::models::user::User;
use crate::service::store;
use sqlx::SqliteConnection;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("employee RUT {0} is not registered; only registered users may report incidents")]
    UnregisteredEmployee(String),

    #[error("employee RUT {0} is inactive and cannot report incidents")]
    InactiveEmployee(String),

    #[error("storage fault: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Validates the employee and stores the incident in a single write
/// transaction. Nothing is written when validation fails.
///
/// The transaction is closed explicitly, so the future must run to
/// completion; the HTTP handler drives it from a spawned task.
pub async fn register_incident(
    conn: &mut SqliteConnection,
    request: NewIncident,
) -> Result<RegisteredIncident, RegistrationError> {
    let rut = normalize_rut(&request.employee_id);

    // A deferred BEGIN holding a read lock cannot upgrade to a writer while
    // another connection writes; SQLite fails it with SQLITE_BUSY at once.
    sqlx::query(queries::BEGIN_IMMEDIATE)
        .execute(&mut *conn)
        .await?;

    let outcome = match validate_and_insert(conn, request, rut).await {
        Ok(incident) => sqlx::query(queries::COMMIT)
            .execute(&mut *conn)
            .await
            .map(|_| incident)
            .map_err(RegistrationError::from),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(incident) => {
            info!(
                "Registered incident {} for employee {}",
                incident.id, incident.employee_id
            );
            Ok(RegisteredIncident::validated(incident))
        }
        Err(e) => {
            if let Err(rollback) = sqlx::query(queries::ROLLBACK).execute(&mut *conn).await {
                error!("Rollback after failed registration failed: {}", rollback);
            }
            Err(e)
        }
    }
}

async fn validate_and_insert(
    conn: &mut SqliteConnection,
    request: NewIncident,
    rut: String,
) -> Result<Incident, RegistrationError> {
    let user: Option<User> = sqlx::query_as(queries::SELECT_USER_BY_RUT)
        .bind(&rut)
        .fetch_optional(&mut *conn)
        .await?;

    match user {
        None => {
            warn!("Rejected incident from unregistered RUT {}", rut);
            return Err(RegistrationError::UnregisteredEmployee(rut));
        }
        Some(user) if !user.is_active => {
            warn!("Rejected incident from inactive RUT {}", user.rut);
            return Err(RegistrationError::InactiveEmployee(rut));
        }
        Some(_) => {}
    }

    let incident = store::insert(
        conn,
        &NewIncident {
            employee_id: rut,
            ..request
        },
    )
    .await?;
    Ok(incident)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_pool, memory_pool, seed_users};
    use crate::models::incident::Location;
    use std::collections::HashSet;

    fn request(employee_id: &str) -> NewIncident {
        NewIncident {
            cargo_id: "C-77".to_string(),
            vehicle_id: "TRUCK-9".to_string(),
            employee_id: employee_id.to_string(),
            kind: "spill".to_string(),
            description: "pallet leaking".to_string(),
            location: Location {
                lat: -33.45,
                lon: -70.66,
            },
        }
    }

    #[tokio::test]
    async fn test_registers_normalized_employee() {
        let pool = memory_pool().await;
        seed_users(&pool, &[("AB-123", true)]).await;
        let mut conn = pool.acquire().await.unwrap();

        let registered = register_incident(&mut conn, request(" ab-123 "))
            .await
            .unwrap();

        assert!(registered.validated);
        assert_eq!(registered.status, "ok");
        assert_eq!(registered.incident.employee_id, "AB-123");

        let listed = store::list_recent(&mut conn, 1).await.unwrap();
        assert_eq!(listed, vec![registered.incident]);
    }

    #[tokio::test]
    async fn test_ids_increase_across_registrations() {
        let pool = memory_pool().await;
        seed_users(&pool, &[("AB-123", true)]).await;
        let mut conn = pool.acquire().await.unwrap();

        let first = register_incident(&mut conn, request("AB-123")).await.unwrap();
        let second = register_incident(&mut conn, request("ab-123")).await.unwrap();
        assert!(second.incident.id > first.incident.id);
    }

    #[tokio::test]
    async fn test_rejects_unregistered_employee() {
        let pool = memory_pool().await;
        seed_users(&pool, &[("AB-123", true)]).await;
        let mut conn = pool.acquire().await.unwrap();

        let err = register_incident(&mut conn, request("xy-999"))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::UnregisteredEmployee(ref rut) if rut == "XY-999"));
        assert!(err.to_string().contains("XY-999"));
        assert!(store::list_recent(&mut conn, 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_inactive_employee() {
        let pool = memory_pool().await;
        seed_users(&pool, &[("AB-123", true), ("CD-456", false)]).await;
        let mut conn = pool.acquire().await.unwrap();

        register_incident(&mut conn, request("AB-123")).await.unwrap();
        let err = register_incident(&mut conn, request("cd-456"))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::InactiveEmployee(ref rut) if rut == "CD-456"));
        assert_eq!(store::list_recent(&mut conn, 50).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_users_table_is_storage_fault() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let err = register_incident(&mut conn, request("AB-123"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Storage(_)));
    }

    #[tokio::test]
    async fn test_failed_registration_leaves_connection_usable() {
        let pool = memory_pool().await;
        seed_users(&pool, &[("AB-123", true)]).await;
        let mut conn = pool.acquire().await.unwrap();

        register_incident(&mut conn, request("XY-999"))
            .await
            .unwrap_err();
        // The rejected attempt must have closed its transaction.
        let registered = register_incident(&mut conn, request("AB-123"))
            .await
            .unwrap();
        assert_eq!(registered.incident.id, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("incidents.db").display());
        let pool = init_pool(&url, 5).await.unwrap();
        seed_users(&pool, &[("AB-123", true)]).await;

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    let mut conn = pool.acquire().await?;
                    register_incident(&mut conn, request(" ab-123 ")).await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            let registered = handle.await.unwrap().unwrap();
            assert_eq!(registered.incident.employee_id, "AB-123");
            ids.push(registered.incident.id);
        }

        let distinct: HashSet<i64> = ids.iter().copied().collect();
        assert_eq!(distinct.len(), 100);
        ids.sort_unstable();
        assert_eq!(ids, (1..=100).collect::<Vec<i64>>());

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(store::list_recent(&mut conn, 50).await.unwrap()[0].id, 100);
    }
}
