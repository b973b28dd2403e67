//! Out-of-band tools that work on the database file directly, bypassing the
//! API: inspect what is stored and wipe the incident table for demo resets.

use crate::db::queries;
use crate::service::store::{self, SchemaState};
use futures::TryStreamExt;
use sqlx::{Connection, FromRow, SqliteConnection};
use tracing::info;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct IncidentSummary {
    pub id: i64,
    pub cargo_id: Option<String>,
    pub employee_id: Option<String>,
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug)]
pub struct Inventory {
    pub tables: Vec<String>,
    /// `None` when the incident table has not been created yet.
    pub incidents: Option<Vec<IncidentSummary>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct PurgeReport {
    pub table_present: bool,
    pub removed: usize,
    pub remaining: i64,
}

async fn incident_summaries(
    conn: &mut SqliteConnection,
) -> Result<Vec<IncidentSummary>, sqlx::Error> {
    sqlx::query_as(queries::SELECT_ALL_INCIDENTS)
        .fetch(&mut *conn)
        .try_collect()
        .await
}

async fn table_names(conn: &mut SqliteConnection) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(queries::SELECT_TABLE_NAMES)
        .fetch(&mut *conn)
        .try_collect()
        .await
}

pub async fn inventory(conn: &mut SqliteConnection) -> Result<Inventory, sqlx::Error> {
    let tables = table_names(conn).await?;
    let incidents = match store::probe_schema(conn).await? {
        SchemaState::Missing => None,
        _ => Some(incident_summaries(conn).await?),
    };
    Ok(Inventory { tables, incidents })
}

/// Deletes every incident and restarts id assignment at 1.
pub async fn purge(conn: &mut SqliteConnection) -> Result<PurgeReport, sqlx::Error> {
    let mut tx = conn.begin().await?;

    if store::probe_schema(&mut tx).await? == SchemaState::Missing {
        return Ok(PurgeReport {
            table_present: false,
            removed: 0,
            remaining: 0,
        });
    }

    let removed = sqlx::query(queries::DELETE_ALL_INCIDENTS)
        .execute(&mut *tx)
        .await?
        .rows_affected() as usize;

    let remaining: i64 = sqlx::query_scalar(queries::COUNT_INCIDENTS)
        .fetch_one(&mut *tx)
        .await?;

    // sqlite_sequence only exists once an AUTOINCREMENT table has been created.
    if table_names(&mut tx).await?.iter().any(|t| t == "sqlite_sequence") {
        sqlx::query(queries::RESET_INCIDENT_SEQUENCE)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    info!("Purged {} incidents", removed);

    Ok(PurgeReport {
        table_present: true,
        removed,
        remaining,
    })
}

fn print_banner(title: &str) {
    println!("\n{}", "=".repeat(80));
    println!("  {}", title);
    println!("{}", "=".repeat(80));
}

fn print_incidents(incidents: &[IncidentSummary]) {
    println!("  Total: {}", incidents.len());
    for inc in incidents {
        println!(
            "    - ID {}: cargo {}, RUT {}, type {}",
            inc.id,
            inc.cargo_id.as_deref().unwrap_or("-"),
            inc.employee_id.as_deref().unwrap_or("-"),
            inc.kind.as_deref().unwrap_or("-"),
        );
    }
}

/// `existed` is whether the file was present before the pool opened it.
pub async fn run_inspect(
    conn: &mut SqliteConnection,
    db_path: &str,
    existed: bool,
) -> anyhow::Result<()> {
    print_banner("INCIDENT DATABASE INSPECTION");
    println!("\nDatabase: {}", db_path);
    println!("  Existed: {}", existed);

    let inventory = inventory(conn).await?;

    println!("\nTables:");
    for table in &inventory.tables {
        println!("  - {}", table);
    }

    match &inventory.incidents {
        None => println!(
            "\nThe incidentes table does not exist yet (it is created with the first registration)"
        ),
        Some(incidents) if incidents.is_empty() => println!("\nNo incidents registered"),
        Some(incidents) => {
            println!("\nIncidents:");
            print_incidents(incidents);
        }
    }

    println!("\n{}\n", "=".repeat(80));
    Ok(())
}

pub async fn run_purge(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    print_banner("INCIDENT PURGE");

    if let Some(incidents) = inventory(conn).await?.incidents {
        println!("\nIncidents before purge:");
        print_incidents(&incidents);
    }

    let report = purge(conn).await?;
    if report.table_present {
        println!("\nResult:");
        println!("  Incidents removed: {}", report.removed);
        println!("  Incidents remaining: {}", report.remaining);
    } else {
        println!("\nThe incidentes table does not exist; nothing to purge");
    }

    println!("\n{}\n", "=".repeat(80));
    Ok(())
}
