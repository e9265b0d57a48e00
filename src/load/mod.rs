use anyhow::{ensure, Context, Result};
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use crate::config::PgConfig;
use crate::process::Record;

/// Destination identifiers. Fixed constants, never user input; still checked
/// against [`is_safe_identifier`] before they reach a DDL string.
pub const SCHEMA_NAME: &str = "war";
pub const TABLE_NAME: &str = "russia_ukraine_conflict";

pub async fn connect(pg: &PgConfig) -> Result<PgConnection> {
    let options = PgConnectOptions::new()
        .host(&pg.host)
        .port(pg.port)
        .username(&pg.user)
        .password(&pg.password)
        .database(&pg.database);

    PgConnection::connect_with(&options)
        .await
        .context("failed to connect to Postgres")
}

/// Replace the destination table with `records`, one transaction end to end.
///
/// The table is dropped and recreated on every run, so prior contents are
/// gone by design: the table always holds exactly the rows of the latest
/// successful run. A failure anywhere before the final commit rolls the
/// whole load back and readers never observe a partial snapshot.
///
/// Nothing serializes concurrent runs against the same table; invoke one
/// run at a time.
pub async fn load(conn: &mut PgConnection, records: &[Record]) -> Result<u64> {
    ensure!(
        is_safe_identifier(SCHEMA_NAME),
        "unsafe schema identifier {SCHEMA_NAME:?}"
    );
    ensure!(
        is_safe_identifier(TABLE_NAME),
        "unsafe table identifier {TABLE_NAME:?}"
    );

    let mut tx = conn.begin().await.context("opening load transaction")?;

    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {SCHEMA_NAME}"))
        .execute(&mut *tx)
        .await
        .context("creating destination schema")?;

    sqlx::query(&format!("DROP TABLE IF EXISTS {SCHEMA_NAME}.{TABLE_NAME}"))
        .execute(&mut *tx)
        .await
        .context("dropping previous table")?;

    sqlx::query(&create_table_sql())
        .execute(&mut *tx)
        .await
        .context("creating destination table")?;

    let insert = insert_sql();
    for record in records {
        sqlx::query(&insert)
            .bind(record.start)
            .bind(record.end)
            .bind(record.date)
            .bind(record.text("Country"))
            .bind(record.text("Event"))
            .bind(record.text("Oblast"))
            .bind(record.int("Casualties"))
            .bind(record.int("Injured"))
            .bind(record.int("Captured"))
            .bind(record.int("Civilian_Casualties"))
            .bind(record.int("New_Recruits"))
            .bind(record.float("Combat_Intensity"))
            .bind(record.text("Territory_Status"))
            .bind(record.float("Percentage_Occupied"))
            .bind(record.float("Area_Occupied"))
            .bind(record.total_soldier_casualties as i32)
            .execute(&mut *tx)
            .await
            .context("inserting row")?;
    }

    tx.commit().await.context("committing load")?;
    Ok(records.len() as u64)
}

/// Identifiers must stay alphanumeric/underscore and not start with a digit.
fn is_safe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn create_table_sql() -> String {
    format!(
        r#"CREATE TABLE {SCHEMA_NAME}.{TABLE_NAME} (
            id SERIAL PRIMARY KEY,
            "start" TIMESTAMP,
            "end" TIMESTAMP,
            "date" DATE,
            country TEXT,
            event TEXT,
            oblast TEXT,
            casualties INT,
            injured INT,
            captured INT,
            civilian_casualties INT,
            new_recruits INT,
            combat_intensity DOUBLE PRECISION,
            territory_status TEXT,
            percentage_occupied DOUBLE PRECISION,
            area_occupied DOUBLE PRECISION,
            total_soldier_casualties INT
        )"#
    )
}

fn insert_sql() -> String {
    format!(
        r#"INSERT INTO {SCHEMA_NAME}.{TABLE_NAME} (
            "start", "end", "date", country, event, oblast, casualties, injured,
            captured, civilian_casualties, new_recruits, combat_intensity,
            territory_status, percentage_occupied, area_occupied, total_soldier_casualties
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"#
    )
}
