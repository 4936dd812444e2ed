//! Database schema and operations

use anyhow::Result;
use rusqlite::{Connection, Row};

use crate::models::{Coordinate, Facility, FacilityKind, ReferenceRecord, TableId};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Transport emission factors (vehicles and freight modes)
        CREATE TABLE IF NOT EXISTS transport_factors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            level1 TEXT NOT NULL,
            level2 TEXT NOT NULL,
            level3 TEXT NOT NULL,
            uom TEXT NOT NULL,
            factor REAL
        );

        -- Packaging material production factors
        CREATE TABLE IF NOT EXISTS material_factors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            level1 TEXT NOT NULL,
            level2 TEXT NOT NULL,
            level3 TEXT NOT NULL,
            uom TEXT NOT NULL,
            factor REAL
        );

        -- Waste disposal factors
        CREATE TABLE IF NOT EXISTS waste_factors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            level1 TEXT NOT NULL,
            level2 TEXT NOT NULL,
            level3 TEXT NOT NULL,
            uom TEXT NOT NULL,
            factor REAL
        );

        -- Ports and airports used as transfer points
        CREATE TABLE IF NOT EXISTS facilities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_facilities_kind ON facilities(kind);
        "#,
    )?;
    Ok(())
}

fn table_name(table: TableId) -> &'static str {
    match table {
        TableId::Transport => "transport_factors",
        TableId::Material => "material_factors",
        TableId::Waste => "waste_factors",
    }
}

/// Append a record; stored order is insertion order
pub fn insert_reference_record(conn: &Connection, table: TableId, record: &ReferenceRecord) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} (level1, level2, level3, uom, factor) VALUES (?1, ?2, ?3, ?4, ?5)",
            table_name(table)
        ),
        (
            &record.level1,
            &record.level2,
            &record.level3,
            &record.uom,
            record.factor,
        ),
    )?;
    Ok(())
}

/// Insert a port or airport
pub fn insert_facility(conn: &Connection, facility: &Facility) -> Result<()> {
    conn.execute(
        "INSERT INTO facilities (name, kind, latitude, longitude) VALUES (?1, ?2, ?3, ?4)",
        (
            &facility.name,
            facility.kind.name(),
            facility.coordinate.latitude(),
            facility.coordinate.longitude(),
        ),
    )?;
    Ok(())
}

/// Clear all reference data (for re-import)
pub fn clear_reference_data(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM transport_factors;
        DELETE FROM material_factors;
        DELETE FROM waste_factors;
        DELETE FROM facilities;
        "#,
    )?;
    Ok(())
}

fn reference_record(row: &Row<'_>) -> rusqlite::Result<ReferenceRecord> {
    Ok(ReferenceRecord::new(
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        row.get::<_, String>(3)?,
        row.get::<_, Option<f64>>(4)?,
    ))
}

/// All records of a table in stored order
pub fn list_reference_records(conn: &Connection, table: TableId) -> Result<Vec<ReferenceRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT level1, level2, level3, uom, factor FROM {} ORDER BY id",
        table_name(table)
    ))?;

    let rows = stmt.query_map([], reference_record)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Count records per table
pub fn count_reference_records(conn: &Connection, table: TableId) -> Result<usize> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", table_name(table)),
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// List all facilities in stored order
pub fn list_facilities(conn: &Connection) -> Result<Vec<Facility>> {
    let mut stmt = conn.prepare("SELECT name, kind, latitude, longitude FROM facilities ORDER BY id")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, f64>(3)?,
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (name, kind, latitude, longitude) = row?;
        results.push(Facility {
            name,
            kind: kind.parse::<FacilityKind>()?,
            coordinate: Coordinate::new(latitude, longitude)?,
        });
    }
    Ok(results)
}
