//! Reference data import from CSV exports of the factor spreadsheets
//!
//! Files are recognised by name: `transport*.csv`, `material*.csv`,
//! `waste*.csv` and `facilit*.csv`, anywhere below the data directory.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Deserialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::db;
use crate::models::{Coordinate, Facility, FacilityKind, ReferenceRecord, TableId, parse_factor};

/// What a source file feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Table(TableId),
    Facilities,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<SourceKind> {
        if !path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?.to_lowercase();
        if stem.starts_with("transport") {
            Some(SourceKind::Table(TableId::Transport))
        } else if stem.starts_with("material") {
            Some(SourceKind::Table(TableId::Material))
        } else if stem.starts_with("waste") {
            Some(SourceKind::Table(TableId::Waste))
        } else if stem.starts_with("facilit") {
            Some(SourceKind::Facilities)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct FactorRow {
    #[serde(rename = "Level 1", alias = "level1", default)]
    level1: String,
    #[serde(rename = "Level 2", alias = "level2", default)]
    level2: String,
    #[serde(rename = "Level 3", alias = "level3", default)]
    level3: String,
    #[serde(rename = "UOM", alias = "uom", default)]
    uom: String,
    #[serde(
        rename = "GHG Conversion Factor 2024",
        alias = "Factor",
        alias = "factor",
        default
    )]
    factor: String,
}

#[derive(Debug, Deserialize)]
struct FacilityRow {
    name: String,
    kind: String,
    latitude: f64,
    longitude: f64,
}

/// Find all recognised CSV files, in path order
pub fn find_source_files(data_dir: &Path) -> Result<Vec<(PathBuf, SourceKind)>> {
    let mut sources = Vec::new();

    for entry in WalkDir::new(data_dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(kind) = SourceKind::from_path(entry.path()) {
            sources.push((entry.path().to_path_buf(), kind));
        }
    }

    Ok(sources)
}

/// Parse factor rows. Unusable factor cells become `None` rather than failing the file.
pub fn read_reference_records<R: Read>(reader: R) -> Result<Vec<ReferenceRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut records = Vec::new();
    for (line, row) in csv_reader.deserialize::<FactorRow>().enumerate() {
        let row = row.with_context(|| format!("Failed to parse factor row {}", line + 1))?;
        if row.level1.is_empty() && row.level2.is_empty() && row.level3.is_empty() {
            continue;
        }
        records.push(ReferenceRecord::new(
            row.level1,
            row.level2,
            row.level3,
            row.uom,
            parse_factor(&row.factor),
        ));
    }
    Ok(records)
}

pub fn read_facilities<R: Read>(reader: R) -> Result<Vec<Facility>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut facilities = Vec::new();
    for (line, row) in csv_reader.deserialize::<FacilityRow>().enumerate() {
        let row = row.with_context(|| format!("Failed to parse facility row {}", line + 1))?;
        facilities.push(Facility {
            kind: row.kind.parse::<FacilityKind>()?,
            coordinate: Coordinate::new(row.latitude, row.longitude)?,
            name: row.name,
        });
    }
    Ok(facilities)
}

fn import_file(conn: &Connection, path: &Path, kind: SourceKind, stats: &mut ImportStats) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to read {}", path.display()))?;

    match kind {
        SourceKind::Table(table) => {
            let records = read_reference_records(file)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            for record in &records {
                db::insert_reference_record(conn, table, record)?;
            }
            let unusable = records.iter().filter(|r| r.factor.is_none()).count();
            stats.add_records(table, records.len());
            stats.unusable_factors += unusable;
            info!(file = %path.display(), %table, records = records.len(), unusable, "imported factors");
        }
        SourceKind::Facilities => {
            let facilities =
                read_facilities(file).with_context(|| format!("Failed to import {}", path.display()))?;
            for facility in &facilities {
                db::insert_facility(conn, facility)?;
            }
            stats.facilities += facilities.len();
            info!(file = %path.display(), facilities = facilities.len(), "imported facilities");
        }
    }
    Ok(())
}

/// Import every recognised file under `data_dir` into the database
pub fn import_to_database(conn: &Connection, data_dir: &Path) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    info!(dir = %data_dir.display(), "scanning for reference data");
    let sources = find_source_files(data_dir)?;
    info!(files = sources.len(), "found reference data files");

    for (path, kind) in &sources {
        match import_file(conn, path, *kind, &mut stats) {
            Ok(()) => stats.files += 1,
            Err(e) => {
                warn!(file = %path.display(), error = %format!("{:#}", e), "import failed");
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

#[derive(Debug, Default)]
pub struct ImportStats {
    pub files: usize,
    pub transport: usize,
    pub material: usize,
    pub waste: usize,
    pub facilities: usize,
    pub unusable_factors: usize,
    pub errors: usize,
}

impl ImportStats {
    fn add_records(&mut self, table: TableId, count: usize) {
        match table {
            TableId::Transport => self.transport += count,
            TableId::Material => self.material += count,
            TableId::Waste => self.waste += count,
        }
    }
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} files ({} transport, {} material, {} waste records, {} facilities). Unusable factors: {}, Errors: {}",
            self.files,
            self.transport,
            self.material,
            self.waste,
            self.facilities,
            self.unusable_factors,
            self.errors
        )
    }
}
