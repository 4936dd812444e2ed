//! Nearest port and airport resolution

use anyhow::Result as AnyResult;
use rusqlite::Connection;

use crate::db;
use crate::distance::great_circle_km;
use crate::error::{EmissionError, Result};
use crate::models::{Coordinate, Facility, FacilityKind};

/// Geographic facility lookup used to build port and airport transfers
pub trait FacilityLocator: Send + Sync {
    fn nearest(&self, kind: FacilityKind, near: &Coordinate) -> Result<Facility>;

    fn nearest_port(&self, near: &Coordinate) -> Result<Facility> {
        self.nearest(FacilityKind::Port, near)
    }

    fn nearest_airport(&self, near: &Coordinate) -> Result<Facility> {
        self.nearest(FacilityKind::Airport, near)
    }
}

/// In-memory list of facilities searched by great-circle distance
#[derive(Debug, Clone, Default)]
pub struct FacilityDirectory {
    facilities: Vec<Facility>,
}

impl FacilityDirectory {
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }

    pub fn from_connection(conn: &Connection) -> AnyResult<Self> {
        Ok(Self::new(db::list_facilities(conn)?))
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

impl FacilityLocator for FacilityDirectory {
    fn nearest(&self, kind: FacilityKind, near: &Coordinate) -> Result<Facility> {
        let mut best: Option<(&Facility, f64)> = None;
        for facility in self.facilities.iter().filter(|f| f.kind == kind) {
            let distance = great_circle_km(near, &facility.coordinate);
            match best {
                Some((_, closest)) if distance >= closest => {}
                _ => best = Some((facility, distance)),
            }
        }
        best.map(|(facility, _)| facility.clone())
            .ok_or_else(|| EmissionError::lookup(format!("nearest {}", kind.name()), near.to_string()))
    }
}
