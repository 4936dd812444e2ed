//! Transport, packaging and waste emission components

use tracing::{debug, warn};

use crate::constants::PACKAGING_SHARE;
use crate::error::{EmissionError, Result};
use crate::models::{EmissionBreakdown, ReferenceRecord, TableId};
use crate::reference::{ReferenceData, UnitKind, is_mass_in_tonnes, standardize_material, unit_kind};
use crate::vehicle::validate_weight;

pub struct EmissionAggregator<'a> {
    reference: &'a ReferenceData,
}

impl<'a> EmissionAggregator<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self { reference }
    }

    /// kg CO2e for moving `weight_kg` over `distance_km` with the named vehicle
    pub fn transport(&self, distance_km: f64, weight_kg: f64, vehicle: &str) -> Result<f64> {
        validate_weight(weight_kg)?;
        let record = self.reference.find_vehicle(vehicle)?;
        let factor = record.factor.ok_or_else(|| EmissionError::InvalidFactor {
            table: TableId::Transport.name().to_string(),
            key: vehicle.to_string(),
        })?;

        let emissions = match unit_kind(record) {
            UnitKind::DistanceWeight => distance_km * factor * (weight_kg / 1000.0),
            UnitKind::DistanceOnly => distance_km * factor,
            UnitKind::Other => distance_km * factor * weight_kg,
        };
        debug!(vehicle, distance_km, factor, uom = %record.uom, emissions, "transport emissions");
        Ok(emissions)
    }

    /// kg CO2e for producing the packaging, taken as a fixed share of shipment weight
    pub fn packaging(&self, weight_kg: f64, material: &str) -> Result<f64> {
        validate_weight(weight_kg)?;
        let record = self.material_record(material)?;
        let factor = record.factor.ok_or_else(|| EmissionError::InvalidFactor {
            table: TableId::Material.name().to_string(),
            key: standardize_material(material),
        })?;
        Ok(packaging_mass(weight_kg, record) * factor)
    }

    /// kg CO2e for disposing of the packaging.
    ///
    /// The material must still resolve, but a missing disposal record or an
    /// unusable disposal factor yields zero instead of an error.
    pub fn waste(&self, weight_kg: f64, material: &str) -> Result<f64> {
        validate_weight(weight_kg)?;
        self.material_record(material)?;

        let Some(record) = self.reference.waste_record() else {
            warn!(material, "no waste disposal record found, counting waste as zero");
            return Ok(0.0);
        };
        let Some(factor) = record.factor else {
            warn!(
                material,
                record = %record.category_path(),
                "waste disposal factor unusable, counting waste as zero"
            );
            return Ok(0.0);
        };
        Ok(packaging_mass(weight_kg, record) * factor)
    }

    /// Packaging and waste components with a zero transport component
    pub fn packaging_and_waste(&self, weight_kg: f64, material: &str) -> Result<EmissionBreakdown> {
        Ok(EmissionBreakdown {
            transport: 0.0,
            packaging: self.packaging(weight_kg, material)?,
            waste: self.waste(weight_kg, material)?,
        })
    }

    fn material_record(&self, material: &str) -> Result<&'a ReferenceRecord> {
        let standardized = standardize_material(material);
        self.reference
            .lookup(TableId::Material, &standardized)
            .map_err(|err| match err {
                EmissionError::LookupFailure { table, candidates, .. } => EmissionError::LookupFailure {
                    table,
                    key: if standardized == material.trim() {
                        standardized.clone()
                    } else {
                        format!("{} (standardized as '{}')", material.trim(), standardized)
                    },
                    candidates,
                },
                other => other,
            })
    }
}

/// Packaging mass in the unit the factor expects (kg, or tonnes for per-tonne factors)
fn packaging_mass(weight_kg: f64, record: &ReferenceRecord) -> f64 {
    let mass_kg = weight_kg * PACKAGING_SHARE;
    if is_mass_in_tonnes(record) {
        mass_kg / 1000.0
    } else {
        mass_kg
    }
}
