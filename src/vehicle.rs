//! Vehicle selection by mode, weight class and lowest emission factor

use tracing::debug;

use crate::constants::{VAN_CLASS_I_MAX_TONNES, VAN_CLASS_II_MAX_TONNES, VAN_CLASS_III_MAX_TONNES};
use crate::error::{EmissionError, Result};
use crate::models::{ReferenceRecord, TableId, TransportMode};
use crate::reference::ReferenceData;

/// Whether van candidates are narrowed to the weight class of the shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VanPolicy {
    /// Used by single-leg calculations
    WeightClass,
    /// Used by multi-modal legs
    Unrestricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VanClass {
    I,
    II,
    III,
}

impl VanClass {
    /// Class a shipment falls into; `None` above 3.5 tonnes where vans are not restricted
    pub fn for_weight(weight_kg: f64) -> Option<VanClass> {
        let tonnes = weight_kg / 1000.0;
        if tonnes <= VAN_CLASS_I_MAX_TONNES {
            Some(VanClass::I)
        } else if tonnes <= VAN_CLASS_II_MAX_TONNES {
            Some(VanClass::II)
        } else if tonnes <= VAN_CLASS_III_MAX_TONNES {
            Some(VanClass::III)
        } else {
            None
        }
    }

    /// Read the roman numeral following the word "Class" in a category label.
    pub fn from_label(label: &str) -> Option<VanClass> {
        let mut tokens = label.split_whitespace();
        while let Some(token) = tokens.next() {
            if !token.eq_ignore_ascii_case("class") {
                continue;
            }
            let numeral = tokens
                .next()?
                .trim_matches(|c: char| !c.is_ascii_alphanumeric());
            return match numeral.to_ascii_uppercase().as_str() {
                "I" => Some(VanClass::I),
                "II" => Some(VanClass::II),
                "III" => Some(VanClass::III),
                _ => None,
            };
        }
        None
    }
}

pub fn is_van(record: &ReferenceRecord) -> bool {
    record.level2.trim().to_lowercase().starts_with("van")
}

fn matches_mode(record: &ReferenceRecord, mode: TransportMode) -> bool {
    let level2 = record.level2.to_lowercase();
    mode.category_keywords().iter().any(|keyword| level2.contains(keyword))
}

pub struct VehicleSelector<'a> {
    reference: &'a ReferenceData,
}

impl<'a> VehicleSelector<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self { reference }
    }

    /// Candidate records for a mode, excluding well-to-tank duplicates
    pub fn candidates(&self, mode: TransportMode) -> Vec<&'a ReferenceRecord> {
        self.reference
            .records(TableId::Transport)
            .iter()
            .filter(|r| !r.is_well_to_tank() && matches_mode(r, mode))
            .collect()
    }

    /// Pick the vehicle with the lowest emission factor.
    ///
    /// Missing factors never win. On equal factors the earliest record in
    /// table order is kept, so the result depends on the stored row order.
    pub fn select(
        &self,
        distance_km: f64,
        weight_kg: f64,
        mode: TransportMode,
        policy: VanPolicy,
    ) -> Result<String> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(EmissionError::invalid_input(format!(
                "distance must be a non-negative number of km, got {}",
                distance_km
            )));
        }
        validate_weight(weight_kg)?;

        let mut candidates = self.candidates(mode);

        if mode == TransportMode::Road && policy == VanPolicy::WeightClass {
            if let Some(class) = VanClass::for_weight(weight_kg) {
                candidates.retain(|r| !is_van(r) || VanClass::from_label(&r.level3) == Some(class));
            }
        }

        let mut best: Option<(&ReferenceRecord, f64)> = None;
        for record in candidates.iter().copied() {
            let factor = record.factor.unwrap_or(f64::INFINITY);
            match best {
                Some((_, lowest)) if factor >= lowest => {}
                _ => best = Some((record, factor)),
            }
        }

        let winner = match best {
            Some((record, factor)) if factor.is_finite() => record,
            _ => {
                return Err(EmissionError::NoCandidate { mode, weight_kg });
            }
        };

        let name = if is_van(winner) && VanClass::from_label(&winner.level3).is_some() {
            winner.level3.clone()
        } else {
            winner.level2.clone()
        };

        debug!(
            %mode,
            weight_kg,
            distance_km,
            candidates = candidates.len(),
            vehicle = %name,
            "selected vehicle"
        );
        Ok(name)
    }
}

pub fn validate_weight(weight_kg: f64) -> Result<()> {
    if weight_kg.is_finite() && weight_kg > 0.0 {
        Ok(())
    } else {
        Err(EmissionError::invalid_input(format!(
            "weight must be greater than 0 kg, got {}",
            weight_kg
        )))
    }
}
