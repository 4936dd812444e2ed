//! Box loading capacity for known vehicle and container interiors

use serde::Serialize;

use crate::error::{EmissionError, Result};
use crate::models::{BoxDimensions, LoadingCapacity};
use crate::vehicle::VanClass;

/// Absorbs rounding such as 1.2 / 0.4 = 2.9999999999999996
const FIT_TOLERANCE: f64 = 1e-9;

/// Interior dimensions of a vehicle or container class, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleProfile {
    pub name: &'static str,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip)]
    van_class: Option<VanClass>,
    #[serde(skip)]
    keywords: &'static [&'static str],
}

impl VehicleProfile {
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Fit identical boxes on a regular grid, no rotation.
    ///
    /// Fails with `InvalidInput` when the box count does not fit in a `u64`.
    pub fn load(&self, dims: &BoxDimensions) -> Result<LoadingCapacity> {
        let rows = axis_count(self.width, dims.width);
        let columns = axis_count(self.length, dims.length);
        let layers = axis_count(self.height, dims.height);
        let total_boxes = rows
            .checked_mul(columns)
            .and_then(|n| n.checked_mul(layers))
            .ok_or_else(|| {
                EmissionError::invalid_input(format!(
                    "box {} x {} x {} m is too small to count in a {}",
                    dims.length, dims.width, dims.height, self.name
                ))
            })?;

        let vehicle_volume = self.volume();
        let used = total_boxes as f64 * dims.volume();
        let utilization_pct = if total_boxes == 0 {
            0.0
        } else {
            used / vehicle_volume * 100.0
        };

        Ok(LoadingCapacity {
            vehicle: self.name.to_string(),
            total_boxes,
            rows,
            columns,
            layers,
            utilization_pct,
            remaining_volume_m3: vehicle_volume - used,
        })
    }
}

fn axis_count(interior: f64, box_side: f64) -> u64 {
    (interior / box_side + FIT_TOLERANCE).floor().max(0.0) as u64
}

const fn profile(
    name: &'static str,
    length: f64,
    width: f64,
    height: f64,
    van_class: Option<VanClass>,
    keywords: &'static [&'static str],
) -> VehicleProfile {
    VehicleProfile {
        name,
        length,
        width,
        height,
        van_class,
        keywords,
    }
}

pub const VEHICLE_PROFILES: &[VehicleProfile] = &[
    profile("Class I van", 2.5, 1.7, 1.4, Some(VanClass::I), &[]),
    profile("Class II van", 3.0, 1.75, 1.8, Some(VanClass::II), &[]),
    profile("Class III van", 4.2, 1.8, 1.9, Some(VanClass::III), &[]),
    profile("Articulated HGV", 13.6, 2.48, 2.7, None, &["articulated", "artic"]),
    profile("Rigid HGV", 7.3, 2.48, 2.6, None, &["hgv", "rigid", "lorry"]),
    profile("20ft container", 5.898, 2.352, 2.393, None, &[]),
    profile("40ft container", 12.032, 2.352, 2.393, None, &["rail", "train", "ship", "tanker", "sea"]),
    profile("LD3 air container", 1.56, 1.53, 1.63, None, &["flight", "aircraft"]),
];

/// Find the profile for a profile name or a selected vehicle name.
///
/// Exact profile names win, then van class labels ("Class II ..."), then
/// the first profile whose keywords appear in the name.
pub fn find_profile(vehicle: &str) -> Option<&'static VehicleProfile> {
    let name = vehicle.trim().to_lowercase();
    if let Some(p) = VEHICLE_PROFILES.iter().find(|p| p.name.to_lowercase() == name) {
        return Some(p);
    }
    if let Some(class) = VanClass::from_label(vehicle) {
        return VEHICLE_PROFILES.iter().find(|p| p.van_class == Some(class));
    }
    VEHICLE_PROFILES
        .iter()
        .find(|p| p.keywords.iter().any(|k| name.contains(k)))
}

/// How many boxes fit in the named vehicle
pub fn calculate_box_loading(dims: &BoxDimensions, vehicle: &str) -> Result<LoadingCapacity> {
    let profile = find_profile(vehicle).ok_or_else(|| {
        EmissionError::lookup_with_candidates(
            "vehicle profile",
            vehicle,
            VEHICLE_PROFILES.iter().map(|p| p.name.to_string()).collect(),
        )
    })?;
    profile.load(dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(l: f64, w: f64, h: f64) -> BoxDimensions {
        BoxDimensions::new(l, w, h).unwrap()
    }

    #[test]
    fn class_one_van_grid() {
        let capacity = calculate_box_loading(&dims(0.6, 0.4, 0.4), "Class I van").unwrap();
        assert_eq!(capacity.rows, 4);
        assert_eq!(capacity.columns, 4);
        assert_eq!(capacity.layers, 3);
        assert_eq!(capacity.total_boxes, 48);
        // 48 * 0.096 m3 of a 5.95 m3 interior
        assert!((capacity.utilization_pct - 77.4453781512605).abs() < 1e-6);
        assert!((capacity.remaining_volume_m3 - (5.95 - 4.608)).abs() < 1e-9);
    }

    #[test]
    fn oversized_box_fits_nothing() {
        let capacity = calculate_box_loading(&dims(0.5, 0.5, 1.5), "Class I van").unwrap();
        assert_eq!(capacity.layers, 0);
        assert_eq!(capacity.total_boxes, 0);
        assert_eq!(capacity.utilization_pct, 0.0);
        assert!((capacity.remaining_volume_m3 - 5.95).abs() < 1e-9);
    }

    #[test]
    fn exact_fit_survives_rounding() {
        // 1.2 / 0.4 is 2.9999999999999996 in floating point
        let profile = profile("Test crate", 1.2, 1.2, 1.2, None, &[]);
        let capacity = profile.load(&dims(0.4, 0.4, 0.4)).unwrap();
        assert_eq!(capacity.total_boxes, 27);
        assert!((capacity.utilization_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn tiny_box_count_overflow_is_invalid_input() {
        let tiny = BoxDimensions::from_centimeters(0.000001, 0.000001, 0.000001).unwrap();
        assert!(matches!(
            calculate_box_loading(&tiny, "40ft container"),
            Err(EmissionError::InvalidInput(_))
        ));

        // 1 mm cubes still count exactly
        let capacity = calculate_box_loading(&dims(0.001, 0.001, 0.001), "LD3 air container").unwrap();
        assert_eq!((capacity.rows, capacity.columns, capacity.layers), (1530, 1560, 1630));
        assert_eq!(capacity.total_boxes, 1530 * 1560 * 1630);
    }

    #[test]
    fn selected_vehicle_names_resolve() {
        assert_eq!(find_profile("Class II (1.305 to 1.74 tonnes)").unwrap().name, "Class II van");
        assert_eq!(find_profile("HGV (all diesel)").unwrap().name, "Rigid HGV");
        assert_eq!(find_profile("Articulated (>33t)").unwrap().name, "Articulated HGV");
        assert_eq!(find_profile("Rail").unwrap().name, "40ft container");
        assert_eq!(find_profile("Cargo ship").unwrap().name, "40ft container");
        assert_eq!(find_profile("Freight flights").unwrap().name, "LD3 air container");
        assert_eq!(find_profile("20FT CONTAINER").unwrap().name, "20ft container");
        assert!(find_profile("Vans").is_none());
    }

    #[test]
    fn unknown_vehicle_type_is_lookup_failure() {
        match calculate_box_loading(&dims(0.3, 0.3, 0.3), "Zeppelin") {
            Err(EmissionError::LookupFailure { table, candidates, .. }) => {
                assert_eq!(table, "vehicle profile");
                assert_eq!(candidates.len(), VEHICLE_PROFILES.len());
            }
            other => panic!("expected lookup failure, got {:?}", other),
        }
    }
}
