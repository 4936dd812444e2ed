//! Data models for reference records, routes and emission results

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::constants::*;
use crate::error::{EmissionError, Result};

/// The three reference tables the engine reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableId {
    Transport,
    Material,
    Waste,
}

impl TableId {
    pub const ALL: [TableId; 3] = [TableId::Transport, TableId::Material, TableId::Waste];

    pub fn name(self) -> &'static str {
        match self {
            TableId::Transport => "transport",
            TableId::Material => "material",
            TableId::Waste => "waste",
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of an emission factor table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRecord {
    pub level1: String,
    pub level2: String,
    pub level3: String,
    pub uom: String,
    /// `None` when the source cell was missing or not a usable number
    pub factor: Option<f64>,
}

impl ReferenceRecord {
    pub fn new(
        level1: impl Into<String>,
        level2: impl Into<String>,
        level3: impl Into<String>,
        uom: impl Into<String>,
        factor: Option<f64>,
    ) -> Self {
        Self {
            level1: level1.into(),
            level2: level2.into(),
            level3: level3.into(),
            uom: uom.into(),
            factor: factor.filter(|f| f.is_finite() && *f >= 0.0),
        }
    }

    /// Most specific non-empty category name.
    pub fn label(&self) -> &str {
        if self.level3.trim().is_empty() {
            &self.level2
        } else {
            &self.level3
        }
    }

    pub fn category_path(&self) -> String {
        format!("{} / {} / {}", self.level1, self.level2, self.level3)
    }

    /// Well-to-tank rows carry upstream fuel-production factors.
    pub fn is_well_to_tank(&self) -> bool {
        [&self.level1, &self.level2, &self.level3].iter().any(|level| {
            let lower = level.to_lowercase();
            lower.contains("wtt") || lower.contains("well-to-tank")
        })
    }
}

/// Parse a raw factor cell. Anything that is not a finite, non-negative number is unusable.
pub fn parse_factor(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Road,
    Rail,
    Sea,
    Air,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Road,
        TransportMode::Rail,
        TransportMode::Sea,
        TransportMode::Air,
    ];

    pub fn average_speed_kmh(self) -> f64 {
        match self {
            TransportMode::Road => ROAD_SPEED_KMH,
            TransportMode::Rail => RAIL_SPEED_KMH,
            TransportMode::Sea => SEA_SPEED_KMH,
            TransportMode::Air => AIR_SPEED_KMH,
        }
    }

    pub fn travel_time_h(self, distance_km: f64) -> f64 {
        distance_km / self.average_speed_kmh()
    }

    /// Nominal kg CO2e per tonne-km for route option estimates
    pub fn nominal_factor(self) -> f64 {
        match self {
            TransportMode::Road => ROAD_NOMINAL_FACTOR,
            TransportMode::Rail => RAIL_NOMINAL_FACTOR,
            TransportMode::Sea => SEA_NOMINAL_FACTOR,
            TransportMode::Air => AIR_NOMINAL_FACTOR,
        }
    }

    /// Level-2 category keywords identifying this mode's transport records.
    pub fn category_keywords(self) -> &'static [&'static str] {
        match self {
            TransportMode::Road => &["vans", "hgv"],
            TransportMode::Rail => &["rail"],
            TransportMode::Sea => &["cargo ship", "sea tanker"],
            TransportMode::Air => &["freight flight"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TransportMode::Road => "road",
            TransportMode::Rail => "rail",
            TransportMode::Sea => "sea",
            TransportMode::Air => "air",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for TransportMode {
    type Err = EmissionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "road" => Ok(TransportMode::Road),
            "rail" => Ok(TransportMode::Rail),
            "sea" => Ok(TransportMode::Sea),
            "air" => Ok(TransportMode::Air),
            other => Err(EmissionError::invalid_input(format!(
                "unknown transport mode '{}' (expected road, rail, sea or air)",
                other
            ))),
        }
    }
}

/// Latitude/longitude pair in decimal degrees.
///
/// Only built through [`Coordinate::new`], so every value is finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(EmissionError::invalid_input(format!(
                "coordinate ({}, {}) is not finite",
                latitude, longitude
            )));
        }
        if latitude.abs() > 90.0 {
            return Err(EmissionError::invalid_input(format!(
                "latitude {} is outside [-90, 90]",
                latitude
            )));
        }
        if longitude.abs() > 180.0 {
            return Err(EmissionError::invalid_input(format!(
                "longitude {} is outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Arithmetic mean of the two coordinates (not the geodesic midpoint)
    pub fn midpoint(&self, other: &Coordinate) -> Coordinate {
        Coordinate {
            latitude: (self.latitude + other.latitude) / 2.0,
            longitude: (self.longitude + other.longitude) / 2.0,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// One requested leg of a multi-modal route
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteLeg {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub mode: TransportMode,
}

impl RouteLeg {
    pub fn new(origin: Coordinate, destination: Coordinate, mode: TransportMode) -> Self {
        Self {
            origin,
            destination,
            mode,
        }
    }
}

/// A computed route leg
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportSegment {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub mode: TransportMode,
    /// Selected vehicle; `None` for planned legs scored with nominal factors
    pub vehicle: Option<String>,
    pub distance_km: f64,
    pub time_h: f64,
    pub emissions_kg: f64,
}

/// Box size in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxDimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxDimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Result<Self> {
        for (axis, value) in [("length", length), ("width", width), ("height", height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EmissionError::invalid_input(format!(
                    "box {} must be positive, got {}",
                    axis, value
                )));
            }
        }
        Ok(Self {
            length,
            width,
            height,
        })
    }

    pub fn from_centimeters(length_cm: f64, width_cm: f64, height_cm: f64) -> Result<Self> {
        Self::new(length_cm / 100.0, width_cm / 100.0, height_cm / 100.0)
    }

    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }
}

/// How many identical boxes fit into one vehicle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingCapacity {
    pub vehicle: String,
    pub total_boxes: u64,
    pub rows: u64,
    pub columns: u64,
    pub layers: u64,
    pub utilization_pct: f64,
    pub remaining_volume_m3: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EmissionBreakdown {
    pub transport: f64,
    pub packaging: f64,
    pub waste: f64,
}

impl EmissionBreakdown {
    pub fn total(&self) -> f64 {
        self.transport + self.packaging + self.waste
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionResult {
    pub segments: Vec<TransportSegment>,
    pub material: String,
    pub co2e: f64,
    pub breakdown: EmissionBreakdown,
    pub total_distance_km: f64,
    pub total_time_h: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_dimensions: Option<BoxDimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loading: Option<BTreeMap<String, LoadingCapacity>>,
}

impl EmissionResult {
    /// Vehicle of the first leg, the recommendation for single-leg shipments
    pub fn vehicle(&self) -> Option<&str> {
        self.segments.first().and_then(|s| s.vehicle.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteOption {
    pub name: String,
    pub description: String,
    pub segments: Vec<TransportSegment>,
    pub total_time_h: f64,
    pub total_distance_km: f64,
    pub estimated_emissions_kg: f64,
    /// Relative cost, 1.0 being the standard option
    pub cost_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteOptions {
    pub eco: RouteOption,
    pub standard: RouteOption,
    pub express: RouteOption,
}

impl RouteOptions {
    pub fn iter(&self) -> impl Iterator<Item = &RouteOption> {
        [&self.eco, &self.standard, &self.express].into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityKind {
    Port,
    Airport,
}

impl FacilityKind {
    pub fn name(self) -> &'static str {
        match self {
            FacilityKind::Port => "port",
            FacilityKind::Airport => "airport",
        }
    }
}

impl FromStr for FacilityKind {
    type Err = EmissionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "port" | "seaport" => Ok(FacilityKind::Port),
            "airport" => Ok(FacilityKind::Airport),
            other => Err(EmissionError::invalid_input(format!(
                "unknown facility kind '{}'",
                other
            ))),
        }
    }
}

/// A port or airport used as a transfer point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facility {
    pub name: String,
    pub kind: FacilityKind,
    pub coordinate: Coordinate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_factor_rejects_unusable_cells() {
        assert_eq!(parse_factor("0.2345"), Some(0.2345));
        assert_eq!(parse_factor(" 1,164.28 "), Some(1164.28));
        assert_eq!(parse_factor(""), None);
        assert_eq!(parse_factor("n/a"), None);
        assert_eq!(parse_factor("-3"), None);
        assert_eq!(parse_factor("NaN"), None);
        assert_eq!(parse_factor("inf"), None);
    }

    #[test]
    fn well_to_tank_detection() {
        let wtt = ReferenceRecord::new("WTT- delivery vehicles", "WTT- vans", "Class I", "km", Some(0.05));
        let direct = ReferenceRecord::new("Delivery vehicles", "Vans", "Class I", "km", Some(0.2));
        assert!(wtt.is_well_to_tank());
        assert!(!direct.is_well_to_tank());
    }

    #[test]
    fn coordinate_validation() {
        assert!(Coordinate::new(51.5, -0.12).is_ok());
        assert!(matches!(Coordinate::new(91.0, 0.0), Err(EmissionError::InvalidInput(_))));
        assert!(matches!(Coordinate::new(0.0, -180.5), Err(EmissionError::InvalidInput(_))));
        assert!(matches!(Coordinate::new(f64::NAN, 0.0), Err(EmissionError::InvalidInput(_))));
    }

    #[test]
    fn non_finite_coordinates_never_reach_a_route() {
        assert!(matches!(Coordinate::new(0.0, f64::INFINITY), Err(EmissionError::InvalidInput(_))));
        assert!(matches!(Coordinate::new(f64::NEG_INFINITY, 0.0), Err(EmissionError::InvalidInput(_))));

        let london = Coordinate::new(51.5074, -0.1278).unwrap();
        let new_york = Coordinate::new(40.7128, -74.006).unwrap();
        let mid = london.midpoint(&new_york);
        assert_eq!(Coordinate::new(mid.latitude(), mid.longitude()), Ok(mid));
        assert_eq!(london.latitude(), 51.5074);
        assert_eq!(london.longitude(), -0.1278);
    }

    #[test]
    fn box_dimensions_from_centimeters() {
        let dims = BoxDimensions::from_centimeters(60.0, 40.0, 40.0).unwrap();
        assert!((dims.length - 0.6).abs() < 1e-12);
        assert!((dims.volume() - 0.096).abs() < 1e-12);
        assert!(BoxDimensions::from_centimeters(60.0, 0.0, 40.0).is_err());
        assert!(BoxDimensions::new(-1.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn transport_mode_parsing() {
        assert_eq!("Rail".parse::<TransportMode>().unwrap(), TransportMode::Rail);
        assert_eq!(" air ".parse::<TransportMode>().unwrap(), TransportMode::Air);
        assert!("hovercraft".parse::<TransportMode>().is_err());
    }

    #[test]
    fn record_label_falls_back_to_level2() {
        let record = ReferenceRecord::new("Freighting goods", "Rail", "", "tonne.km", Some(0.03));
        assert_eq!(record.label(), "Rail");
        let negative = ReferenceRecord::new("x", "y", "z", "km", Some(-1.0));
        assert_eq!(negative.factor, None);
    }
}
