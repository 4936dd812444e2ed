//! Fixed engine parameters shared across calculations

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Packaging mass as a share of shipment weight.
pub const PACKAGING_SHARE: f64 = 0.1;

pub const ROAD_SPEED_KMH: f64 = 60.0;
pub const RAIL_SPEED_KMH: f64 = 80.0;
pub const SEA_SPEED_KMH: f64 = 30.0;
pub const AIR_SPEED_KMH: f64 = 800.0;

// Nominal factors (kg CO2e per tonne-km) used to score route options, where the
// intermediate waypoints make a full vehicle selection meaningless.
pub const ROAD_NOMINAL_FACTOR: f64 = 0.10749;
pub const RAIL_NOMINAL_FACTOR: f64 = 0.02782;
pub const SEA_NOMINAL_FACTOR: f64 = 0.01612;
pub const AIR_NOMINAL_FACTOR: f64 = 0.59295;

/// Van weight-class ceilings in tonnes (Class I, Class II, Class III).
pub const VAN_CLASS_I_MAX_TONNES: f64 = 1.305;
pub const VAN_CLASS_II_MAX_TONNES: f64 = 1.74;
pub const VAN_CLASS_III_MAX_TONNES: f64 = 3.5;

/// Below these direct distances (km) an option collapses to a single leg.
pub const ECO_SINGLE_LEG_MAX_KM: f64 = 800.0;
pub const STANDARD_SINGLE_LEG_MAX_KM: f64 = 500.0;
pub const EXPRESS_SINGLE_LEG_MAX_KM: f64 = 300.0;

pub const ECO_COST_FACTOR: f64 = 0.8;
pub const STANDARD_COST_FACTOR: f64 = 1.0;
pub const EXPRESS_COST_FACTOR: f64 = 2.5;
