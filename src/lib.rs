//! Shipment carbon emission calculator
//!
//! Combines transport, packaging and waste-disposal emission factors from
//! reference tables into per-shipment estimates, for single road legs,
//! multi-modal routes and heuristic eco/standard/express route options.
//! Coordinates must already be resolved; nothing here performs network I/O.

pub mod calculator;
pub mod constants;
pub mod db;
pub mod distance;
pub mod emissions;
pub mod error;
pub mod facility;
pub mod import;
pub mod loading;
pub mod models;
pub mod reference;
pub mod report;
pub mod routes;
pub mod sample;
pub mod vehicle;

pub use calculator::EmissionCalculator;
pub use error::{EmissionError, Result};
pub use facility::{FacilityDirectory, FacilityLocator};
pub use models::{
    BoxDimensions, Coordinate, EmissionBreakdown, EmissionResult, Facility, FacilityKind, LoadingCapacity,
    ReferenceRecord, RouteLeg, RouteOption, RouteOptions, TableId, TransportMode, TransportSegment,
};
pub use reference::ReferenceData;
