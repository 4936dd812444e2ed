//! Emission calculation entry points
//!
//! [`EmissionCalculator`] owns the reference tables for its whole lifetime and
//! never mutates them, so one instance can serve concurrent callers.

use std::collections::BTreeMap;

use anyhow::Result as AnyResult;
use rusqlite::Connection;
use tracing::{info, info_span, warn};

use crate::distance::great_circle_km;
use crate::emissions::EmissionAggregator;
use crate::error::{EmissionError, Result};
use crate::facility::{FacilityDirectory, FacilityLocator};
use crate::loading;
use crate::models::{
    BoxDimensions, Coordinate, EmissionBreakdown, EmissionResult, LoadingCapacity, RouteLeg, RouteOptions,
    TransportMode, TransportSegment,
};
use crate::reference::ReferenceData;
use crate::routes::RouteOptionGenerator;
use crate::vehicle::{VanPolicy, VehicleSelector, validate_weight};

pub struct EmissionCalculator {
    reference: ReferenceData,
    facilities: Option<Box<dyn FacilityLocator>>,
}

impl EmissionCalculator {
    pub fn new(reference: ReferenceData) -> Self {
        Self {
            reference,
            facilities: None,
        }
    }

    pub fn with_facilities(mut self, locator: impl FacilityLocator + 'static) -> Self {
        self.facilities = Some(Box::new(locator));
        self
    }

    /// Load reference tables and facilities from the database
    pub fn from_connection(conn: &Connection) -> AnyResult<Self> {
        let calculator = Self::new(ReferenceData::from_connection(conn)?);
        let directory = FacilityDirectory::from_connection(conn)?;
        Ok(if directory.is_empty() {
            calculator
        } else {
            calculator.with_facilities(directory)
        })
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Single road leg with van weight-class selection
    pub fn calculate(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        weight_kg: f64,
        material: &str,
    ) -> Result<EmissionResult> {
        let _span = info_span!("calculate", weight_kg, material).entered();
        let legs = [RouteLeg::new(origin, destination, TransportMode::Road)];
        self.calculate_legs(&legs, weight_kg, material, VanPolicy::WeightClass, None)
    }

    /// Ordered legs with per-leg vehicle selection.
    ///
    /// Vans are not narrowed by weight class here. Packaging and waste are
    /// counted once for the shipment, not per leg.
    pub fn calculate_multimodal(
        &self,
        legs: &[RouteLeg],
        weight_kg: f64,
        material: &str,
        box_dimensions: Option<BoxDimensions>,
    ) -> Result<EmissionResult> {
        let _span = info_span!("calculate_multimodal", legs = legs.len(), weight_kg, material).entered();
        if legs.is_empty() {
            return Err(EmissionError::invalid_input("a multi-modal route needs at least one leg"));
        }
        self.calculate_legs(legs, weight_kg, material, VanPolicy::Unrestricted, box_dimensions)
    }

    pub fn generate_route_options(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        weight_kg: f64,
    ) -> Result<RouteOptions> {
        let _span = info_span!("generate_route_options", weight_kg).entered();
        RouteOptionGenerator::new(self.facilities.as_deref()).generate(origin, destination, weight_kg)
    }

    pub fn calculate_box_loading(&self, dims: &BoxDimensions, vehicle_type: &str) -> Result<LoadingCapacity> {
        loading::calculate_box_loading(dims, vehicle_type)
    }

    fn calculate_legs(
        &self,
        legs: &[RouteLeg],
        weight_kg: f64,
        material: &str,
        policy: VanPolicy,
        box_dimensions: Option<BoxDimensions>,
    ) -> Result<EmissionResult> {
        validate_weight(weight_kg)?;
        let selector = VehicleSelector::new(&self.reference);
        let aggregator = EmissionAggregator::new(&self.reference);

        let mut segments = Vec::with_capacity(legs.len());
        let mut total_distance_km = 0.0;
        let mut total_time_h = 0.0;
        let mut transport = 0.0;

        for leg in legs {
            let distance_km = great_circle_km(&leg.origin, &leg.destination);
            let vehicle = selector.select(distance_km, weight_kg, leg.mode, policy)?;
            let emissions_kg = aggregator.transport(distance_km, weight_kg, &vehicle)?;
            let time_h = leg.mode.travel_time_h(distance_km);

            total_distance_km += distance_km;
            total_time_h += time_h;
            transport += emissions_kg;

            segments.push(TransportSegment {
                origin: leg.origin,
                destination: leg.destination,
                mode: leg.mode,
                vehicle: Some(vehicle),
                distance_km,
                time_h,
                emissions_kg,
            });
        }

        let breakdown = EmissionBreakdown {
            transport,
            ..aggregator.packaging_and_waste(weight_kg, material)?
        };

        let loading = box_dimensions
            .map(|dims| loading_per_vehicle(&segments, &dims))
            .transpose()?;

        let result = EmissionResult {
            segments,
            material: material.to_string(),
            co2e: breakdown.total(),
            breakdown,
            total_distance_km,
            total_time_h,
            box_dimensions,
            loading,
        };
        info!(
            co2e = result.co2e,
            distance_km = result.total_distance_km,
            legs = result.segments.len(),
            "emissions calculated"
        );
        Ok(result)
    }
}

/// Loading for each distinct vehicle that has a known interior profile
fn loading_per_vehicle(
    segments: &[TransportSegment],
    dims: &BoxDimensions,
) -> Result<BTreeMap<String, LoadingCapacity>> {
    let mut loading = BTreeMap::new();
    for vehicle in segments.iter().filter_map(|s| s.vehicle.as_deref()) {
        if loading.contains_key(vehicle) {
            continue;
        }
        match loading::find_profile(vehicle) {
            Some(profile) => {
                loading.insert(vehicle.to_string(), profile.load(dims)?);
            }
            None => warn!(vehicle, "no interior profile for vehicle, skipping loading"),
        }
    }
    Ok(loading)
}
