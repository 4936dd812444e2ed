//! Eco, standard and express route strategies
//!
//! Options are sketched from fixed distance thresholds rather than real
//! routing, then scored with per-mode nominal speeds and emission factors.

use tracing::debug;

use crate::constants::*;
use crate::distance::great_circle_km;
use crate::error::{EmissionError, Result};
use crate::facility::FacilityLocator;
use crate::models::{Coordinate, RouteLeg, RouteOption, RouteOptions, TransportMode, TransportSegment};
use crate::vehicle::validate_weight;

pub struct RouteOptionGenerator<'a> {
    facilities: Option<&'a dyn FacilityLocator>,
}

impl<'a> RouteOptionGenerator<'a> {
    pub fn new(facilities: Option<&'a dyn FacilityLocator>) -> Self {
        Self { facilities }
    }

    pub fn generate(&self, origin: Coordinate, destination: Coordinate, weight_kg: f64) -> Result<RouteOptions> {
        validate_weight(weight_kg)?;
        let direct_km = great_circle_km(&origin, &destination);
        debug!(direct_km, weight_kg, "generating route options");

        Ok(RouteOptions {
            eco: build_option(
                "eco",
                "Lowest emissions, favouring rail and sea freight",
                self.eco_legs(origin, destination, direct_km)?,
                weight_kg,
                ECO_COST_FACTOR,
            ),
            standard: build_option(
                "standard",
                "Balanced road and rail route",
                standard_legs(origin, destination, direct_km),
                weight_kg,
                STANDARD_COST_FACTOR,
            ),
            express: build_option(
                "express",
                "Fastest delivery using air freight",
                self.express_legs(origin, destination, direct_km)?,
                weight_kg,
                EXPRESS_COST_FACTOR,
            ),
        })
    }

    fn locator(&self, needed: &str) -> Result<&'a dyn FacilityLocator> {
        self.facilities
            .ok_or_else(|| EmissionError::lookup("facility locator", needed))
    }

    fn eco_legs(&self, origin: Coordinate, destination: Coordinate, direct_km: f64) -> Result<Vec<RouteLeg>> {
        if direct_km < ECO_SINGLE_LEG_MAX_KM {
            return Ok(vec![RouteLeg::new(origin, destination, TransportMode::Rail)]);
        }
        let locator = self.locator("nearest port")?;
        let from_port = locator.nearest_port(&origin)?.coordinate;
        let to_port = locator.nearest_port(&destination)?.coordinate;
        Ok(vec![
            RouteLeg::new(origin, from_port, TransportMode::Road),
            RouteLeg::new(from_port, to_port, TransportMode::Sea),
            RouteLeg::new(to_port, destination, TransportMode::Road),
        ])
    }

    fn express_legs(&self, origin: Coordinate, destination: Coordinate, direct_km: f64) -> Result<Vec<RouteLeg>> {
        if direct_km < EXPRESS_SINGLE_LEG_MAX_KM {
            return Ok(vec![RouteLeg::new(origin, destination, TransportMode::Road)]);
        }
        let locator = self.locator("nearest airport")?;
        let from_airport = locator.nearest_airport(&origin)?.coordinate;
        let to_airport = locator.nearest_airport(&destination)?.coordinate;
        Ok(vec![
            RouteLeg::new(origin, from_airport, TransportMode::Road),
            RouteLeg::new(from_airport, to_airport, TransportMode::Air),
            RouteLeg::new(to_airport, destination, TransportMode::Road),
        ])
    }
}

fn standard_legs(origin: Coordinate, destination: Coordinate, direct_km: f64) -> Vec<RouteLeg> {
    if direct_km < STANDARD_SINGLE_LEG_MAX_KM {
        return vec![RouteLeg::new(origin, destination, TransportMode::Road)];
    }
    let midpoint = origin.midpoint(&destination);
    vec![
        RouteLeg::new(origin, midpoint, TransportMode::Road),
        RouteLeg::new(midpoint, destination, TransportMode::Rail),
    ]
}

/// Score a leg with the mode's nominal speed and factor
pub fn plan_segment(leg: &RouteLeg, weight_kg: f64) -> TransportSegment {
    let distance_km = great_circle_km(&leg.origin, &leg.destination);
    TransportSegment {
        origin: leg.origin,
        destination: leg.destination,
        mode: leg.mode,
        vehicle: None,
        distance_km,
        time_h: leg.mode.travel_time_h(distance_km),
        emissions_kg: distance_km * leg.mode.nominal_factor() * (weight_kg / 1000.0),
    }
}

fn build_option(
    name: &str,
    description: &str,
    legs: Vec<RouteLeg>,
    weight_kg: f64,
    cost_factor: f64,
) -> RouteOption {
    let segments: Vec<TransportSegment> = legs.iter().map(|leg| plan_segment(leg, weight_kg)).collect();

    let mut total_distance_km = 0.0;
    let mut total_time_h = 0.0;
    let mut estimated_emissions_kg = 0.0;
    for segment in &segments {
        total_distance_km += segment.distance_km;
        total_time_h += segment.time_h;
        estimated_emissions_kg += segment.emissions_kg;
    }

    RouteOption {
        name: name.to_string(),
        description: description.to_string(),
        segments,
        total_time_h,
        total_distance_km,
        estimated_emissions_kg,
        cost_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::FacilityDirectory;
    use crate::sample;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn short_haul_options_are_single_legs() {
        // London to Cambridge, about 80 km
        let generator = RouteOptionGenerator::new(None);
        let options = generator.generate(coord(51.5074, -0.1278), coord(52.2053, 0.1218), 500.0).unwrap();

        assert_eq!(options.eco.segments.len(), 1);
        assert_eq!(options.eco.segments[0].mode, TransportMode::Rail);
        assert_eq!(options.standard.segments[0].mode, TransportMode::Road);
        assert_eq!(options.express.segments[0].mode, TransportMode::Road);

        let eco = &options.eco;
        let distance = eco.total_distance_km;
        assert!((eco.total_time_h - distance / RAIL_SPEED_KMH).abs() < 1e-12);
        assert!((eco.estimated_emissions_kg - distance * RAIL_NOMINAL_FACTOR * 0.5).abs() < 1e-12);
    }

    #[test]
    fn cost_factors_do_not_depend_on_distance() {
        let directory = FacilityDirectory::new(sample::facilities().unwrap());
        let generator = RouteOptionGenerator::new(Some(&directory as &dyn FacilityLocator));
        for destination in [coord(52.2053, 0.1218), coord(48.8566, 2.3522), coord(40.7128, -74.006)] {
            let options = generator.generate(coord(51.5074, -0.1278), destination, 1000.0).unwrap();
            assert_eq!(options.eco.cost_factor, 0.8);
            assert_eq!(options.standard.cost_factor, 1.0);
            assert_eq!(options.express.cost_factor, 2.5);
        }
    }

    #[test]
    fn long_haul_uses_ports_airports_and_midpoint() {
        let directory = FacilityDirectory::new(sample::facilities().unwrap());
        let generator = RouteOptionGenerator::new(Some(&directory as &dyn FacilityLocator));
        let london = coord(51.5074, -0.1278);
        let new_york = coord(40.7128, -74.006);
        let options = generator.generate(london, new_york, 1000.0).unwrap();

        let eco_modes: Vec<_> = options.eco.segments.iter().map(|s| s.mode).collect();
        assert_eq!(eco_modes, vec![TransportMode::Road, TransportMode::Sea, TransportMode::Road]);
        assert_eq!(options.eco.segments[0].destination, coord(51.9617, 1.3513));

        let express_modes: Vec<_> = options.express.segments.iter().map(|s| s.mode).collect();
        assert_eq!(express_modes, vec![TransportMode::Road, TransportMode::Air, TransportMode::Road]);

        let midpoint = london.midpoint(&new_york);
        assert_eq!(options.standard.segments.len(), 2);
        assert_eq!(options.standard.segments[0].destination, midpoint);
        assert_eq!(options.standard.segments[1].mode, TransportMode::Rail);

        let summed: f64 = options.express.segments.iter().map(|s| s.distance_km).sum();
        assert!((options.express.total_distance_km - summed).abs() < 1e-9);
        assert!(options.express.total_time_h < options.eco.total_time_h);
    }

    #[test]
    fn missing_locator_is_lookup_failure() {
        let generator = RouteOptionGenerator::new(None);
        let err = generator
            .generate(coord(51.5074, -0.1278), coord(40.7128, -74.006), 1000.0)
            .unwrap_err();
        assert!(matches!(err, EmissionError::LookupFailure { .. }));
    }

    #[test]
    fn rejects_non_positive_weight() {
        let generator = RouteOptionGenerator::new(None);
        assert!(matches!(
            generator.generate(coord(0.0, 0.0), coord(0.1, 0.1), 0.0),
            Err(EmissionError::InvalidInput(_))
        ));
    }
}
