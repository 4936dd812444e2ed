//! Plain-text rendering of calculation results

use std::fmt;

use crate::models::{EmissionResult, LoadingCapacity, RouteOption, RouteOptions, TransportSegment};

/// Hours as "Xh Ym"
pub fn format_duration(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round() as u64;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

fn write_segment(f: &mut fmt::Formatter<'_>, index: usize, segment: &TransportSegment) -> fmt::Result {
    let vehicle = segment.vehicle.as_deref().unwrap_or("nominal");
    writeln!(
        f,
        "  {}. {:<5} {} -> {}  {:>9.2} km  {:>8}  {:>10.2} kg CO2e  ({})",
        index + 1,
        segment.mode,
        segment.origin,
        segment.destination,
        segment.distance_km,
        format_duration(segment.time_h),
        segment.emissions_kg,
        vehicle
    )
}

impl fmt::Display for EmissionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Carbon Footprint ===")?;
        if let Some(vehicle) = self.vehicle() {
            writeln!(f, "Recommended vehicle: {}", vehicle)?;
        }
        writeln!(f, "Packaging material:  {}", self.material)?;
        writeln!(f, "Distance:            {:.2} km", self.total_distance_km)?;
        writeln!(f, "Estimated time:      {}", format_duration(self.total_time_h))?;
        writeln!(f)?;

        writeln!(f, "Route:")?;
        for (i, segment) in self.segments.iter().enumerate() {
            write_segment(f, i, segment)?;
        }
        writeln!(f)?;

        writeln!(f, "Emissions:")?;
        writeln!(f, "  Transport: {:>10.2} kg CO2e", self.breakdown.transport)?;
        writeln!(f, "  Packaging: {:>10.2} kg CO2e", self.breakdown.packaging)?;
        writeln!(f, "  Waste:     {:>10.2} kg CO2e", self.breakdown.waste)?;
        writeln!(f, "  Total:     {:>10.2} kg CO2e", self.co2e)?;

        if let Some(loading) = &self.loading {
            writeln!(f)?;
            writeln!(f, "Loading:")?;
            if loading.is_empty() {
                writeln!(f, "  no vehicle with a known interior")?;
            }
            for (vehicle, capacity) in loading {
                writeln!(
                    f,
                    "  {}: {} boxes ({:.1}% of {})",
                    vehicle, capacity.total_boxes, capacity.utilization_pct, capacity.vehicle
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for LoadingCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Loading: {} ===", self.vehicle)?;
        writeln!(
            f,
            "Grid:        {} rows x {} columns x {} layers",
            self.rows, self.columns, self.layers
        )?;
        writeln!(f, "Total boxes: {}", self.total_boxes)?;
        writeln!(f, "Utilization: {:.1}%", self.utilization_pct)?;
        writeln!(f, "Remaining:   {:.3} m3", self.remaining_volume_m3)
    }
}

impl fmt::Display for RouteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.name, self.description)?;
        writeln!(
            f,
            "  {:.2} km, {}, {:.2} kg CO2e, cost x{:.1}",
            self.total_distance_km,
            format_duration(self.total_time_h),
            self.estimated_emissions_kg,
            self.cost_factor
        )?;
        for (i, segment) in self.segments.iter().enumerate() {
            write_segment(f, i, segment)?;
        }
        Ok(())
    }
}

impl fmt::Display for RouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Route Options ===")?;
        for option in self.iter() {
            writeln!(f)?;
            write!(f, "{}", option)?;
        }
        Ok(())
    }
}
