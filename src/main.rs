//! Carbon Calculator
//!
//! Command-line front-end for shipment emission estimates.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use regex::Regex;
use rusqlite::Connection;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use carbon_calculator::facility::FacilityDirectory;
use carbon_calculator::models::{BoxDimensions, Coordinate, RouteLeg, TableId, TransportMode};
use carbon_calculator::reference::material_aliases;
use carbon_calculator::vehicle::VehicleSelector;
use carbon_calculator::{EmissionCalculator, db, import, sample};

#[derive(Parser)]
#[command(name = "carbon-calculator")]
#[command(about = "Carbon emission calculator for shipments")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, default_value = "emissions.db")]
    database: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import emission factor tables and facilities from CSV files
    Import {
        /// Directory containing transport/material/waste/facilities CSV files
        data_dir: PathBuf,

        /// Clear existing data before import
        #[arg(long)]
        clear: bool,
    },

    /// Calculate emissions for a single road shipment
    Calc {
        /// Origin as "lat,lon"
        #[arg(short, long)]
        origin: String,

        /// Destination as "lat,lon"
        #[arg(short = 't', long)]
        destination: String,

        /// Shipment weight in kg
        #[arg(short, long)]
        weight: f64,

        /// Packaging material
        #[arg(short, long, default_value = "cardboard")]
        material: String,

        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Calculate emissions for a multi-modal route
    Multimodal {
        /// Route leg as "mode:lat,lon->lat,lon" (repeat in route order)
        #[arg(short, long = "leg", required = true)]
        legs: Vec<String>,

        /// Shipment weight in kg
        #[arg(short, long)]
        weight: f64,

        /// Packaging material
        #[arg(short, long, default_value = "cardboard")]
        material: String,

        /// Box size in cm as "LxWxH" to compute loading per vehicle
        #[arg(short, long = "box")]
        box_size: Option<String>,

        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Compare eco, standard and express route options
    Options {
        /// Origin as "lat,lon"
        #[arg(short, long)]
        origin: String,

        /// Destination as "lat,lon"
        #[arg(short = 't', long)]
        destination: String,

        /// Shipment weight in kg
        #[arg(short, long)]
        weight: f64,

        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// How many boxes fit in a vehicle
    Box {
        /// Box size in cm as "LxWxH"
        size: String,

        /// Vehicle or container type (e.g. "Class I van", "40ft container")
        #[arg(short = 'V', long)]
        vehicle: String,

        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// List transport records by mode
    ListVehicles,

    /// List material aliases and categories
    ListMaterials,

    /// List ports and airports
    ListFacilities,

    /// Initialize empty database with schema
    Init,

    /// Load sample reference data for testing (without source spreadsheets)
    LoadSample,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("carbon_calculator={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_coordinate(text: &str) -> Result<Coordinate> {
    let re = Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$")?;
    let cap = re
        .captures(text)
        .ok_or_else(|| anyhow!("expected coordinates as 'lat,lon', got '{}'", text))?;
    Ok(Coordinate::new(cap[1].parse()?, cap[2].parse()?)?)
}

fn parse_leg(text: &str) -> Result<RouteLeg> {
    let re = Regex::new(r"^\s*(\w+)\s*:\s*([^>]+?)\s*->\s*(.+?)\s*$")?;
    let cap = re
        .captures(text)
        .ok_or_else(|| anyhow!("expected leg as 'mode:lat,lon->lat,lon', got '{}'", text))?;
    Ok(RouteLeg::new(
        parse_coordinate(&cap[2])?,
        parse_coordinate(&cap[3])?,
        cap[1].parse::<TransportMode>()?,
    ))
}

fn parse_box(text: &str) -> Result<BoxDimensions> {
    let re = Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*[xX*]\s*(\d+(?:\.\d+)?)\s*[xX*]\s*(\d+(?:\.\d+)?)\s*$")?;
    let cap = re
        .captures(text)
        .ok_or_else(|| anyhow!("expected box size in cm as 'LxWxH', got '{}'", text))?;
    Ok(BoxDimensions::from_centimeters(cap[1].parse()?, cap[2].parse()?, cap[3].parse()?)?)
}

fn print_result<T: Serialize + std::fmt::Display>(result: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{}", result);
    }
    Ok(())
}

fn load_calculator(conn: &Connection) -> Result<Option<EmissionCalculator>> {
    let calculator = EmissionCalculator::from_connection(conn)?;
    if calculator.reference().is_empty() {
        println!("No reference data in database. Run 'import' or 'load-sample' first.");
        return Ok(None);
    }
    Ok(Some(calculator))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let conn = Connection::open(&cli.database)?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Import { data_dir, clear } => {
            if clear {
                println!("Clearing existing data...");
                db::clear_reference_data(&conn)?;
            }

            let stats = import::import_to_database(&conn, &data_dir)?;
            println!("{}", stats);
        }

        Commands::Calc {
            origin,
            destination,
            weight,
            material,
            json,
        } => {
            let origin = parse_coordinate(&origin)?;
            let destination = parse_coordinate(&destination)?;
            if let Some(calculator) = load_calculator(&conn)? {
                let result = calculator.calculate(origin, destination, weight, &material)?;
                print_result(&result, json)?;
            }
        }

        Commands::Multimodal {
            legs,
            weight,
            material,
            box_size,
            json,
        } => {
            let legs = legs.iter().map(|l| parse_leg(l)).collect::<Result<Vec<_>>>()?;
            let box_dimensions = box_size.as_deref().map(parse_box).transpose()?;
            if let Some(calculator) = load_calculator(&conn)? {
                let result = calculator.calculate_multimodal(&legs, weight, &material, box_dimensions)?;
                print_result(&result, json)?;
            }
        }

        Commands::Options {
            origin,
            destination,
            weight,
            json,
        } => {
            let origin = parse_coordinate(&origin)?;
            let destination = parse_coordinate(&destination)?;
            let calculator = EmissionCalculator::from_connection(&conn)?;
            let options = calculator.generate_route_options(origin, destination, weight)?;
            print_result(&options, json)?;
        }

        Commands::Box { size, vehicle, json } => {
            let dims = parse_box(&size)?;
            let calculator = EmissionCalculator::from_connection(&conn)?;
            let capacity = calculator.calculate_box_loading(&dims, &vehicle)?;
            print_result(&capacity, json)?;
        }

        Commands::ListVehicles => {
            let Some(calculator) = load_calculator(&conn)? else {
                return Ok(());
            };
            let selector = VehicleSelector::new(calculator.reference());
            println!("{:<6} {:<32} {:<36} {:<10} {:>10}", "Mode", "Category", "Vehicle", "Unit", "Factor");
            println!("{}", "-".repeat(98));
            for mode in TransportMode::ALL {
                for r in selector.candidates(mode) {
                    let factor = r.factor.map_or_else(|| "-".to_string(), |f| format!("{:.5}", f));
                    println!("{:<6} {:<32} {:<36} {:<10} {:>10}", mode, r.level2, r.level3, r.uom, factor);
                }
            }
        }

        Commands::ListMaterials => {
            println!("Aliases:");
            for (alias, category) in material_aliases() {
                println!("  {:<14} -> {}", alias, category);
            }
            let records = db::list_reference_records(&conn, TableId::Material)?;
            if records.is_empty() {
                println!("No materials in database. Run 'import' or 'load-sample' first.");
            } else {
                println!("Material categories:");
                for r in records {
                    println!("  {} ({})", r.label(), r.uom);
                }
            }
        }

        Commands::ListFacilities => {
            let directory = FacilityDirectory::from_connection(&conn)?;
            if directory.is_empty() {
                println!("No facilities in database. Run 'import' or 'load-sample' first.");
            } else {
                for f in directory.facilities() {
                    println!("{:<8} {:<36} {}", f.kind.name(), f.name, f.coordinate);
                }
            }
        }

        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            let count = sample::load_into(&conn)?;
            println!("Loaded {} sample records", count);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinates() {
        let c = parse_coordinate(" 51.5074, -0.1278 ").unwrap();
        assert_eq!(c.latitude(), 51.5074);
        assert_eq!(c.longitude(), -0.1278);
        assert!(parse_coordinate("London").is_err());
        assert!(parse_coordinate("95,0").is_err());
    }

    #[test]
    fn parses_legs() {
        let leg = parse_leg("sea:51.9617,1.3513->51.949,4.1453").unwrap();
        assert_eq!(leg.mode, TransportMode::Sea);
        assert_eq!(leg.origin.longitude(), 1.3513);
        assert_eq!(leg.destination.latitude(), 51.949);

        let negative = parse_leg("road:40.7,-74.0->34.05,-118.24").unwrap();
        assert_eq!(negative.origin.longitude(), -74.0);
        assert_eq!(negative.destination.longitude(), -118.24);

        assert!(parse_leg("boat:1,1->2,2").is_err());
        assert!(parse_leg("road:1,1").is_err());
    }

    #[test]
    fn parses_box_in_centimeters() {
        let dims = parse_box("60x40x40").unwrap();
        assert!((dims.length - 0.6).abs() < 1e-12);
        assert!((dims.height - 0.4).abs() < 1e-12);
        assert!(parse_box("60x0x40").is_err());
        assert!(parse_box("60x40").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
