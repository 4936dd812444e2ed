//! Built-in sample reference data for trying the calculator without source spreadsheets

use anyhow::Result;
use rusqlite::Connection;

use crate::db;
use crate::error::Result as EngineResult;
use crate::models::{Coordinate, Facility, FacilityKind, ReferenceRecord, TableId};
use crate::reference::ReferenceData;

fn row(level1: &str, level2: &str, level3: &str, uom: &str, factor: Option<f64>) -> ReferenceRecord {
    ReferenceRecord::new(level1, level2, level3, uom, factor)
}

pub fn transport_records() -> Vec<ReferenceRecord> {
    const DELIVERY: &str = "Delivery vehicles";
    const FREIGHT: &str = "Freighting goods";
    const WTT: &str = "WTT- delivery vehicles & freight";

    vec![
        row(DELIVERY, "Vans", "Average (up to 3.5 tonnes)", "km", Some(0.24024)),
        row(DELIVERY, "Vans", "Class I (up to 1.305 tonnes)", "km", Some(0.14617)),
        row(DELIVERY, "Vans", "Class II (1.305 to 1.74 tonnes)", "km", Some(0.21724)),
        row(DELIVERY, "Vans", "Class III (1.74 to 3.5 tonnes)", "km", Some(0.28985)),
        row(DELIVERY, "HGV (all diesel)", "Rigid (>3.5 - 7.5 tonnes)", "km", Some(0.48688)),
        row(DELIVERY, "HGV (all diesel)", "Articulated (>33t)", "km", Some(0.86536)),
        // Factor not published for this class
        row(DELIVERY, "HGV refrigerated (all diesel)", "Rigid (>17 tonnes)", "km", None),
        row(WTT, "WTT- vans", "Class I (up to 1.305 tonnes)", "km", Some(0.03535)),
        row(WTT, "WTT- HGV (all diesel)", "Rigid (>3.5 - 7.5 tonnes)", "km", Some(0.11416)),
        row(FREIGHT, "Rail", "Freight train", "tonne.km", Some(0.02782)),
        row(FREIGHT, "Cargo ship", "Container ship - Average", "tonne.km", Some(0.01612)),
        row(FREIGHT, "Cargo ship", "Bulk carrier - Average", "tonne.km", Some(0.00353)),
        row(FREIGHT, "Sea tanker", "Crude tanker - Average", "tonne.km", Some(0.00456)),
        row(FREIGHT, "Freight flights", "International, to/from non-UK", "tonne.km", Some(0.59295)),
        row(FREIGHT, "Freight flights", "Domestic, to/from UK", "tonne.km", Some(2.38434)),
    ]
}

pub fn material_records() -> Vec<ReferenceRecord> {
    const USE: &str = "Material use";

    vec![
        row(USE, "Paper", "Paper and board: board", "tonnes", Some(821.31)),
        row(USE, "Paper", "Paper and board: mixed", "tonnes", Some(864.33)),
        row(USE, "Paper", "Paper and board: paper", "tonnes", Some(919.40)),
        row(USE, "Plastic", "Plastics: average plastics", "tonnes", Some(3116.29)),
        row(USE, "Plastic", "Plastics: average plastic film", "tonnes", Some(2918.12)),
        row(USE, "Plastic", "Plastics: average plastic rigid", "tonnes", Some(3180.34)),
        row(USE, "Metal", "Metal: aluminium cans and foil (excl. forming)", "tonnes", Some(9107.79)),
        row(USE, "Metal", "Metal: scrap metal", "tonnes", Some(3604.95)),
        row(USE, "Metal", "Metal: steel cans", "tonnes", Some(2855.10)),
        row(USE, "Other", "Glass", "tonnes", Some(1402.77)),
        row(USE, "Other", "Wood", "tonnes", Some(312.61)),
    ]
}

pub fn waste_records() -> Vec<ReferenceRecord> {
    const DISPOSAL: &str = "Waste disposal";

    vec![
        row(DISPOSAL, "Paper and board: board", "Closed-loop", "tonnes", Some(21.28)),
        row(DISPOSAL, "Paper and board: board", "Combustion", "tonnes", Some(21.28)),
        row(DISPOSAL, "Paper and board: board", "Landfill", "tonnes", Some(1164.28)),
        row(DISPOSAL, "Glass", "Open-loop", "tonnes", Some(21.28)),
        row(DISPOSAL, "Commercial and industrial waste", "Landfill", "tonnes", Some(520.33)),
    ]
}

pub fn reference_data() -> ReferenceData {
    ReferenceData::new(transport_records(), material_records(), waste_records())
}

fn facility(name: &str, kind: FacilityKind, latitude: f64, longitude: f64) -> EngineResult<Facility> {
    Ok(Facility {
        name: name.to_string(),
        kind,
        coordinate: Coordinate::new(latitude, longitude)?,
    })
}

pub fn facilities() -> EngineResult<Vec<Facility>> {
    use FacilityKind::{Airport, Port};

    [
        ("Port of Felixstowe", Port, 51.9617, 1.3513),
        ("Port of Rotterdam", Port, 51.9490, 4.1453),
        ("Port of Hamburg", Port, 53.5461, 9.9661),
        ("Port of New York and New Jersey", Port, 40.6840, -74.1502),
        ("Port of Shanghai", Port, 31.2304, 121.4737),
        ("Port of Singapore", Port, 1.2644, 103.8222),
        ("London Heathrow", Airport, 51.4700, -0.4543),
        ("Paris Charles de Gaulle", Airport, 49.0097, 2.5479),
        ("Frankfurt am Main", Airport, 50.0379, 8.5622),
        ("New York JFK", Airport, 40.6413, -73.7781),
        ("Shanghai Pudong", Airport, 31.1443, 121.8083),
        ("Singapore Changi", Airport, 1.3644, 103.9915),
    ]
    .into_iter()
    .map(|(name, kind, latitude, longitude)| facility(name, kind, latitude, longitude))
    .collect()
}

/// Replace the database contents with the sample set
pub fn load_into(conn: &Connection) -> Result<usize> {
    db::clear_reference_data(conn)?;

    let tables = [
        (TableId::Transport, transport_records()),
        (TableId::Material, material_records()),
        (TableId::Waste, waste_records()),
    ];

    let mut count = 0;
    for (table, records) in &tables {
        for record in records {
            db::insert_reference_record(conn, *table, record)?;
            count += 1;
        }
    }
    for f in facilities()? {
        db::insert_facility(conn, &f)?;
        count += 1;
    }
    Ok(count)
}
