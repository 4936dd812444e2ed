//! Read-only lookup over the transport, material and waste factor tables
//!
//! Tables are loaded once and never mutated afterwards, so a single
//! [`ReferenceData`] can be shared by any number of concurrent calculations.

use anyhow::Result as AnyResult;
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::db;
use crate::error::{EmissionError, Result};
use crate::models::{ReferenceRecord, TableId};

/// Common packaging names mapped to material table categories
const MATERIAL_ALIASES: &[(&str, &str)] = &[
    ("cardboard", "Paper and board: board"),
    ("board", "Paper and board: board"),
    ("paper", "Paper and board: paper"),
    ("mixed paper", "Paper and board: mixed"),
    ("mixed", "Paper and board: mixed"),
    ("plastic", "Plastics: average plastics"),
    ("plastic film", "Plastics: average plastic film"),
    ("plastic rigid", "Plastics: average plastic rigid"),
    ("metal", "Metal: scrap metal"),
    ("aluminum", "Metal: aluminium cans and foil (excl. forming)"),
    ("aluminium", "Metal: aluminium cans and foil (excl. forming)"),
    ("steel", "Metal: steel cans"),
    ("glass", "Glass"),
    ("wood", "Wood"),
];

const WASTE_SPECIFIC_TAGS: &[&str] = &["paper", "board"];
const WASTE_GENERIC_TAGS: &[&str] = &["waste", "disposal"];

/// How a factor's unit of measure combines with distance and weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// per tonne-km
    DistanceWeight,
    /// per km
    DistanceOnly,
    Other,
}

impl UnitKind {
    pub fn classify(uom: &str) -> UnitKind {
        let uom = uom.to_lowercase();
        if uom.contains("tonne.km") || uom.contains("tonne km") || uom.contains("tonne-km") {
            UnitKind::DistanceWeight
        } else if uom.contains("km") {
            UnitKind::DistanceOnly
        } else {
            UnitKind::Other
        }
    }
}

pub fn unit_kind(record: &ReferenceRecord) -> UnitKind {
    UnitKind::classify(&record.uom)
}

/// Factors expressed per tonne of material rather than per kg
pub fn is_mass_in_tonnes(record: &ReferenceRecord) -> bool {
    record.uom.to_lowercase().contains("tonne")
}

/// Map a packaging name to its material category. Unmapped names pass through.
pub fn standardize_material(material: &str) -> String {
    let key = material.trim().to_lowercase();
    MATERIAL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, category)| category.to_string())
        .unwrap_or_else(|| material.trim().to_string())
}

pub fn material_aliases() -> &'static [(&'static str, &'static str)] {
    MATERIAL_ALIASES
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    transport: Vec<ReferenceRecord>,
    material: Vec<ReferenceRecord>,
    waste: Vec<ReferenceRecord>,
}

impl ReferenceData {
    pub fn new(
        transport: Vec<ReferenceRecord>,
        material: Vec<ReferenceRecord>,
        waste: Vec<ReferenceRecord>,
    ) -> Self {
        let data = Self {
            transport,
            material,
            waste,
        };
        for (alias, category) in data.unresolved_aliases() {
            warn!(alias, category, "material alias does not resolve to a reference record");
        }
        debug!(
            transport = data.transport.len(),
            material = data.material.len(),
            waste = data.waste.len(),
            "reference data loaded"
        );
        data
    }

    /// Read all three tables from the database in stored order
    pub fn from_connection(conn: &Connection) -> AnyResult<Self> {
        Ok(Self::new(
            db::list_reference_records(conn, TableId::Transport)?,
            db::list_reference_records(conn, TableId::Material)?,
            db::list_reference_records(conn, TableId::Waste)?,
        ))
    }

    pub fn records(&self, table: TableId) -> &[ReferenceRecord] {
        match table {
            TableId::Transport => &self.transport,
            TableId::Material => &self.material,
            TableId::Waste => &self.waste,
        }
    }

    pub fn is_empty(&self) -> bool {
        TableId::ALL.iter().all(|t| self.records(*t).is_empty())
    }

    /// Find the record for a category hint.
    ///
    /// Exact (case-insensitive) matches on level 3, then level 2, win over
    /// substring matches of either level. At every stage, hits that span more
    /// than one category path are reported as ambiguous rather than resolved
    /// by row order.
    pub fn lookup(&self, table: TableId, hint: &str) -> Result<&ReferenceRecord> {
        let needle = hint.trim().to_lowercase();
        if needle.is_empty() {
            return Err(EmissionError::lookup(table.name(), hint));
        }
        let records = self.records(table);

        let exact_level3: Vec<&ReferenceRecord> =
            records.iter().filter(|r| r.level3.to_lowercase() == needle).collect();
        if !exact_level3.is_empty() {
            return single_category(table, hint, exact_level3);
        }
        let exact_level2: Vec<&ReferenceRecord> =
            records.iter().filter(|r| r.level2.to_lowercase() == needle).collect();
        if !exact_level2.is_empty() {
            return single_category(table, hint, exact_level2);
        }

        let hits: Vec<&ReferenceRecord> = records
            .iter()
            .filter(|r| {
                r.level2.to_lowercase().contains(&needle) || r.level3.to_lowercase().contains(&needle)
            })
            .collect();
        if hits.is_empty() {
            return Err(EmissionError::lookup_with_candidates(
                table.name(),
                hint,
                distinct_labels(records.iter()),
            ));
        }
        single_category(table, hint, hits)
    }

    /// Resolve a vehicle name returned by vehicle selection: level 3 first, then level 2.
    /// Well-to-tank rows are never treated as the vehicle itself.
    ///
    /// A coarse (level 2) name resolves to the first row of that category, whose
    /// factor can differ from the row that won selection.
    pub fn find_vehicle(&self, name: &str) -> Result<&ReferenceRecord> {
        let direct = || self.transport.iter().filter(|r| !r.is_well_to_tank());
        direct()
            .find(|r| r.level3 == name)
            .or_else(|| direct().find(|r| r.level2 == name))
            .ok_or_else(|| EmissionError::lookup(TableId::Transport.name(), name))
    }

    /// Disposal record used for packaging waste.
    ///
    /// Prefers a paper/board record, then any generic waste/disposal record.
    /// `None` means no usable record exists and waste counts as zero.
    pub fn waste_record(&self) -> Option<&ReferenceRecord> {
        let tagged = |r: &ReferenceRecord, tags: &[&str], check_level3: bool| {
            let l2 = r.level2.to_lowercase();
            let l3 = r.level3.to_lowercase();
            tags.iter()
                .any(|tag| l2.contains(tag) || (check_level3 && l3.contains(tag)))
        };

        self.waste
            .iter()
            .find(|r| tagged(*r, WASTE_SPECIFIC_TAGS, true))
            .or_else(|| self.waste.iter().find(|r| tagged(*r, WASTE_GENERIC_TAGS, false)))
    }

    /// Aliases whose target category is absent from the material table
    pub fn unresolved_aliases(&self) -> Vec<(&'static str, &'static str)> {
        if self.material.is_empty() {
            return Vec::new();
        }
        MATERIAL_ALIASES
            .iter()
            .filter(|(_, category)| self.lookup(TableId::Material, category).is_err())
            .copied()
            .collect()
    }
}

/// First hit, provided every hit shares one category path
fn single_category<'a>(table: TableId, hint: &str, hits: Vec<&'a ReferenceRecord>) -> Result<&'a ReferenceRecord> {
    let paths = distinct_labels(hits.iter().copied());
    if paths.len() > 1 {
        return Err(EmissionError::lookup_with_candidates(table.name(), hint, paths));
    }
    hits.first()
        .copied()
        .ok_or_else(|| EmissionError::lookup(table.name(), hint))
}

/// Distinct "level2 / level3" labels in first-seen order
fn distinct_labels<'a>(records: impl Iterator<Item = &'a ReferenceRecord>) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for record in records {
        let label = if record.level3.trim().is_empty() {
            record.level2.clone()
        } else {
            format!("{} / {}", record.level2, record.level3)
        };
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    fn record(l2: &str, l3: &str, uom: &str, factor: Option<f64>) -> ReferenceRecord {
        ReferenceRecord::new("Test", l2, l3, uom, factor)
    }

    #[test]
    fn unit_classification() {
        assert_eq!(UnitKind::classify("tonne.km"), UnitKind::DistanceWeight);
        assert_eq!(UnitKind::classify("Tonne km"), UnitKind::DistanceWeight);
        assert_eq!(UnitKind::classify("km"), UnitKind::DistanceOnly);
        assert_eq!(UnitKind::classify("passenger.km"), UnitKind::DistanceOnly);
        assert_eq!(UnitKind::classify("tonnes"), UnitKind::Other);
        assert_eq!(UnitKind::classify(""), UnitKind::Other);
    }

    #[test]
    fn material_aliases_are_case_insensitive() {
        assert_eq!(standardize_material("Cardboard"), "Paper and board: board");
        assert_eq!(standardize_material("PLASTIC FILM"), "Plastics: average plastic film");
        assert_eq!(standardize_material("Bubble wrap"), "Bubble wrap");
    }

    #[test]
    fn exact_match_beats_substring() {
        let data = ReferenceData::new(
            vec![],
            vec![
                record("Paper", "Paper and board: board", "tonnes", Some(821.0)),
                record("Paper", "Paper and board: paper", "tonnes", Some(919.0)),
            ],
            vec![],
        );
        let hit = data.lookup(TableId::Material, "paper and board: PAPER").unwrap();
        assert_eq!(hit.factor, Some(919.0));
    }

    #[test]
    fn ambiguous_substring_is_reported() {
        let data = ReferenceData::new(
            vec![],
            vec![
                record("Paper", "Paper and board: board", "tonnes", Some(821.0)),
                record("Paper", "Paper and board: paper", "tonnes", Some(919.0)),
            ],
            vec![],
        );
        match data.lookup(TableId::Material, "and board") {
            Err(EmissionError::LookupFailure { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguous lookup, got {:?}", other),
        }
    }

    #[test]
    fn exact_level2_spanning_categories_is_ambiguous() {
        let data = sample::reference_data();
        match data.lookup(TableId::Material, "Paper") {
            Err(EmissionError::LookupFailure { candidates, .. }) => assert_eq!(
                candidates,
                vec![
                    "Paper / Paper and board: board",
                    "Paper / Paper and board: mixed",
                    "Paper / Paper and board: paper",
                ]
            ),
            other => panic!("expected ambiguous lookup, got {:?}", other),
        }

        let single = ReferenceData::new(
            vec![],
            vec![
                record("Glass", "", "tonnes", Some(1402.0)),
                record("Glass", "", "tonnes", Some(895.0)),
            ],
            vec![],
        );
        assert_eq!(single.lookup(TableId::Material, "glass").unwrap().factor, Some(1402.0));
    }

    #[test]
    fn substring_within_one_category_takes_first_row() {
        let data = ReferenceData::new(
            vec![],
            vec![
                record("Other", "Glass", "tonnes", Some(1402.0)),
                record("Other", "Glass", "tonnes", Some(895.0)),
            ],
            vec![],
        );
        let hit = data.lookup(TableId::Material, "gla").unwrap();
        assert_eq!(hit.factor, Some(1402.0));
    }

    #[test]
    fn missing_material_fails_with_candidates() {
        let data = sample::reference_data();
        match data.lookup(TableId::Material, "Unobtainium") {
            Err(EmissionError::LookupFailure { table, candidates, .. }) => {
                assert_eq!(table, "material");
                assert!(!candidates.is_empty());
            }
            other => panic!("expected lookup failure, got {:?}", other),
        }
    }

    #[test]
    fn find_vehicle_skips_well_to_tank_rows() {
        let data = ReferenceData::new(
            vec![
                ReferenceRecord::new("WTT- delivery vehicles", "WTT- vans", "Class I (up to 1.305 tonnes)", "km", Some(0.04)),
                ReferenceRecord::new("Delivery vehicles", "Vans", "Class I (up to 1.305 tonnes)", "km", Some(0.15)),
            ],
            vec![],
            vec![],
        );
        let hit = data.find_vehicle("Class I (up to 1.305 tonnes)").unwrap();
        assert_eq!(hit.factor, Some(0.15));
        assert!(data.find_vehicle("Vans").is_ok());
        assert!(matches!(
            data.find_vehicle("Hovercraft"),
            Err(EmissionError::LookupFailure { .. })
        ));
    }

    #[test]
    fn coarse_vehicle_name_resolves_to_first_category_row() {
        // Bulk carrier wins selection but "Cargo ship" resolves to the container row
        let data = sample::reference_data();
        let hit = data.find_vehicle("Cargo ship").unwrap();
        assert_eq!(hit.level3, "Container ship - Average");
        assert_eq!(hit.factor, Some(0.01612));
    }

    #[test]
    fn waste_prefers_paper_then_generic() {
        let specific = ReferenceData::new(
            vec![],
            vec![],
            vec![
                record("General waste", "Landfill", "tonnes", Some(500.0)),
                record("Paper and board: board", "Landfill", "tonnes", Some(1164.0)),
            ],
        );
        assert_eq!(specific.waste_record().unwrap().factor, Some(1164.0));

        let generic = ReferenceData::new(
            vec![],
            vec![],
            vec![
                record("Glass", "Landfill", "tonnes", Some(8.9)),
                record("Commercial waste", "Landfill", "tonnes", Some(500.0)),
            ],
        );
        assert_eq!(generic.waste_record().unwrap().factor, Some(500.0));

        let none = ReferenceData::new(vec![], vec![], vec![record("Glass", "Landfill", "tonnes", Some(8.9))]);
        assert!(none.waste_record().is_none());
    }

    #[test]
    fn sample_aliases_all_resolve() {
        assert!(sample::reference_data().unresolved_aliases().is_empty());
    }
}
