//! Error taxonomy for the emission engine

use thiserror::Error;

use crate::models::TransportMode;

/// Failures raised by the calculation core.
///
/// Waste-disposal lookups are the one place where a missing record or an
/// unusable factor is not an error: they resolve to zero emissions instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmissionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{table} lookup failed for '{key}'{}", format_candidates(.candidates))]
    LookupFailure {
        table: String,
        key: String,
        candidates: Vec<String>,
    },

    #[error("no {mode} vehicle available for a {weight_kg} kg shipment")]
    NoCandidate { mode: TransportMode, weight_kg: f64 },

    #[error("invalid emission factor in {table} record '{key}'")]
    InvalidFactor { table: String, key: String },
}

impl EmissionError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        EmissionError::InvalidInput(message.into())
    }

    pub fn lookup(table: impl Into<String>, key: impl Into<String>) -> Self {
        EmissionError::LookupFailure {
            table: table.into(),
            key: key.into(),
            candidates: Vec::new(),
        }
    }

    pub fn lookup_with_candidates(
        table: impl Into<String>,
        key: impl Into<String>,
        candidates: Vec<String>,
    ) -> Self {
        EmissionError::LookupFailure {
            table: table.into(),
            key: key.into(),
            candidates,
        }
    }
}

fn format_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        String::new()
    } else {
        format!(" (candidates: {})", candidates.join(", "))
    }
}

pub type Result<T> = std::result::Result<T, EmissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_failure_lists_candidates() {
        let err = EmissionError::lookup_with_candidates(
            "material",
            "paper",
            vec!["Paper and board: board".to_string(), "Paper and board: paper".to_string()],
        );
        assert_eq!(
            err.to_string(),
            "material lookup failed for 'paper' (candidates: Paper and board: board, Paper and board: paper)"
        );
    }

    #[test]
    fn lookup_failure_without_candidates() {
        let err = EmissionError::lookup("vehicle profile", "Zeppelin");
        assert_eq!(err.to_string(), "vehicle profile lookup failed for 'Zeppelin'");
    }
}
