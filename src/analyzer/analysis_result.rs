use serde::{Deserialize, Serialize};

use crate::map::{severity_message, Severity};

/// Outcome of one lookup, shaped for JSON consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub latitude: f64,
    pub longitude: f64,
    pub severity_id: String,
    pub severity_message: String,
    #[serde(skip)]
    pub severity: Option<Severity>,
}

impl AnalysisResult {
    pub fn new(latitude: f64, longitude: f64, severity: Option<Severity>) -> Self {
        let (id, message) = severity_message(severity);
        Self {
            latitude,
            longitude,
            severity_id: id.to_string(),
            severity_message: message.to_string(),
            severity,
        }
    }

    /// False when the sampled color matched no legend entry.
    pub fn is_known(&self) -> bool {
        self.severity.is_some()
    }
}
