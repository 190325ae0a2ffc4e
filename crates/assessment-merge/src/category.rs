//! Dementia subtypes reported by the assessment tool.

use serde::{Deserialize, Serialize};

/// A dementia subtype with its own percentage and probability columns.
///
/// The declaration order is the tie-break order for the most-likely type:
/// when several subtypes share the highest probability, the one listed first
/// in [`DementiaType::ALL`] wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DementiaType {
    /// Alzheimer's disease
    #[serde(rename = "AD")]
    Alzheimers,
    /// Dementia with Lewy bodies
    #[serde(rename = "DLB")]
    LewyBody,
    /// Vascular dementia
    #[serde(rename = "VaD")]
    Vascular,
    /// Frontotemporal dementia
    #[serde(rename = "FTD")]
    Frontotemporal,
    /// Primary progressive aphasia
    #[serde(rename = "PPA")]
    ProgressiveAphasia,
}

impl DementiaType {
    /// All subtypes in column and tie-break order.
    pub const ALL: [DementiaType; 5] = [
        DementiaType::Alzheimers,
        DementiaType::LewyBody,
        DementiaType::Vascular,
        DementiaType::Frontotemporal,
        DementiaType::ProgressiveAphasia,
    ];

    /// Key used by the assessment tool in `results.percentages` and
    /// `results.probabilities`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Alzheimers => "AD",
            Self::LewyBody => "DLB",
            Self::Vascular => "VaD",
            Self::Frontotemporal => "FTD",
            Self::ProgressiveAphasia => "PPA",
        }
    }

    /// Look up a subtype by its tool key.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Name of the flattened percentage column.
    pub fn percentage_column(&self) -> String {
        format!("{}_percentage", self.code())
    }

    /// Name of the flattened relative probability column.
    pub fn probability_column(&self) -> String {
        format!("{}_probability", self.code())
    }
}

impl std::fmt::Display for DementiaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
