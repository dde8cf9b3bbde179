//! Document categories and intake status.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Declared category of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentCategory {
    /// Floor plan or site drawing.
    SitePlan,
    /// Spreadsheet with built areas and measurements.
    MeasurementSheet,
    /// Any other supporting paperwork (consultations, certificates).
    SupportingDocument,
}

impl DocumentCategory {
    /// Every category.
    pub const ALL: [Self; 3] = [
        Self::SitePlan,
        Self::MeasurementSheet,
        Self::SupportingDocument,
    ];

    /// Stable machine tag, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SitePlan => "site-plan",
            Self::MeasurementSheet => "measurement-sheet",
            Self::SupportingDocument => "supporting-document",
        }
    }

    /// How many required documents fall into this category.
    ///
    /// This is also the most records a workflow keeps for the category.
    #[must_use]
    pub fn required_count(self) -> usize {
        RequiredDocument::ALL
            .iter()
            .filter(|doc| doc.category() == self)
            .count()
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "site-plan" | "planta" => Ok(Self::SitePlan),
            "measurement-sheet" | "planilha" => Ok(Self::MeasurementSheet),
            "supporting-document" | "documento" => Ok(Self::SupportingDocument),
            _ => Err(format!("invalid document category: {s}")),
        }
    }
}

/// Lifecycle of one uploaded document record.
///
/// `Pending -> Uploaded -> Analyzed`, with `Error` reachable from `Pending`
/// when the storage collaborator rejects the upload. An errored record can
/// be retried back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Uploaded,
    Analyzed,
    Error,
}

impl DocumentStatus {
    /// Whether the document counts towards submission.
    #[must_use]
    pub const fn is_stored(self) -> bool {
        matches!(self, Self::Uploaded | Self::Analyzed)
    }
}

/// The fixed set of documents a permit submission asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredDocument {
    FloorPlan,
    MeasurementSheet,
    ViabilityConsultation,
    EnvironmentalConsultation,
    CadastralCertificate,
}

impl RequiredDocument {
    /// Every required document, in intake order.
    pub const ALL: [Self; 5] = [
        Self::FloorPlan,
        Self::MeasurementSheet,
        Self::ViabilityConsultation,
        Self::EnvironmentalConsultation,
        Self::CadastralCertificate,
    ];

    #[must_use]
    pub const fn category(self) -> DocumentCategory {
        match self {
            Self::FloorPlan => DocumentCategory::SitePlan,
            Self::MeasurementSheet => DocumentCategory::MeasurementSheet,
            Self::ViabilityConsultation
            | Self::EnvironmentalConsultation
            | Self::CadastralCertificate => DocumentCategory::SupportingDocument,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FloorPlan => "Planta Baixa",
            Self::MeasurementSheet => "Planilha de Metragens",
            Self::ViabilityConsultation => "Consulta de Viabilidade",
            Self::EnvironmentalConsultation => "Consulta Ambiental",
            Self::CadastralCertificate => "Certidão Cadastral",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_count_per_category() {
        assert_eq!(DocumentCategory::SitePlan.required_count(), 1);
        assert_eq!(DocumentCategory::MeasurementSheet.required_count(), 1);
        assert_eq!(DocumentCategory::SupportingDocument.required_count(), 3);
    }

    #[test]
    fn test_category_serde_is_kebab_case() {
        let json = serde_json::to_string(&DocumentCategory::MeasurementSheet).unwrap();
        assert_eq!(json, "\"measurement-sheet\"");
    }

    #[test]
    fn test_category_from_str_accepts_legacy_tags() {
        assert_eq!(
            "planta".parse::<DocumentCategory>().unwrap(),
            DocumentCategory::SitePlan
        );
        assert_eq!(
            "supporting_document".parse::<DocumentCategory>().unwrap(),
            DocumentCategory::SupportingDocument
        );
        assert!("photo".parse::<DocumentCategory>().is_err());
    }

    #[test]
    fn test_only_uploaded_and_analyzed_are_stored() {
        assert!(!DocumentStatus::Pending.is_stored());
        assert!(DocumentStatus::Uploaded.is_stored());
        assert!(DocumentStatus::Analyzed.is_stored());
        assert!(!DocumentStatus::Error.is_stored());
    }
}
