//! Analysis service collaborator.
//!
//! The real AI analysis runs outside this process. The workflow only needs
//! the [`AnalysisService`] contract: hand over the submission, eventually
//! get an [`AnalysisResult`] or an [`AnalysisError`].
//!
//! [`ScriptedAnalysisService`] stands in for the real service. It waits a
//! configurable latency, then answers with the reference result (or a
//! scripted failure).

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use urbanplan_core::{AnalysisResult, ComplianceScore, Finding, FindingSeverity};

use crate::workflow::UploadedDocument;

/// Everything the analysis service receives for one submission.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub protocol: String,
    pub address: String,
    /// Stored documents only; pending or failed uploads are not sent.
    pub documents: Vec<UploadedDocument>,
}

/// The analysis service could not produce a result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("analysis failed: {reason}")]
pub struct AnalysisError {
    pub reason: String,
}

impl AnalysisError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Contract of the external analysis service.
pub trait AnalysisService: Send + Sync + 'static {
    /// Analyze one submission.
    ///
    /// The returned future may be dropped at any await point; the workflow
    /// aborts it on cancel or restart.
    fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send;
}

/// What the scripted service answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    /// The reference result (score 87, three findings, four measurements).
    Reference,
    /// Always fail with this reason.
    Fail(String),
}

/// In-process stand-in for the analysis service.
#[derive(Debug, Clone)]
pub struct ScriptedAnalysisService {
    latency: Duration,
    outcome: ScriptedOutcome,
}

impl ScriptedAnalysisService {
    /// Answer with the reference result after `latency`.
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self {
            latency,
            outcome: ScriptedOutcome::Reference,
        }
    }

    /// Fail with `reason` after `latency`.
    #[must_use]
    pub fn failing(latency: Duration, reason: impl Into<String>) -> Self {
        Self {
            latency,
            outcome: ScriptedOutcome::Fail(reason.into()),
        }
    }
}

impl AnalysisService for ScriptedAnalysisService {
    #[instrument(skip(self, request), fields(protocol = %request.protocol, documents = request.documents.len()))]
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        tokio::time::sleep(self.latency).await;

        match &self.outcome {
            ScriptedOutcome::Reference => {
                info!("Scripted analysis finished");
                Ok(reference_result())
            }
            ScriptedOutcome::Fail(reason) => {
                warn!(%reason, "Scripted analysis failed");
                Err(AnalysisError::new(reason.clone()))
            }
        }
    }
}

/// The fixed result the scripted service returns.
#[must_use]
pub fn reference_result() -> AnalysisResult {
    let measurements = BTreeMap::from([
        ("total_area".to_string(), "450.00 m²".to_string()),
        ("permitted_area".to_string(), "480.00 m²".to_string()),
        ("occupancy_rate".to_string(), "55%".to_string()),
        ("floor_area_ratio".to_string(), "1.8".to_string()),
    ]);

    AnalysisResult {
        score: ComplianceScore::saturating(87),
        findings: vec![
            Finding::new(
                FindingSeverity::Warning,
                "Recuo frontal abaixo do mínimo exigido (3m requerido, 2.5m encontrado)",
            ),
            Finding::new(
                FindingSeverity::Info,
                "Taxa de ocupação dentro do limite (60% permitido, 55% utilizado)",
            ),
            Finding::new(FindingSeverity::Success, "Altura máxima conforme Plano Diretor"),
        ],
        measurements,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            protocol: "2024-00145".to_string(),
            address: "Rua X, 1".to_string(),
            documents: Vec::new(),
        }
    }

    #[test]
    fn test_reference_result_shape() {
        let result = reference_result();
        assert_eq!(result.score.value(), 87);
        assert_eq!(result.findings.len(), 3);
        assert_eq!(result.count(FindingSeverity::Warning), 1);
        assert_eq!(result.measurements.len(), 4);
        assert_eq!(result.measurements["total_area"], "450.00 m²");
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_service_waits_latency() {
        let service = ScriptedAnalysisService::new(Duration::from_secs(3));
        let started = tokio::time::Instant::now();
        let result = service.analyze(request()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(result, reference_result());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_failure() {
        let service = ScriptedAnalysisService::failing(Duration::ZERO, "model unavailable");
        let err = service.analyze(request()).await.unwrap_err();
        assert_eq!(err.reason, "model unavailable");
    }
}
