//! Run one analysis workflow from the terminal.
//!
//! # Usage
//!
//! ```bash
//! up-cli analyze --protocol 2024-00150 --address "Rua das Flores, 123" \
//!     --document site-plan --document measurement-sheet
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_ANALYSIS_LATENCY_MS` - Scripted analysis latency
//! - `ADMIN_SUBMISSION_POLICY` - `min:<n>` or `all-categories`

use std::sync::Arc;

use urbanplan_admin::navigation::{Screen, UnauthorizedAccess};
use urbanplan_admin::services::{MemoryDocumentStore, ScriptedAnalysisService};
use urbanplan_admin::workflow::{AnalysisWorkflow, WorkflowSession};
use urbanplan_core::{DocumentCategory, FindingSeverity};

use super::{CliError, authority};

fn parse_categories(raw: &[String]) -> Result<Vec<DocumentCategory>, CliError> {
    raw.iter()
        .map(|c| c.parse().map_err(CliError::InvalidArgument))
        .collect()
}

/// Drive a workflow through intake, submission and conclusion.
///
/// The signed-in identity must be allowed on the new-analysis screen.
///
/// # Errors
///
/// Returns `CliError::Workflow` if a guard rejects the submission or the
/// analysis fails, `CliError::Denied` for identities without access.
pub async fn run(
    protocol: &str,
    address: &str,
    documents: &[String],
    fail: Option<String>,
) -> Result<WorkflowSession, CliError> {
    let categories = parse_categories(documents)?;
    let (config, authority) = authority()?;
    let identity = authority.restore_session().await.ok_or(CliError::NotSignedIn)?;
    if !authority.can_access(Screen::NewAnalysis, Some(&identity)) {
        return Err(UnauthorizedAccess {
            screen: Screen::NewAnalysis,
            role: Some(identity.role()),
        }
        .into());
    }

    let analysis = match fail {
        Some(reason) => ScriptedAnalysisService::failing(config.analysis_latency, reason),
        None => ScriptedAnalysisService::new(config.analysis_latency),
    };
    let workflow = AnalysisWorkflow::new(
        Arc::new(analysis),
        Arc::new(MemoryDocumentStore::new()),
        config.submission_policy,
    );

    workflow.set_project(protocol, address).await?;
    for category in categories {
        let doc = workflow.add_document(category).await?;
        tracing::info!("Added {} ({})", doc.name, category);
    }

    let generation = workflow.submit().await?;
    tracing::info!(generation, "Submitted {} for analysis...", protocol);

    let session = workflow.wait_until_settled().await?;
    if let Some(result) = session.result() {
        tracing::info!("Compliance score: {}%", result.score.value());
        for finding in &result.findings {
            let marker = match finding.severity {
                FindingSeverity::Warning => "!",
                FindingSeverity::Info => "i",
                FindingSeverity::Success => "+",
            };
            tracing::info!("  [{marker}] {}", finding.message);
        }
        for (key, value) in &result.measurements {
            tracing::info!("  {key}: {value}");
        }
    }

    Ok(workflow.finish().await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_categories() {
        let parsed =
            parse_categories(&["site-plan".to_string(), "planilha".to_string()]).unwrap();
        assert_eq!(
            parsed,
            vec![DocumentCategory::SitePlan, DocumentCategory::MeasurementSheet]
        );

        assert!(matches!(
            parse_categories(&["blueprint".to_string()]),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
