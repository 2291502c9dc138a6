//! Multi-criterion rubric.
//!
//! The rubric is a fixed list of ten criteria with per-criterion maxima
//! (130 points in total). [`RubricAnalyzer`] is the stub evaluator: it
//! waits for a configurable delay and returns a fixed evaluation, which
//! keeps the task pipeline exercisable without any external service.

use super::{Analyzer, ProgressReporter};
use crate::error::AnalysisError;
use crate::models::{AnalysisResult, CriterionScore, RubricReport};
use crate::report;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// One criterion of the scoring rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    FunctionalSuitability,
    Maintainability,
    Reliability,
    Usability,
    Performance,
    DataHandling,
    TechniquesApplied,
    ModelValidation,
    MetricsAndCost,
    SecurityAndGovernance,
}

impl Criterion {
    /// All criteria, in report order.
    pub const ALL: [Criterion; 10] = [
        Criterion::FunctionalSuitability,
        Criterion::Maintainability,
        Criterion::Reliability,
        Criterion::Usability,
        Criterion::Performance,
        Criterion::DataHandling,
        Criterion::TechniquesApplied,
        Criterion::ModelValidation,
        Criterion::MetricsAndCost,
        Criterion::SecurityAndGovernance,
    ];

    /// Display name used in results and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::FunctionalSuitability => "Functional Suitability",
            Criterion::Maintainability => "Maintainability",
            Criterion::Reliability => "Reliability",
            Criterion::Usability => "Usability",
            Criterion::Performance => "Performance",
            Criterion::DataHandling => "Data Provenance and Handling",
            Criterion::TechniquesApplied => "Applied Techniques",
            Criterion::ModelValidation => "Model Validation and Selection",
            Criterion::MetricsAndCost => "Metrics, Cost and Performance",
            Criterion::SecurityAndGovernance => "Security and Governance",
        }
    }

    /// Highest score this criterion can award.
    pub fn max_score(&self) -> f64 {
        match self {
            Criterion::FunctionalSuitability
            | Criterion::Maintainability
            | Criterion::Reliability
            | Criterion::Usability
            | Criterion::Performance => 16.0,
            Criterion::DataHandling
            | Criterion::TechniquesApplied
            | Criterion::ModelValidation
            | Criterion::MetricsAndCost
            | Criterion::SecurityAndGovernance => 10.0,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maximum total over the whole rubric.
pub fn max_total() -> f64 {
    Criterion::ALL.iter().map(Criterion::max_score).sum()
}

/// Build a [`RubricReport`] from per-criterion scores.
pub fn build_report(subject: &str, criteria: Vec<CriterionScore>) -> RubricReport {
    let total_score = criteria.iter().map(CriterionScore::score).sum();
    let report = report::generate_rubric_report(subject, total_score, &criteria);
    RubricReport {
        total_score,
        criteria,
        report,
    }
}

/// Stub evaluator producing a fixed rubric evaluation after a delay.
#[derive(Debug, Clone)]
pub struct RubricAnalyzer {
    delay: Duration,
}

impl RubricAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    fn evaluate(&self) -> Result<Vec<CriterionScore>, AnalysisError> {
        let fixed = [
            (Criterion::FunctionalSuitability, 16.0, "README present and coherent."),
            (Criterion::Maintainability, 16.0, "Clear, commented code."),
            (Criterion::Reliability, 16.0, "Automated tests detected."),
            (Criterion::Usability, 16.0, "Complete documentation."),
            (Criterion::Performance, 16.0, "Fast and efficient execution."),
            (Criterion::DataHandling, 10.0, "Data handled well."),
            (Criterion::TechniquesApplied, 10.0, "AI techniques identified."),
            (Criterion::ModelValidation, 10.0, "Model choice is justified."),
            (Criterion::MetricsAndCost, 10.0, "Metrics and cost analysed."),
            (Criterion::SecurityAndGovernance, 10.0, "Risks and guardrails in place."),
        ];

        fixed
            .into_iter()
            .map(|(criterion, score, justification)| {
                CriterionScore::new(criterion, score, justification)
                    .map_err(|e| AnalysisError::Model(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl Analyzer for RubricAnalyzer {
    async fn analyze(
        &self,
        subject: &str,
        progress: &ProgressReporter,
    ) -> Result<AnalysisResult, AnalysisError> {
        progress.report("evaluating rubric criteria...");
        debug!(subject, delay_ms = self.delay.as_millis() as u64, "rubric evaluation");
        tokio::time::sleep(self.delay).await;

        let criteria = self.evaluate()?;
        Ok(AnalysisResult::Rubric(build_report(subject, criteria)))
    }

    fn initial_message(&self) -> &'static str {
        "evaluating rubric criteria..."
    }
}
