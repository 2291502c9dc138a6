//! Markdown report generation.
//!
//! This module renders analysis results as Markdown reports, both for
//! rubric evaluations and for single-score README verdicts.

use crate::analysis::rubric::max_total;
use crate::models::{AnalysisResult, CriterionScore, OverallScore};

/// Render the report for any result.
///
/// Rubric results carry the report they were produced with; single-score
/// results are rendered on demand.
pub fn render_result(subject: &str, result: &AnalysisResult) -> String {
    match result {
        AnalysisResult::Rubric(rubric) => rubric.report.clone(),
        AnalysisResult::Overall(overall) => generate_overall_report(subject, overall),
    }
}

/// Generate the Markdown report for a rubric evaluation.
pub fn generate_rubric_report(subject: &str, total_score: f64, criteria: &[CriterionScore]) -> String {
    let mut output = String::new();

    output.push_str("# Analysis Report\n\n");
    output.push_str(&format!("- **Project:** {}\n", subject));
    output.push_str(&format!(
        "- **Total Score:** {}/{}\n\n",
        format_score(total_score),
        format_score(max_total())
    ));

    output.push_str("## Criteria\n\n");
    if criteria.is_empty() {
        output.push_str("No criteria were evaluated.\n\n");
    }

    for criterion in criteria {
        output.push_str(&generate_criterion_block(criterion));
    }

    output.push_str(&generate_footer());
    output
}

/// Generate the Markdown report for a single-score README verdict.
pub fn generate_overall_report(subject: &str, overall: &OverallScore) -> String {
    let mut output = String::new();

    output.push_str("# Documentation Report\n\n");
    output.push_str(&format!("- **Project:** {}\n", subject));
    if overall.repo_url != subject {
        output.push_str(&format!("- **Reported Repository:** {}\n", overall.repo_url));
    }
    output.push_str(&format!(
        "- **Overall Score:** {}/10\n\n",
        format_score(overall.overall_score)
    ));

    output.push_str("## Summary\n\n");
    if overall.summary.trim().is_empty() {
        output.push_str("*No summary provided.*\n\n");
    } else {
        output.push_str(overall.summary.trim());
        output.push_str("\n\n");
    }

    output.push_str(&generate_footer());
    output
}

/// Generate the block for one criterion.
fn generate_criterion_block(criterion: &CriterionScore) -> String {
    let mut block = String::new();

    block.push_str(&format!("### {}\n\n", criterion.name()));
    block.push_str(&format!("**Score:** {}\n\n", format_score(criterion.score())));
    if !criterion.justification().is_empty() {
        block.push_str(&format!("**Justification:** {}\n\n", criterion.justification()));
    }

    block
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by RepoGrader*\n".to_string()
}

/// Whole numbers without a decimal point, everything else with one decimal.
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{:.1}", score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rubric::Criterion;

    fn overall() -> OverallScore {
        OverallScore {
            repo_url: "https://github.com/acme/widget".to_string(),
            overall_score: 7.5,
            summary: "clear docs".to_string(),
        }
    }

    #[test]
    fn test_generate_rubric_report() {
        let criteria = vec![
            CriterionScore::new(Criterion::Maintainability, 16.0, "Clear code.").unwrap(),
            CriterionScore::new(Criterion::SecurityAndGovernance, 7.5, "Some guardrails.").unwrap(),
        ];

        let markdown = generate_rubric_report("https://github.com/acme/widget", 23.5, &criteria);

        assert!(markdown.contains("# Analysis Report"));
        assert!(markdown.contains("https://github.com/acme/widget"));
        assert!(markdown.contains("**Total Score:** 23.5/130"));
        assert!(markdown.contains("### Maintainability"));
        assert!(markdown.contains("**Score:** 16\n"));
        assert!(markdown.contains("**Justification:** Some guardrails."));
    }

    #[test]
    fn test_generate_rubric_report_without_criteria() {
        let markdown = generate_rubric_report("x", 0.0, &[]);
        assert!(markdown.contains("No criteria were evaluated."));
        assert!(markdown.contains("0/130"));
    }

    #[test]
    fn test_generate_overall_report() {
        let markdown = generate_overall_report("https://github.com/acme/widget", &overall());

        assert!(markdown.contains("**Overall Score:** 7.5/10"));
        assert!(markdown.contains("clear docs"));
        assert!(!markdown.contains("Reported Repository"));
    }

    #[test]
    fn test_overall_report_flags_mismatched_repo() {
        let markdown = generate_overall_report("https://github.com/acme/other", &overall());
        assert!(markdown.contains("**Reported Repository:** https://github.com/acme/widget"));
    }

    #[test]
    fn test_render_result_uses_stored_rubric_report() {
        let result = AnalysisResult::Rubric(crate::models::RubricReport {
            total_score: 1.0,
            criteria: Vec::new(),
            report: "stored".to_string(),
        });
        assert_eq!(render_result("x", &result), "stored");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(130.0), "130");
        assert_eq!(format_score(7.34), "7.3");
        assert_eq!(format_score(0.5), "0.5");
    }
}
