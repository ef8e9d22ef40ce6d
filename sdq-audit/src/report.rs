//! Assembled audit report and its renderings

use sdq_common::SeasonKey;
use serde::Serialize;
use std::fmt::Write;

use crate::coverage::CoverageReport;
use crate::predictions::PredictionStatus;
use crate::quality::QualityReport;
use crate::stats::SeasonStats;

/// Output format of a rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Everything one audit run found out about a season
#[derive(Debug, Clone, Serialize)]
pub struct SeasonReport {
    pub season: SeasonKey,
    pub stats: SeasonStats,
    pub coverage: CoverageReport,
    pub quality: QualityReport,
    pub predictions: PredictionStatus,
    pub recommendations: Vec<String>,
}

impl SeasonReport {
    /// True when every consistency check passed
    pub fn is_clean(&self) -> bool {
        self.quality.all_passed()
    }

    pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => serde_json::to_string_pretty(self),
        }
    }

    /// Sectioned console rendering
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Data validation for season {}", self.season);
        let _ = writeln!(out, "{}", "=".repeat(50));

        let _ = writeln!(out, "\nGENERAL STATISTICS");
        for (label, value) in self.stats.rows() {
            let _ = writeln!(out, "  {}: {}", label, value);
        }

        let _ = writeln!(out, "\nTEMPORAL COVERAGE");
        let _ = writeln!(out, "  First date: {}", display_date(self.coverage.first_date));
        let _ = writeln!(out, "  Last date: {}", display_date(self.coverage.last_date));
        let _ = writeln!(out, "  Days covered: {}", self.coverage.days_covered);

        let _ = writeln!(out, "\nDATA QUALITY");
        for (check, outcome) in self.quality.iter() {
            let marker = if outcome.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(out, "  [{}] {}: {}", marker, check.name(), outcome.message);
        }

        let _ = writeln!(out, "\nPREDICTIONS");
        if self.predictions.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for (predictor, count) in self.predictions.iter() {
            let _ = writeln!(out, "  {}: {} predictions", predictor, count);
        }

        let _ = writeln!(out, "\nRECOMMENDATIONS");
        for (i, rec) in self.recommendations.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, rec);
        }

        out
    }
}

fn display_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}
