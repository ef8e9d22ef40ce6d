//! Remediation recommendations
//!
//! Recommendations are emitted in priority order: pending operational work
//! first, then data integrity failures, then prediction coverage gaps. When
//! nothing needs attention a single all-clear item is returned.

use std::collections::HashSet;
use std::fmt;

use crate::predictions::PredictionStatus;
use crate::quality::QualityReport;
use crate::stats::SeasonStats;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recommendation {
    MonitorUpcoming { count: u64 },
    FinalizePreEvent { count: u64 },
    Fix { message: String },
    GeneratePredictions { predictor: String },
    CompletePredictions { predictor: String, missing: u64 },
    AllClear,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::MonitorUpcoming { count } => {
                write!(f, "Monitor {} upcoming events for automatic update", count)
            }
            Recommendation::FinalizePreEvent { count } => {
                write!(f, "Finalize pre-event data for {} events", count)
            }
            Recommendation::Fix { message } => write!(f, "Fix: {}", message),
            Recommendation::GeneratePredictions { predictor } => {
                write!(f, "Generate predictions for model {}", predictor)
            }
            Recommendation::CompletePredictions { predictor, missing } => {
                write!(f, "Complete {} missing predictions for {}", missing, predictor)
            }
            Recommendation::AllClear => f.write_str("All data looks good"),
        }
    }
}

pub fn generate_recommendations(
    stats: &SeasonStats,
    quality: &QualityReport,
    predictions: &PredictionStatus,
    expected_predictors: &[String],
) -> Vec<Recommendation> {
    let mut items = Vec::new();

    if stats.not_started > 0 {
        items.push(Recommendation::MonitorUpcoming {
            count: stats.not_started,
        });
    }

    if stats.pre_event_gap > 0 {
        items.push(Recommendation::FinalizePreEvent {
            count: stats.pre_event_gap,
        });
    }

    for (_, outcome) in quality.failures() {
        items.push(Recommendation::Fix {
            message: outcome.message.clone(),
        });
    }

    for predictor in expected_predictors {
        if predictions.count(predictor).is_none() {
            items.push(Recommendation::GeneratePredictions {
                predictor: predictor.clone(),
            });
        }
    }

    for predictor in expected_predictors {
        if let Some(count) = predictions.count(predictor) {
            if count < stats.pre_event_finalized {
                items.push(Recommendation::CompletePredictions {
                    predictor: predictor.clone(),
                    missing: stats.pre_event_finalized - count,
                });
            }
        }
    }

    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.clone()));

    if items.is_empty() {
        items.push(Recommendation::AllClear);
    }
    items
}
