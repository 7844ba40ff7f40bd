// src/compliance.rs - Acceptance checks of crack metrics against limits

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CrackError, Result};
use crate::metrics::Metrics;

/// Caller-supplied acceptance limits. `None` disables the check.
///
/// Width and length limits use the same physical units as [`Metrics`];
/// the area-ratio limit is a fraction of the image area in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceLimits {
    #[serde(default)]
    pub max_width_limit: Option<f64>,
    #[serde(default)]
    pub avg_width_limit: Option<f64>,
    #[serde(default)]
    pub area_ratio_limit: Option<f64>,
    #[serde(default)]
    pub length_limit: Option<f64>,
}

impl ComplianceLimits {
    /// No limits configured
    pub fn none() -> Self {
        Self::default()
    }

    /// Reject negative or non-finite limits
    pub fn validate(&self) -> Result<()> {
        for criterion in Criterion::ALL {
            if let Some(limit) = self.limit_for(criterion) {
                if !limit.is_finite() || limit < 0.0 {
                    return Err(CrackError::invalid_input(format!(
                        "{} limit must be a non-negative number, got {}",
                        criterion, limit
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn limit_for(&self, criterion: Criterion) -> Option<f64> {
        match criterion {
            Criterion::MaxWidth => self.max_width_limit,
            Criterion::AvgWidth => self.avg_width_limit,
            Criterion::AreaRatio => self.area_ratio_limit,
            Criterion::Length => self.length_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    MaxWidth,
    AvgWidth,
    AreaRatio,
    Length,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::MaxWidth,
        Criterion::AvgWidth,
        Criterion::AreaRatio,
        Criterion::Length,
    ];
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Criterion::MaxWidth => "max_width",
            Criterion::AvgWidth => "avg_width",
            Criterion::AreaRatio => "area_ratio",
            Criterion::Length => "length",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionStatus {
    Pass,
    Fail,
    /// No limit configured for this criterion
    NotEvaluated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionResult {
    pub criterion: Criterion,
    pub measured: f64,
    pub limit: Option<f64>,
    pub status: CriterionStatus,
}

impl CriterionResult {
    pub fn passed(&self) -> bool {
        self.status == CriterionStatus::Pass
    }

    pub fn is_evaluated(&self) -> bool {
        self.status != CriterionStatus::NotEvaluated
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    pub criteria: Vec<CriterionResult>,
    /// AND over evaluated criteria; true when nothing was evaluated
    pub overall_pass: bool,
    pub area_ratio: f64,
}

impl ComplianceReport {
    pub fn get(&self, criterion: Criterion) -> Option<&CriterionResult> {
        self.criteria.iter().find(|r| r.criterion == criterion)
    }

    pub fn evaluated_count(&self) -> usize {
        self.criteria.iter().filter(|r| r.is_evaluated()).count()
    }

    /// "Pass", "Fail", or "Not evaluated" when no limit was configured
    pub fn verdict(&self) -> &'static str {
        if self.evaluated_count() == 0 {
            "Not evaluated"
        } else if self.overall_pass {
            "Pass"
        } else {
            "Fail"
        }
    }
}

/// Crack area as a fraction of the image area
pub fn area_ratio(metrics: &Metrics, image_area_px: usize) -> f64 {
    if image_area_px == 0 {
        0.0
    } else {
        metrics.foreground_pixels as f64 / image_area_px as f64
    }
}

/// Compare metrics against limits; criteria without a limit are reported
/// as not evaluated and left out of the overall verdict.
pub fn check_compliance(
    metrics: &Metrics,
    limits: &ComplianceLimits,
    image_area_px: usize,
) -> ComplianceReport {
    let ratio = area_ratio(metrics, image_area_px);

    let criteria: Vec<CriterionResult> = Criterion::ALL
        .iter()
        .map(|&criterion| {
            let measured = match criterion {
                Criterion::MaxWidth => metrics.max_width,
                Criterion::AvgWidth => metrics.avg_width,
                Criterion::AreaRatio => ratio,
                Criterion::Length => metrics.length,
            };
            let limit = limits.limit_for(criterion);
            let status = match limit {
                None => CriterionStatus::NotEvaluated,
                Some(l) if measured <= l => CriterionStatus::Pass,
                Some(_) => CriterionStatus::Fail,
            };
            CriterionResult {
                criterion,
                measured,
                limit,
                status,
            }
        })
        .collect();

    let overall_pass = criteria
        .iter()
        .filter(|r| r.is_evaluated())
        .all(|r| r.passed());

    ComplianceReport {
        criteria,
        overall_pass,
        area_ratio: ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn sample_metrics() -> Metrics {
        Metrics {
            area: 40.0,
            length: 20.0,
            avg_width: 1.5,
            max_width: 3.0,
            endpoint_count: 2,
            branch_point_count: 0,
            regular_point_count: 18,
            estimated_branch_count: 1,
            area_per_length_width: 2.0,
            foreground_pixels: 40,
            skeleton_pixels: 20,
            pixel_scale: 1.0,
        }
    }

    fn all_limits(max_width: f64, avg_width: f64, area_ratio: f64, length: f64) -> ComplianceLimits {
        ComplianceLimits {
            max_width_limit: Some(max_width),
            avg_width_limit: Some(avg_width),
            area_ratio_limit: Some(area_ratio),
            length_limit: Some(length),
        }
    }

    #[test]
    fn test_all_criteria_pass() {
        let report = check_compliance(&sample_metrics(), &all_limits(3.0, 2.0, 0.5, 25.0), 100);
        assert!(report.overall_pass);
        assert_eq!(report.evaluated_count(), 4);
        assert_approx_eq!(report.area_ratio, 0.4);
        assert_eq!(report.verdict(), "Pass");
    }

    #[test]
    fn test_single_failure_fails_overall() {
        let report = check_compliance(&sample_metrics(), &all_limits(2.5, 2.0, 0.5, 25.0), 100);
        assert!(!report.overall_pass);
        assert_eq!(report.get(Criterion::MaxWidth).unwrap().status, CriterionStatus::Fail);
        assert_eq!(report.get(Criterion::Length).unwrap().status, CriterionStatus::Pass);
        assert_eq!(report.verdict(), "Fail");
    }

    #[test]
    fn test_unset_limits_are_not_evaluated() {
        let limits = ComplianceLimits {
            length_limit: Some(10.0),
            ..ComplianceLimits::none()
        };
        let report = check_compliance(&sample_metrics(), &limits, 100);
        assert_eq!(report.evaluated_count(), 1);
        assert_eq!(
            report.get(Criterion::MaxWidth).unwrap().status,
            CriterionStatus::NotEvaluated
        );
        assert_eq!(report.get(Criterion::MaxWidth).unwrap().limit, None);
        assert!(!report.overall_pass);
    }

    #[test]
    fn test_no_limits_is_distinguishable_from_pass() {
        let report = check_compliance(&sample_metrics(), &ComplianceLimits::none(), 100);
        assert!(report.overall_pass);
        assert_eq!(report.evaluated_count(), 0);
        assert_eq!(report.verdict(), "Not evaluated");
    }

    #[test]
    fn test_raising_a_limit_flips_only_that_criterion() {
        let metrics = sample_metrics();
        for criterion in Criterion::ALL {
            let mut low = all_limits(10.0, 10.0, 1.0, 100.0);
            let mut high = low.clone();
            let (below, above) = match criterion {
                Criterion::MaxWidth => (2.9, 3.1),
                Criterion::AvgWidth => (1.4, 1.6),
                Criterion::AreaRatio => (0.3, 0.5),
                Criterion::Length => (19.0, 21.0),
            };
            match criterion {
                Criterion::MaxWidth => {
                    low.max_width_limit = Some(below);
                    high.max_width_limit = Some(above);
                }
                Criterion::AvgWidth => {
                    low.avg_width_limit = Some(below);
                    high.avg_width_limit = Some(above);
                }
                Criterion::AreaRatio => {
                    low.area_ratio_limit = Some(below);
                    high.area_ratio_limit = Some(above);
                }
                Criterion::Length => {
                    low.length_limit = Some(below);
                    high.length_limit = Some(above);
                }
            }

            let failing = check_compliance(&metrics, &low, 100);
            let passing = check_compliance(&metrics, &high, 100);
            assert_eq!(failing.get(criterion).unwrap().status, CriterionStatus::Fail);
            assert_eq!(passing.get(criterion).unwrap().status, CriterionStatus::Pass);
            for other in Criterion::ALL.iter().filter(|&&c| c != criterion) {
                assert_eq!(
                    failing.get(*other).unwrap().status,
                    passing.get(*other).unwrap().status
                );
            }
            assert!(!failing.overall_pass);
            assert!(passing.overall_pass);
        }
    }

    #[test]
    fn test_limit_equal_to_measurement_passes() {
        let report = check_compliance(&sample_metrics(), &all_limits(3.0, 1.5, 0.4, 20.0), 100);
        assert!(report.overall_pass);
    }

    #[test]
    fn test_validate_limits() {
        assert!(all_limits(1.0, 1.0, 0.5, 10.0).validate().is_ok());
        assert!(ComplianceLimits::none().validate().is_ok());
        let negative = ComplianceLimits {
            avg_width_limit: Some(-1.0),
            ..ComplianceLimits::none()
        };
        assert!(matches!(negative.validate(), Err(CrackError::InvalidInput(_))));
        let nan = ComplianceLimits {
            length_limit: Some(f64::NAN),
            ..ComplianceLimits::none()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_zero_image_area_gives_zero_ratio() {
        assert_eq!(area_ratio(&sample_metrics(), 0), 0.0);
    }
}
