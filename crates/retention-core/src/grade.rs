// Grade combination: five factor totals weighted into one bounded grade.

use serde::Serialize;

use crate::config::GradeConfig;
use crate::factors::{PerformanceBreakdown, PlayTimeBreakdown, TeamSuccessBreakdown};

/// The five factor totals fed to the combiner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FactorTotals {
    pub team_success: f64,
    pub play_time: f64,
    pub performance: f64,
    pub chemistry: f64,
    pub team_direction: f64,
}

impl FactorTotals {
    fn clamped(&self, config: &GradeConfig) -> Self {
        FactorTotals {
            team_success: config.clamp_factor(self.team_success),
            play_time: config.clamp_factor(self.play_time),
            performance: config.clamp_factor(self.performance),
            chemistry: config.clamp_factor(self.chemistry),
            team_direction: config.clamp_factor(self.team_direction),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinedGrade {
    /// Inputs after clamping to `[0, factor_max]`.
    pub factors: FactorTotals,
    /// Weighted sum of the clamped factors, before scaling.
    pub composite: f64,
    pub grade: i32,
}

/// Weighted sum of the clamped factors, scaled, rounded and clamped to the
/// output range.
pub fn combine(totals: &FactorTotals, config: &GradeConfig) -> CombinedGrade {
    let factors = totals.clamped(config);
    let w = &config.weights;
    let composite = factors.team_success * w.team_success
        + factors.play_time * w.play_time
        + factors.performance * w.performance
        + factors.chemistry * w.chemistry
        + factors.team_direction * w.team_direction;

    let scaled = (composite * config.scale + config.offset).round();
    let grade = scaled.clamp(config.output_min, config.output_max) as i32;

    CombinedGrade {
        factors,
        composite,
        grade,
    }
}

/// Everything that went into one player's grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeBreakdown {
    pub player: String,
    pub team: Option<String>,
    pub team_success: TeamSuccessBreakdown,
    pub play_time: PlayTimeBreakdown,
    pub performance: PerformanceBreakdown,
    /// Team success + play time + performance, as computed (unclamped team
    /// success, no manual adjustment).
    pub automatic_total: f64,
    pub chemistry: f64,
    pub team_direction: f64,
    pub team_success_adjustment: f64,
    pub factors: FactorTotals,
    pub composite: f64,
    pub grade: i32,
    pub trace: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
