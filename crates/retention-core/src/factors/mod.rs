// Automatic factor calculators: team success, play time, performance.

pub mod performance;
pub mod play_time;
pub mod team_success;

pub use performance::{performance, PerformanceBreakdown};
pub use play_time::{play_time, PlayTimeBreakdown};
pub use team_success::{team_success, TeamSuccessBreakdown};

/// Join trace fragments for display.
pub(crate) fn join_trace(parts: &[String]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Format a points value without trailing ".0" for whole numbers.
pub(crate) fn pts(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{}", points as i64)
    } else {
        format!("{points:.1}")
    }
}
