// Rule-based performance modifiers.

pub mod auto_flag;
pub mod draft_expectation;

use serde::Serialize;

/// Signed point delta produced by a modifier rule. Zero points with an empty
/// trace means the rule did not fire.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModifierOutcome {
    pub points: f64,
    pub trace: String,
}

impl ModifierOutcome {
    pub fn none() -> Self {
        ModifierOutcome::default()
    }

    pub fn fired(&self) -> bool {
        !self.trace.is_empty()
    }
}

/// Render points with an explicit sign ("+2", "-4", "+1.5").
pub(crate) fn signed(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{:+}", points as i64)
    } else {
        format!("{points:+.1}")
    }
}
