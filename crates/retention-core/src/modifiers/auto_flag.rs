// Auto-flagging: strong hitters on weak teams are flight risks.
//
// Two mutually exclusive tiers; the severe tier is checked first and at most
// one penalty applies. Only the offensive percentile gates this rule.

use super::{signed, ModifierOutcome};
use crate::config::AutoFlagConfig;

pub fn evaluate(
    offensive_percentile: Option<f64>,
    standing: Option<u32>,
    config: &AutoFlagConfig,
) -> ModifierOutcome {
    let (Some(pct), Some(standing)) = (offensive_percentile, standing) else {
        return ModifierOutcome::none();
    };

    let (tier, name) = if config.severe.matches(pct, standing) {
        (&config.severe, "tier 1")
    } else if config.moderate.matches(pct, standing) {
        (&config.moderate, "tier 2")
    } else {
        return ModifierOutcome::none();
    };

    let points = -tier.penalty;
    ModifierOutcome {
        points,
        trace: format!(
            "Auto-flag {name}: {pct:.1} pct on #{standing} team {}",
            signed(points)
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
