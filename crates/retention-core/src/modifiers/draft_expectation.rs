// Draft expectation: compare acquisition cost against offensive percentile.
//
// High picks read a good season as a good situation (reward) and a bad one
// as a bad situation (penalty). Mid and late picks read it the other way
// round: over-performing makes them feel undervalued (penalty), while
// under-performing keeps them content (reward). The band framing carries
// the sign.

use super::{signed, ModifierOutcome};
use crate::config::{DraftExpectationConfig, ExpectationFraming};

/// Parse a hand-entered acquisition cost (draft round). Only positive whole
/// numbers are accepted; anything else means "no cost recorded".
pub fn parse_acquisition_cost(raw: &str) -> Option<u32> {
    let text = raw.trim();
    if let Ok(round) = text.parse::<u32>() {
        return (round > 0).then_some(round);
    }
    let value = text.parse::<f64>().ok()?;
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

pub fn evaluate(
    offensive_percentile: Option<f64>,
    acquisition_cost: Option<u32>,
    config: &DraftExpectationConfig,
) -> ModifierOutcome {
    let (Some(pct), Some(round)) = (offensive_percentile, acquisition_cost) else {
        return ModifierOutcome::none();
    };
    if round == 0 {
        return ModifierOutcome::none();
    }
    let Some(band) = config.band_for(round) else {
        return ModifierOutcome::none();
    };

    let over_sign = band.framing.over_sign();
    let (points, reading) = if pct >= band.over_percentile {
        let reading = match band.framing {
            ExpectationFraming::Situation => "good situation",
            ExpectationFraming::SelfWorth => "undervalued",
        };
        (over_sign * band.over_magnitude, reading)
    } else if pct < band.under_percentile {
        let reading = match band.framing {
            ExpectationFraming::Situation => "bad situation",
            ExpectationFraming::SelfWorth => "content",
        };
        (-over_sign * band.under_magnitude, reading)
    } else {
        return ModifierOutcome::none();
    };

    ModifierOutcome {
        points,
        trace: format!(
            "Draft R{round} ({} band): {pct:.1} pct, {reading} {}",
            band.label,
            signed(points)
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
