// Team success: regular-season standing plus postseason finish.
//
// The total is not clamped here; a manual adjustment may still be added
// before the combiner clamps it.

use serde::Serialize;
use std::collections::HashMap;

use super::pts;
use crate::config::TeamSuccessConfig;
use crate::model::PlayerSeasonAggregate;
use crate::postseason::PostseasonFinish;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSuccessBreakdown {
    pub standing: Option<u32>,
    pub finish: PostseasonFinish,
    pub regular_season: f64,
    pub postseason: f64,
    pub total: f64,
    pub trace: String,
}

impl TeamSuccessBreakdown {
    fn zero(trace: impl Into<String>) -> Self {
        TeamSuccessBreakdown {
            standing: None,
            finish: PostseasonFinish::Missed,
            regular_season: 0.0,
            postseason: 0.0,
            total: 0.0,
            trace: trace.into(),
        }
    }
}

pub fn team_success(
    player: &PlayerSeasonAggregate,
    standings: &HashMap<String, u32>,
    postseason: &HashMap<String, PostseasonFinish>,
    config: &TeamSuccessConfig,
) -> TeamSuccessBreakdown {
    let Some(team) = player.team_name() else {
        return TeamSuccessBreakdown::zero("TS: no team");
    };
    let Some(&standing) = standings.get(team) else {
        return TeamSuccessBreakdown::zero(format!("TS: no standing for {team}"));
    };

    let finish = postseason
        .get(team)
        .copied()
        .unwrap_or(PostseasonFinish::Missed);
    let regular_season = config.standing_points(standing);
    let playoff_points = config.finish_points(finish);
    let total = regular_season + playoff_points;

    TeamSuccessBreakdown {
        standing: Some(standing),
        finish,
        regular_season,
        postseason: playoff_points,
        total,
        trace: format!(
            "TS: #{standing} ({}) + {finish} ({}) = {}",
            pts(regular_season),
            pts(playoff_points),
            pts(total)
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
