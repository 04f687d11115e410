// Play time: share of team games played plus quality of usage.
//
// Usage quality comes from precise lineup data when it exists. Without it, a
// per-game proxy (at-bats for hitters, innings for pitchers) stands in and
// the trace marks the score as estimated.

use serde::Serialize;
use std::collections::HashMap;

use super::pts;
use crate::config::PlayTimeConfig;
use crate::model::{ratio, LineupRecord, LineupUsage, PlayerSeasonAggregate, TeamSeasonAggregate};
use crate::tiers::TierTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayTimeBreakdown {
    pub games_with_team: u32,
    pub team_games: u32,
    pub games_share: f64,
    pub games_played: f64,
    pub usage_quality: f64,
    /// True when usage came from the statistical proxy.
    pub estimated_usage: bool,
    pub total: f64,
    pub trace: String,
}

impl PlayTimeBreakdown {
    fn zero(trace: impl Into<String>) -> Self {
        PlayTimeBreakdown {
            games_with_team: 0,
            team_games: 0,
            games_share: 0.0,
            games_played: 0.0,
            usage_quality: 0.0,
            estimated_usage: false,
            total: 0.0,
            trace: trace.into(),
        }
    }
}

struct Scored {
    points: f64,
    text: String,
}

fn score(table: &TierTable, value: f64, describe: String) -> Scored {
    match table.lookup(value) {
        Some(tier) => Scored {
            points: tier.points,
            text: format!("{describe} {} {}", tier.label, pts(tier.points)),
        },
        None => Scored {
            points: 0.0,
            text: format!("{describe} unranked 0"),
        },
    }
}

fn lineup_usage(record: &LineupRecord, table: &TierTable) -> Scored {
    let slot = record.average_slot;
    if record.games == 0 || !slot.is_finite() || slot <= 0.0 {
        return match table.floor() {
            Some(tier) => Scored {
                points: tier.points,
                text: format!("never in lineup {} {}", tier.label, pts(tier.points)),
            },
            None => Scored {
                points: 0.0,
                text: "never in lineup 0".into(),
            },
        };
    }
    score(table, slot, format!("slot {slot:.1}"))
}

fn estimated_usage(player: &PlayerSeasonAggregate, config: &PlayTimeConfig) -> Scored {
    let games = player.fielding.games as f64;
    let scored = if player.pitching.innings >= config.pitcher_min_innings {
        let ipg = ratio(player.pitching.innings, games);
        score(&config.pitcher_usage, ipg, format!("{ipg:.1} IP/G"))
    } else {
        let abpg = ratio(player.hitting.at_bats as f64, games);
        score(&config.hitter_usage, abpg, format!("{abpg:.1} AB/G"))
    };
    Scored {
        points: scored.points,
        text: format!("{} (estimated)", scored.text),
    }
}

pub fn play_time(
    player: &PlayerSeasonAggregate,
    teams: &HashMap<String, TeamSeasonAggregate>,
    lineups: &LineupUsage,
    config: &PlayTimeConfig,
    factor_max: f64,
) -> PlayTimeBreakdown {
    let Some(team_name) = player.team_name() else {
        return PlayTimeBreakdown::zero("PT: no team");
    };
    let Some(team) = teams.get(team_name) else {
        return PlayTimeBreakdown::zero(format!("PT: no record for {team_name}"));
    };
    if team.games_played == 0 {
        return PlayTimeBreakdown::zero(format!("PT: {team_name} has no games"));
    }

    let lineup = lineups.get(&player.name, team_name);
    let games_with_team = lineup.map_or(player.fielding.games, |l| l.games);
    let share = ratio(games_with_team as f64, team.games_played as f64);
    let games = score(
        &config.games_share,
        share,
        format!(
            "{games_with_team}/{} G ({:.0}%)",
            team.games_played,
            share * 100.0
        ),
    );

    let (usage, estimated_usage) = match lineup {
        Some(record) => (lineup_usage(record, &config.lineup_slot), false),
        None => (estimated_usage(player, config), true),
    };

    let total = (games.points + usage.points).clamp(0.0, factor_max);

    PlayTimeBreakdown {
        games_with_team,
        team_games: team.games_played,
        games_share: share,
        games_played: games.points,
        usage_quality: usage.points,
        estimated_usage,
        total,
        trace: format!("PT: {} + {} = {}", games.text, usage.text, pts(total)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
