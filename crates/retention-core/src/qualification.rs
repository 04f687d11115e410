// Qualification cutoffs scaled to the season's actual length.

use serde::Serialize;

use crate::config::QualificationConfig;
use crate::model::{PlayerSeasonAggregate, TeamSeasonAggregate};

/// Mean games played per team, or `nominal_games` when no team has played.
pub fn average_team_games<'a, I>(teams: I, nominal_games: f64) -> f64
where
    I: IntoIterator<Item = &'a TeamSeasonAggregate>,
{
    let (count, total) = teams
        .into_iter()
        .fold((0usize, 0u64), |(n, sum), t| (n + 1, sum + t.games_played as u64));
    if count == 0 || total == 0 {
        return nominal_games;
    }
    total as f64 / count as f64
}

/// Minimum samples a player needs before their rate stats are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualificationCutoffs {
    pub avg_team_games: f64,
    pub min_at_bats: f64,
    pub min_innings: f64,
    pub min_fielding_games: f64,
}

impl QualificationCutoffs {
    pub fn from_average_games(avg_team_games: f64, config: &QualificationConfig) -> Self {
        QualificationCutoffs {
            avg_team_games,
            min_at_bats: avg_team_games * config.at_bats_per_team_game,
            min_innings: avg_team_games * config.innings_per_team_game,
            min_fielding_games: avg_team_games * config.fielding_games_fraction,
        }
    }

    pub fn qualifies_hitting(&self, player: &PlayerSeasonAggregate) -> bool {
        player.hitting.at_bats as f64 >= self.min_at_bats
    }

    pub fn qualifies_pitching(&self, player: &PlayerSeasonAggregate) -> bool {
        player.pitching.innings >= self.min_innings
    }

    pub fn qualifies_fielding(&self, player: &PlayerSeasonAggregate) -> bool {
        player.fielding.games as f64 >= self.min_fielding_games
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
