// Season aggregates consumed by the grading engine.
//
// These are built once per run by the caller and never mutated while grading.
// Every derived ratio is 0.0 when its denominator is zero.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `num / den`, or 0.0 when the denominator is zero or the result is not finite.
pub(crate) fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let r = num / den;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Player aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HittingTotals {
    pub at_bats: u32,
    pub hits: u32,
    pub home_runs: u32,
    pub rbi: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub hits_robbed: u32,
    pub double_plays: u32,
    pub total_bases: u32,
}

impl HittingTotals {
    pub fn avg(&self) -> f64 {
        ratio(self.hits as f64, self.at_bats as f64)
    }

    /// On-base percentage. The league does not track HBP or sacrifices.
    pub fn obp(&self) -> f64 {
        ratio(
            (self.hits + self.walks) as f64,
            (self.at_bats + self.walks) as f64,
        )
    }

    pub fn slg(&self) -> f64 {
        ratio(self.total_bases as f64, self.at_bats as f64)
    }

    pub fn ops(&self) -> f64 {
        self.obp() + self.slg()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchingTotals {
    pub innings: f64,
    pub batters_faced: u32,
    pub hits_allowed: u32,
    pub home_runs_allowed: u32,
    pub runs_allowed: u32,
    pub walks_allowed: u32,
    pub strikeouts: u32,
    pub wins: u32,
    pub losses: u32,
    pub saves: u32,
}

impl PitchingTotals {
    /// Runs allowed per `innings_per_game` innings.
    pub fn era(&self, innings_per_game: f64) -> f64 {
        ratio(self.runs_allowed as f64 * innings_per_game, self.innings)
    }

    pub fn whip(&self) -> f64 {
        ratio(
            (self.hits_allowed + self.walks_allowed) as f64,
            self.innings,
        )
    }

    /// Opponents' batting average: hits allowed over at-bats against
    /// (batters faced minus walks).
    pub fn opponent_avg(&self) -> f64 {
        let at_bats_against = self.batters_faced.saturating_sub(self.walks_allowed);
        ratio(self.hits_allowed as f64, at_bats_against as f64)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldingTotals {
    pub nice_plays: u32,
    pub errors: u32,
    pub stolen_bases: u32,
    pub games: u32,
}

impl FieldingTotals {
    /// `(nice plays - errors) / games`.
    pub fn net_defense(&self) -> f64 {
        ratio(
            self.nice_plays as f64 - self.errors as f64,
            self.games as f64,
        )
    }
}

/// One player's full season line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonAggregate {
    pub name: String,
    /// Current team; `None` for free agents.
    pub team: Option<String>,
    pub hitting: HittingTotals,
    pub pitching: PitchingTotals,
    pub fielding: FieldingTotals,
}

impl PlayerSeasonAggregate {
    pub fn new(name: impl Into<String>, team: Option<&str>) -> Self {
        PlayerSeasonAggregate {
            name: name.into(),
            team: team.map(str::to_string),
            ..Default::default()
        }
    }

    /// Team name, treating blank strings as unassigned.
    pub fn team_name(&self) -> Option<&str> {
        self.team.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Team aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub wins: u32,
    pub losses: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonAggregate {
    pub name: String,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub runs_scored: u32,
    pub runs_allowed: u32,
    /// Record against each opponent, keyed by opponent team name.
    #[serde(default)]
    pub head_to_head: HashMap<String, HeadToHead>,
}

impl TeamSeasonAggregate {
    pub fn win_pct(&self) -> f64 {
        ratio(self.wins as f64, (self.wins + self.losses) as f64)
    }

    pub fn run_differential(&self) -> i64 {
        self.runs_scored as i64 - self.runs_allowed as i64
    }
}

// ---------------------------------------------------------------------------
// Lineup usage
// ---------------------------------------------------------------------------

/// Lineup-derived usage for one player on one team.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineupRecord {
    /// Games the player appeared in the lineup for this team.
    pub games: u32,
    /// Mean batting-order slot (1 = leadoff).
    pub average_slot: f64,
}

/// Read-only index of precise lineup usage, keyed by player then team.
#[derive(Debug, Clone, Default)]
pub struct LineupUsage {
    records: HashMap<String, HashMap<String, LineupRecord>>,
}

impl LineupUsage {
    pub fn insert(&mut self, player: &str, team: &str, record: LineupRecord) {
        self.records
            .entry(player.to_string())
            .or_default()
            .insert(team.to_string(), record);
    }

    pub fn get(&self, player: &str, team: &str) -> Option<&LineupRecord> {
        self.records.get(player)?.get(team)
    }

    pub fn len(&self) -> usize {
        self.records.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
