// League stat pools: sorted values from qualified players, one per category.

use serde::Serialize;
use tracing::debug;

use crate::config::LeagueRules;
use crate::model::PlayerSeasonAggregate;
use crate::percentile::{inverted_percentile, percentile};
use crate::qualification::QualificationCutoffs;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatCategory {
    Avg,
    Obp,
    Slg,
    Ops,
    HomeRuns,
    Rbi,
    Era,
    Whip,
    OpponentAvg,
    NetDefense,
}

impl StatCategory {
    pub const ALL: [StatCategory; 10] = [
        StatCategory::Avg,
        StatCategory::Obp,
        StatCategory::Slg,
        StatCategory::Ops,
        StatCategory::HomeRuns,
        StatCategory::Rbi,
        StatCategory::Era,
        StatCategory::Whip,
        StatCategory::OpponentAvg,
        StatCategory::NetDefense,
    ];

    /// Categories averaged into the offensive percentile.
    pub const OFFENSE: [StatCategory; 6] = [
        StatCategory::Avg,
        StatCategory::Obp,
        StatCategory::Slg,
        StatCategory::Ops,
        StatCategory::HomeRuns,
        StatCategory::Rbi,
    ];

    /// Categories averaged into the pitching percentile.
    pub const PITCHING: [StatCategory; 3] = [
        StatCategory::Era,
        StatCategory::Whip,
        StatCategory::OpponentAvg,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StatCategory::Avg => "AVG",
            StatCategory::Obp => "OBP",
            StatCategory::Slg => "SLG",
            StatCategory::Ops => "OPS",
            StatCategory::HomeRuns => "HR",
            StatCategory::Rbi => "RBI",
            StatCategory::Era => "ERA",
            StatCategory::Whip => "WHIP",
            StatCategory::OpponentAvg => "OPP AVG",
            StatCategory::NetDefense => "NET DEF",
        }
    }

    /// True for pitching rates, where a smaller number is better.
    pub fn lower_is_better(&self) -> bool {
        matches!(
            self,
            StatCategory::Era | StatCategory::Whip | StatCategory::OpponentAvg
        )
    }

    fn index(&self) -> usize {
        *self as usize
    }

    /// The player's value in this category.
    pub fn value_of(&self, player: &PlayerSeasonAggregate, innings_per_game: f64) -> f64 {
        let h = &player.hitting;
        let p = &player.pitching;
        match self {
            StatCategory::Avg => h.avg(),
            StatCategory::Obp => h.obp(),
            StatCategory::Slg => h.slg(),
            StatCategory::Ops => h.ops(),
            StatCategory::HomeRuns => h.home_runs as f64,
            StatCategory::Rbi => h.rbi as f64,
            StatCategory::Era => p.era(innings_per_game),
            StatCategory::Whip => p.whip(),
            StatCategory::OpponentAvg => p.opponent_avg(),
            StatCategory::NetDefense => player.fielding.net_defense(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// Ascending value arrays per category, built once per run.
#[derive(Debug, Clone)]
pub struct LeagueStatPool {
    pools: [Vec<f64>; 10],
    innings_per_game: f64,
}

impl LeagueStatPool {
    /// Collect qualified values for every category and sort each pool.
    ///
    /// Free agents are skipped entirely when the league excludes players
    /// without a team.
    pub fn build(
        players: &[PlayerSeasonAggregate],
        cutoffs: &QualificationCutoffs,
        rules: &LeagueRules,
    ) -> Self {
        let mut pools: [Vec<f64>; 10] = Default::default();
        let ipg = rules.innings_per_game;

        let eligible = players
            .iter()
            .filter(|p| !rules.exclude_players_without_team || p.team_name().is_some());

        for player in eligible {
            let mut contribute = |cats: &[StatCategory]| {
                for cat in cats {
                    let value = cat.value_of(player, ipg);
                    if value.is_finite() {
                        pools[cat.index()].push(value);
                    }
                }
            };
            if cutoffs.qualifies_hitting(player) {
                contribute(&StatCategory::OFFENSE);
            }
            if cutoffs.qualifies_pitching(player) {
                contribute(&StatCategory::PITCHING);
            }
            if cutoffs.qualifies_fielding(player) {
                contribute(&[StatCategory::NetDefense]);
            }
        }

        for pool in pools.iter_mut() {
            pool.sort_by(f64::total_cmp);
        }

        for cat in StatCategory::ALL {
            debug!("stat pool {}: {} values", cat.label(), pools[cat.index()].len());
        }

        LeagueStatPool {
            pools,
            innings_per_game: ipg,
        }
    }

    /// Sorted values for a category.
    pub fn values(&self, category: StatCategory) -> &[f64] {
        &self.pools[category.index()]
    }

    /// The player's percentile in `category`, inverted for lower-is-better
    /// stats. `None` when the pool is empty, so callers skip it rather than
    /// scoring it.
    pub fn player_percentile(
        &self,
        category: StatCategory,
        player: &PlayerSeasonAggregate,
    ) -> Option<f64> {
        let pool = self.values(category);
        if pool.is_empty() {
            return None;
        }
        let value = category.value_of(player, self.innings_per_game);
        Some(if category.lower_is_better() {
            inverted_percentile(value, pool)
        } else {
            percentile(value, pool)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualificationConfig;

    fn make_hitter(name: &str, team: Option<&str>, ab: u32, h: u32, hr: u32, games: u32) -> PlayerSeasonAggregate {
        let mut p = PlayerSeasonAggregate::new(name, team);
        p.hitting.at_bats = ab;
        p.hitting.hits = h;
        p.hitting.home_runs = hr;
        p.hitting.total_bases = h + hr * 3;
        p.fielding.games = games;
        p
    }

    fn make_pitcher(name: &str, ip: f64, runs: u32, hits: u32, walks: u32) -> PlayerSeasonAggregate {
        let mut p = PlayerSeasonAggregate::new(name, Some("Peach Monarchs"));
        p.pitching.innings = ip;
        p.pitching.runs_allowed = runs;
        p.pitching.hits_allowed = hits;
        p.pitching.walks_allowed = walks;
        p.pitching.batters_faced = (ip * 3.0) as u32 + hits + walks;
        p
    }

    fn cutoffs() -> QualificationCutoffs {
        // 10 games: 20 AB, 10 IP, 5 fielding games
        QualificationCutoffs::from_average_games(10.0, &QualificationConfig::default())
    }

    #[test]
    fn only_qualified_players_contribute() {
        let players = vec![
            make_hitter("Mario", Some("Mario Fireballs"), 30, 12, 3, 10),
            make_hitter("Baby Mario", Some("Mario Fireballs"), 10, 2, 0, 3),
            make_pitcher("Bowser", 12.0, 6, 10, 4),
            make_pitcher("Dry Bones", 4.0, 9, 8, 2),
        ];
        let pool = LeagueStatPool::build(&players, &cutoffs(), &LeagueRules::default());

        assert_eq!(pool.values(StatCategory::Avg).len(), 1);
        assert_eq!(pool.values(StatCategory::HomeRuns), &[3.0]);
        assert_eq!(pool.values(StatCategory::Era).len(), 1);
        assert_eq!(pool.values(StatCategory::Era)[0], 6.0 * 7.0 / 12.0);
        // Only Mario reached 5 fielding games
        assert_eq!(pool.values(StatCategory::NetDefense).len(), 1);
    }

    #[test]
    fn pools_are_sorted_ascending() {
        let players: Vec<_> = [(30, 15), (30, 6), (40, 12), (25, 10)]
            .iter()
            .enumerate()
            .map(|(i, &(ab, h))| make_hitter(&format!("H{i}"), Some("Team"), ab, h, i as u32, 10))
            .collect();
        let pool = LeagueStatPool::build(&players, &cutoffs(), &LeagueRules::default());
        for cat in StatCategory::OFFENSE {
            let values = pool.values(cat);
            assert_eq!(values.len(), 4);
            assert!(values.windows(2).all(|w| w[0] <= w[1]), "{} not sorted", cat.label());
        }
    }

    #[test]
    fn free_agents_excluded_by_default() {
        let players = vec![
            make_hitter("Mario", Some("Mario Fireballs"), 30, 12, 3, 10),
            make_hitter("Free Agent", None, 30, 20, 9, 10),
        ];
        let pool = LeagueStatPool::build(&players, &cutoffs(), &LeagueRules::default());
        assert_eq!(pool.values(StatCategory::Avg).len(), 1);

        let rules = LeagueRules {
            exclude_players_without_team: false,
            ..LeagueRules::default()
        };
        let pool = LeagueStatPool::build(&players, &cutoffs(), &rules);
        assert_eq!(pool.values(StatCategory::Avg).len(), 2);
    }

    #[test]
    fn empty_pool_yields_no_percentile() {
        let players = vec![make_hitter("Mario", Some("Mario Fireballs"), 30, 12, 3, 10)];
        let pool = LeagueStatPool::build(&players, &cutoffs(), &LeagueRules::default());
        assert!(pool.player_percentile(StatCategory::Era, &players[0]).is_none());
        assert!(pool.player_percentile(StatCategory::Avg, &players[0]).is_some());
    }

    #[test]
    fn pitching_percentiles_are_inverted() {
        let players = vec![
            make_pitcher("Ace", 20.0, 4, 10, 2),
            make_pitcher("Mid", 20.0, 10, 20, 6),
            make_pitcher("Bad", 20.0, 20, 30, 10),
        ];
        let pool = LeagueStatPool::build(&players, &cutoffs(), &LeagueRules::default());
        let ace = pool.player_percentile(StatCategory::Era, &players[0]).unwrap();
        let bad = pool.player_percentile(StatCategory::Era, &players[2]).unwrap();
        assert!(ace > bad);
        // lowest ERA of three: 0 below, 1 equal -> 16.67, inverted -> 83.33
        assert!((ace - (100.0 - 100.0 / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn era_uses_league_game_length() {
        let players = vec![make_pitcher("Bowser", 14.0, 6, 10, 4)];
        let rules = LeagueRules {
            innings_per_game: 9.0,
            ..LeagueRules::default()
        };
        let pool = LeagueStatPool::build(&players, &cutoffs(), &rules);
        assert_eq!(pool.values(StatCategory::Era), &[6.0 * 9.0 / 14.0]);
    }
}
