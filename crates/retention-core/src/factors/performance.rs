// Performance: offensive, defensive and pitching percentiles mapped through
// tier tables, then adjusted by the auto-flag and draft-expectation rules.
//
// Both modifiers key off the offensive percentile only. A player who never
// qualified at the plate is never flagged or compared to his draft slot,
// whatever his fielding or pitching numbers.

use serde::Serialize;

use super::{join_trace, pts};
use crate::config::EngineConfig;
use crate::model::PlayerSeasonAggregate;
use crate::modifiers::{auto_flag, draft_expectation};
use crate::percentile::mean_percentile;
use crate::qualification::QualificationCutoffs;
use crate::stat_pool::{LeagueStatPool, StatCategory};
use crate::tiers::TierTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceBreakdown {
    pub offensive_percentile: Option<f64>,
    pub defensive_percentile: Option<f64>,
    pub pitching_percentile: Option<f64>,
    pub offensive: f64,
    pub defensive: f64,
    pub pitching: f64,
    pub auto_flag_penalty: f64,
    pub expectation_mod: f64,
    /// Sum of the three components before modifiers; uncapped.
    pub base_total: f64,
    /// Modified total clamped to `[0, factor_max]`.
    pub total: f64,
    pub trace: String,
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

struct Component {
    percentile: Option<f64>,
    points: f64,
    text: String,
}

impl Component {
    fn unscored(text: String) -> Self {
        Component {
            percentile: None,
            points: 0.0,
            text,
        }
    }
}

/// Average the player's percentiles over `categories` (empty pools skipped)
/// and map the result through `table`.
fn ranked_component(
    label: &str,
    categories: &[StatCategory],
    player: &PlayerSeasonAggregate,
    pool: &LeagueStatPool,
    table: &TierTable,
) -> Component {
    let percentiles: Vec<f64> = categories
        .iter()
        .filter_map(|cat| pool.player_percentile(*cat, player))
        .collect();
    let Some(pct) = mean_percentile(&percentiles) else {
        return Component::unscored(format!("{label} no qualified peers"));
    };
    let (points, tier) = match table.lookup(pct) {
        Some(tier) => (tier.points, tier.label.as_str()),
        None => (0.0, "unranked"),
    };
    Component {
        percentile: Some(pct),
        points,
        text: format!("{label} {pct:.1} pct {tier} {}", pts(points)),
    }
}

fn offensive_component(
    player: &PlayerSeasonAggregate,
    pool: &LeagueStatPool,
    cutoffs: &QualificationCutoffs,
    table: &TierTable,
) -> Component {
    if !cutoffs.qualifies_hitting(player) {
        return Component::unscored(format!(
            "OFF not qualified ({}/{:.0} AB)",
            player.hitting.at_bats, cutoffs.min_at_bats
        ));
    }
    ranked_component("OFF", &StatCategory::OFFENSE, player, pool, table)
}

fn defensive_component(
    player: &PlayerSeasonAggregate,
    pool: &LeagueStatPool,
    cutoffs: &QualificationCutoffs,
    table: &TierTable,
) -> Component {
    if !cutoffs.qualifies_fielding(player) {
        return Component::unscored(format!(
            "DEF not qualified ({}/{:.1} G)",
            player.fielding.games, cutoffs.min_fielding_games
        ));
    }
    ranked_component("DEF", &[StatCategory::NetDefense], player, pool, table)
}

fn pitching_component(
    player: &PlayerSeasonAggregate,
    pool: &LeagueStatPool,
    cutoffs: &QualificationCutoffs,
    table: &TierTable,
) -> Component {
    if !cutoffs.qualifies_pitching(player) {
        // Most players never pitch; keep their trace short.
        if player.pitching.innings == 0.0 {
            return Component::unscored(String::new());
        }
        return Component::unscored(format!(
            "PIT not qualified ({:.1}/{:.1} IP)",
            player.pitching.innings, cutoffs.min_innings
        ));
    }
    ranked_component("PIT", &StatCategory::PITCHING, player, pool, table)
}

// ---------------------------------------------------------------------------
// Factor
// ---------------------------------------------------------------------------

pub fn performance(
    player: &PlayerSeasonAggregate,
    pool: &LeagueStatPool,
    cutoffs: &QualificationCutoffs,
    standing: Option<u32>,
    acquisition_cost: Option<u32>,
    config: &EngineConfig,
) -> PerformanceBreakdown {
    let tables = &config.performance;
    let offense = offensive_component(player, pool, cutoffs, &tables.offense);
    let defense = defensive_component(player, pool, cutoffs, &tables.defense);
    let pitching = pitching_component(player, pool, cutoffs, &tables.pitching);

    let base_total = offense.points + defense.points + pitching.points;

    let flag = auto_flag::evaluate(offense.percentile, standing, &config.auto_flag);
    let expectation = draft_expectation::evaluate(
        offense.percentile,
        acquisition_cost,
        &config.draft_expectation,
    );

    let unclamped = base_total + flag.points + expectation.points;
    let total = config.grade.clamp_factor(unclamped);

    let mut trace = join_trace(&[
        offense.text,
        defense.text,
        pitching.text,
        flag.trace,
        expectation.trace,
    ]);
    if total != unclamped {
        trace.push_str(&format!(" => {} (clamped from {})", pts(total), pts(unclamped)));
    } else {
        trace.push_str(&format!(" => {}", pts(total)));
    }

    PerformanceBreakdown {
        offensive_percentile: offense.percentile,
        defensive_percentile: defense.percentile,
        pitching_percentile: pitching.percentile,
        offensive: offense.points,
        defensive: defense.points,
        pitching: pitching.points,
        auto_flag_penalty: flag.points,
        expectation_mod: expectation.points,
        base_total,
        total,
        trace: format!("PERF: {trace}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LeagueRules, QualificationConfig};

    const TEAM: &str = "Mario Fireballs";

    fn cutoffs() -> QualificationCutoffs {
        // 10 games: 20 AB, 10 IP, 5 fielding games
        QualificationCutoffs::from_average_games(10.0, &QualificationConfig::default())
    }

    fn make_star(name: &str) -> PlayerSeasonAggregate {
        let mut p = PlayerSeasonAggregate::new(name, Some(TEAM));
        p.hitting.at_bats = 30;
        p.hitting.hits = 25;
        p.hitting.home_runs = 10;
        p.hitting.rbi = 30;
        p.hitting.walks = 10;
        p.hitting.total_bases = 50;
        p.fielding.games = 10;
        p
    }

    fn make_filler(i: u32) -> PlayerSeasonAggregate {
        let mut p = PlayerSeasonAggregate::new(format!("Filler {i}"), Some(TEAM));
        p.hitting.at_bats = 30;
        p.hitting.hits = 5 + i / 2;
        p.hitting.home_runs = i / 3;
        p.hitting.rbi = i;
        p.hitting.walks = i / 6;
        p.hitting.total_bases = p.hitting.hits + p.hitting.home_runs;
        p.fielding.games = 10;
        p
    }

    fn make_slugger(name: &str) -> PlayerSeasonAggregate {
        let mut p = make_star(name);
        p.hitting.hits = 28;
        p.hitting.home_runs = 12;
        p.hitting.rbi = 35;
        p.hitting.walks = 12;
        p.hitting.total_bases = 60;
        p
    }

    /// Seventeen weaker hitters, two identical stars and one slugger above
    /// them: each star sits at (17 + 0.5 * 2) / 20 = the 90th percentile in
    /// every offensive stat.
    fn league() -> (Vec<PlayerSeasonAggregate>, LeagueStatPool) {
        let mut players: Vec<_> = (0..17).map(make_filler).collect();
        players.push(make_star("Mario"));
        players.push(make_star("Luigi"));
        players.push(make_slugger("Wario"));
        let pool = LeagueStatPool::build(&players, &cutoffs(), &LeagueRules::default());
        (players, pool)
    }

    fn star(players: &[PlayerSeasonAggregate]) -> &PlayerSeasonAggregate {
        players.iter().find(|p| p.name == "Mario").unwrap()
    }

    #[test]
    fn ninetieth_percentile_hitter_is_elite_and_unflagged_on_good_team() {
        let (players, pool) = league();
        let config = EngineConfig::default();
        let perf = performance(star(&players), &pool, &cutoffs(), Some(3), None, &config);
        assert_eq!(perf.offensive_percentile, Some(90.0));
        assert_eq!(perf.offensive, 14.0);
        assert_eq!(perf.auto_flag_penalty, 0.0);
        assert!(perf.trace.contains("elite"));
    }

    #[test]
    fn auto_flag_by_standing() {
        let (players, pool) = league();
        let config = EngineConfig::default();
        let p = star(&players);

        let last = performance(p, &pool, &cutoffs(), Some(8), None, &config);
        assert_eq!(last.auto_flag_penalty, -4.0);
        let sixth = performance(p, &pool, &cutoffs(), Some(6), None, &config);
        assert_eq!(sixth.auto_flag_penalty, -2.0);
        let fourth = performance(p, &pool, &cutoffs(), Some(4), None, &config);
        assert_eq!(fourth.auto_flag_penalty, 0.0);

        assert_eq!(last.total, last.base_total - 4.0);
    }

    #[test]
    fn unqualified_hitter_gets_no_modifiers() {
        let (mut players, _) = league();
        let mut bench = make_star("Toadette");
        bench.hitting.at_bats = 5;
        players.push(bench);
        let pool = LeagueStatPool::build(&players, &cutoffs(), &LeagueRules::default());
        let config = EngineConfig::default();
        let bench = players.last().unwrap();

        let perf = performance(bench, &pool, &cutoffs(), Some(8), Some(9), &config);
        assert_eq!(perf.offensive_percentile, None);
        assert_eq!(perf.offensive, 0.0);
        assert_eq!(perf.auto_flag_penalty, 0.0);
        assert_eq!(perf.expectation_mod, 0.0);
        assert!(perf.trace.contains("OFF not qualified (5/20 AB)"));
        // Fielding still qualifies
        assert!(perf.defensive_percentile.is_some());
    }

    #[test]
    fn draft_expectation_applies_to_star() {
        let (players, pool) = league();
        let config = EngineConfig::default();
        let high = performance(star(&players), &pool, &cutoffs(), Some(1), Some(1), &config);
        assert_eq!(high.expectation_mod, 2.0);
        let late = performance(star(&players), &pool, &cutoffs(), Some(1), Some(7), &config);
        assert_eq!(late.expectation_mod, -3.0);
    }

    #[test]
    fn pitching_uses_inverted_rates() {
        let mut players: Vec<PlayerSeasonAggregate> = Vec::new();
        for (name, runs) in [("Ace", 2), ("Mid", 8), ("Bad", 20)] {
            let mut p = PlayerSeasonAggregate::new(name, Some(TEAM));
            p.pitching.innings = 20.0;
            p.pitching.runs_allowed = runs;
            p.pitching.hits_allowed = runs * 2;
            p.pitching.walks_allowed = runs / 2;
            p.pitching.batters_faced = 60 + runs * 3;
            players.push(p);
        }
        let pool = LeagueStatPool::build(&players, &cutoffs(), &LeagueRules::default());
        let config = EngineConfig::default();

        let ace = performance(&players[0], &pool, &cutoffs(), None, None, &config);
        let bad = performance(&players[2], &pool, &cutoffs(), None, None, &config);
        assert!(ace.pitching_percentile.unwrap() > bad.pitching_percentile.unwrap());
        assert!(ace.pitching > bad.pitching);
        // Lowest of three in every rate: 100 - 16.67
        assert!((ace.pitching_percentile.unwrap() - 83.333).abs() < 0.01);
        assert_eq!(ace.pitching, 5.0);
    }

    #[test]
    fn total_clamps_at_zero_with_pathological_modifiers() {
        let (players, pool) = league();
        let mut config = EngineConfig::default();
        config.auto_flag.severe.penalty = 500.0;
        let perf = performance(star(&players), &pool, &cutoffs(), Some(8), None, &config);
        assert!(perf.base_total > 0.0);
        assert_eq!(perf.total, 0.0);
        assert!(perf.trace.contains("clamped"));
    }

    #[test]
    fn total_clamps_at_factor_max() {
        let (players, pool) = league();
        let mut config = EngineConfig::default();
        for tier in config.performance.offense.tiers.iter_mut() {
            tier.points += 40.0;
        }
        let perf = performance(star(&players), &pool, &cutoffs(), Some(1), None, &config);
        assert!(perf.base_total > 20.0);
        assert_eq!(perf.total, 20.0);
    }

    #[test]
    fn totals_always_within_bounds() {
        let (players, pool) = league();
        let config = EngineConfig::default();
        for p in &players {
            for standing in [None, Some(1), Some(5), Some(8)] {
                for cost in [None, Some(1), Some(4), Some(10)] {
                    let perf = performance(p, &pool, &cutoffs(), standing, cost, &config);
                    assert!((0.0..=20.0).contains(&perf.total), "{} out of range", perf.total);
                }
            }
        }
    }
}
