// Batch grading driver.
//
// One run: standings and qualification cutoffs from the team records, the
// stat pool from every qualified player, then each player graded
// independently against those read-only inputs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::{ConfigError, EngineConfig};
use crate::factors::{join_trace, performance, play_time, pts, team_success};
use crate::grade::{combine, FactorTotals, GradeBreakdown};
use crate::model::{LineupUsage, PlayerSeasonAggregate, TeamSeasonAggregate};
use crate::postseason::PostseasonFinish;
use crate::qualification::{average_team_games, QualificationCutoffs};
use crate::standings::{compute_standings, rank_map, StandingEntry};
use crate::stat_pool::LeagueStatPool;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Hand-entered values for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualInputs {
    pub chemistry: f64,
    pub team_direction: f64,
    /// Draft round the player was taken in, if recorded.
    pub acquisition_cost: Option<u32>,
    /// Signed adjustment added to team success before clamping.
    pub team_success_adjustment: f64,
}

/// Everything the engine reads for one season.
#[derive(Debug, Clone, Default)]
pub struct SeasonInputs {
    pub players: Vec<PlayerSeasonAggregate>,
    pub teams: HashMap<String, TeamSeasonAggregate>,
    pub postseason: HashMap<String, PostseasonFinish>,
    pub lineups: LineupUsage,
    pub manual: HashMap<String, ManualInputs>,
}

impl SeasonInputs {
    /// Teams in name order.
    pub fn sorted_teams(&self) -> Vec<TeamSeasonAggregate> {
        let mut teams: Vec<TeamSeasonAggregate> = self.teams.values().cloned().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        teams
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Read-only state shared by every player grade in a run.
pub struct GradingContext<'a> {
    pub config: &'a EngineConfig,
    pub season: &'a SeasonInputs,
    pub cutoffs: QualificationCutoffs,
    pub pool: LeagueStatPool,
    pub standings: HashMap<String, u32>,
}

impl<'a> GradingContext<'a> {
    /// Build cutoffs and the stat pool. `standings` maps team to rank.
    /// Fails when `config` does not validate.
    pub fn new(
        season: &'a SeasonInputs,
        standings: HashMap<String, u32>,
        config: &'a EngineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let avg_games =
            average_team_games(season.teams.values(), config.league.nominal_season_games);
        let cutoffs = QualificationCutoffs::from_average_games(avg_games, &config.qualification);
        debug!(
            "qualification: {:.1} avg games -> {:.1} AB, {:.1} IP, {:.1} G",
            cutoffs.avg_team_games,
            cutoffs.min_at_bats,
            cutoffs.min_innings,
            cutoffs.min_fielding_games
        );
        let pool = LeagueStatPool::build(&season.players, &cutoffs, &config.league);
        Ok(GradingContext {
            config,
            season,
            cutoffs,
            pool,
            standings,
        })
    }

    /// Whether this player is graded at all.
    pub fn is_eligible(&self, player: &PlayerSeasonAggregate) -> bool {
        !self.config.league.exclude_players_without_team || player.team_name().is_some()
    }

    pub fn grade_player(&self, player: &PlayerSeasonAggregate) -> GradeBreakdown {
        let config = self.config;
        let manual = self
            .season
            .manual
            .get(&player.name)
            .copied()
            .unwrap_or_default();
        let standing = player
            .team_name()
            .and_then(|team| self.standings.get(team))
            .copied();
        if player.team_name().is_some() && standing.is_none() {
            debug!("{}: team has no standing", player.name);
        }

        let ts = team_success(
            player,
            &self.standings,
            &self.season.postseason,
            &config.team_success,
        );
        let pt = play_time(
            player,
            &self.season.teams,
            &self.season.lineups,
            &config.play_time,
            config.grade.factor_max,
        );
        let perf = performance(
            player,
            &self.pool,
            &self.cutoffs,
            standing,
            manual.acquisition_cost,
            config,
        );

        let totals = FactorTotals {
            team_success: ts.total + manual.team_success_adjustment,
            play_time: pt.total,
            performance: perf.total,
            chemistry: manual.chemistry,
            team_direction: manual.team_direction,
        };
        let combined = combine(&totals, &config.grade);

        let adjustment = if manual.team_success_adjustment != 0.0 {
            format!("TS adj {:+}", manual.team_success_adjustment)
        } else {
            String::new()
        };
        let trace = join_trace(&[
            ts.trace.clone(),
            adjustment,
            pt.trace.clone(),
            perf.trace.clone(),
            format!(
                "CHEM {} DIR {}",
                pts(combined.factors.chemistry),
                pts(combined.factors.team_direction)
            ),
            format!("GRADE {}", combined.grade),
        ]);

        GradeBreakdown {
            player: player.name.clone(),
            team: player.team_name().map(str::to_string),
            automatic_total: ts.total + pt.total + perf.total,
            team_success: ts,
            play_time: pt,
            performance: perf,
            chemistry: manual.chemistry,
            team_direction: manual.team_direction,
            team_success_adjustment: manual.team_success_adjustment,
            factors: combined.factors,
            composite: combined.composite,
            grade: combined.grade,
            trace,
        }
    }
}

// ---------------------------------------------------------------------------
// Season run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SeasonGrades {
    pub cutoffs: QualificationCutoffs,
    pub standings: Vec<StandingEntry>,
    /// One breakdown per graded player, in no particular order.
    pub grades: Vec<GradeBreakdown>,
}

/// Grade every eligible player for the season. The configuration is
/// validated before anything is graded.
pub fn grade_season(
    season: &SeasonInputs,
    config: &EngineConfig,
) -> Result<SeasonGrades, ConfigError> {
    let standings = compute_standings(&season.sorted_teams());
    let ctx = GradingContext::new(season, rank_map(&standings), config)?;

    let grades: Vec<GradeBreakdown> = season
        .players
        .par_iter()
        .filter(|p| ctx.is_eligible(p))
        .map(|p| ctx.grade_player(p))
        .collect();

    let skipped = season.players.len() - grades.len();
    let mean = if grades.is_empty() {
        0.0
    } else {
        grades.iter().map(|g| g.grade as f64).sum::<f64>() / grades.len() as f64
    };
    info!(
        "graded {} players across {} teams (mean {:.1}, {} without a team skipped)",
        grades.len(),
        standings.len(),
        mean,
        skipped
    );

    Ok(SeasonGrades {
        cutoffs: ctx.cutoffs,
        standings,
        grades,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_team(name: &str, wins: u32, losses: u32) -> TeamSeasonAggregate {
        TeamSeasonAggregate {
            name: name.into(),
            games_played: wins + losses,
            wins,
            losses,
            runs_scored: wins * 5,
            runs_allowed: losses * 5,
            head_to_head: HashMap::new(),
        }
    }

    fn make_player(name: &str, team: Option<&str>, ab: u32, hits: u32, games: u32) -> PlayerSeasonAggregate {
        let mut p = PlayerSeasonAggregate::new(name, team);
        p.hitting.at_bats = ab;
        p.hitting.hits = hits;
        p.hitting.total_bases = hits;
        p.hitting.rbi = hits / 2;
        p.fielding.games = games;
        p
    }

    fn season() -> SeasonInputs {
        let mut s = SeasonInputs::default();
        for team in [make_team("Mario Fireballs", 9, 1), make_team("Bowser Monsters", 1, 9)] {
            s.teams.insert(team.name.clone(), team);
        }
        s.players = vec![
            make_player("Mario", Some("Mario Fireballs"), 40, 20, 10),
            make_player("Luigi", Some("Mario Fireballs"), 30, 8, 9),
            make_player("Bowser", Some("Bowser Monsters"), 38, 22, 10),
            make_player("Koopa", Some("Bowser Monsters"), 25, 5, 6),
            make_player("Toad", None, 35, 12, 8),
        ];
        s.postseason
            .insert("Mario Fireballs".into(), PostseasonFinish::Champion);
        s
    }

    #[test]
    fn grades_every_rostered_player() {
        let result = grade_season(&season(), &EngineConfig::default()).unwrap();
        assert_eq!(result.grades.len(), 4);
        assert!(result.grades.iter().all(|g| g.team.is_some()));
        assert!(result.grades.iter().all(|g| (5..=95).contains(&g.grade)));
        assert_eq!(result.standings[0].team, "Mario Fireballs");
        assert_eq!(result.cutoffs.avg_team_games, 10.0);
    }

    #[test]
    fn free_agents_graded_when_not_excluded() {
        let mut config = EngineConfig::default();
        config.league.exclude_players_without_team = false;
        let result = grade_season(&season(), &config).unwrap();
        assert_eq!(result.grades.len(), 5);
        let toad = result.grades.iter().find(|g| g.player == "Toad").unwrap();
        assert_eq!(toad.team_success.total, 0.0);
        assert_eq!(toad.play_time.total, 0.0);
        assert!(toad.trace.contains("TS: no team"));
    }

    #[test]
    fn strong_hitter_on_last_place_team_is_flagged() {
        let result = grade_season(&season(), &EngineConfig::default()).unwrap();
        let bowser = result.grades.iter().find(|g| g.player == "Bowser").unwrap();
        assert_eq!(bowser.team_success.standing, Some(2));
        // Only two teams: standing 2 is outside both flag ranges.
        assert_eq!(bowser.performance.auto_flag_penalty, 0.0);

        let mut s = season();
        for (name, w, l) in [("Yoshi Eggs", 8, 2), ("Peach Monarchs", 7, 3), ("Daisy Flowers", 6, 4),
            ("Wario Muscles", 5, 5), ("Luigi Knights", 4, 6), ("Toad Rangers", 3, 7)]
        {
            s.teams.insert(name.into(), make_team(name, w, l));
        }
        let result = grade_season(&s, &EngineConfig::default()).unwrap();
        let bowser = result.grades.iter().find(|g| g.player == "Bowser").unwrap();
        assert_eq!(bowser.team_success.standing, Some(8));
        assert!(bowser.performance.offensive_percentile.unwrap() >= 75.0);
        assert_eq!(bowser.performance.auto_flag_penalty, -4.0);
        assert!(bowser.trace.contains("Auto-flag tier 1"));
    }

    #[test]
    fn manual_inputs_feed_the_combiner() {
        let mut s = season();
        s.manual.insert(
            "Luigi".into(),
            ManualInputs {
                chemistry: 20.0,
                team_direction: 20.0,
                acquisition_cost: None,
                team_success_adjustment: -5.0,
            },
        );
        let result = grade_season(&s, &EngineConfig::default()).unwrap();
        let luigi = result.grades.iter().find(|g| g.player == "Luigi").unwrap();
        assert_eq!(luigi.factors.chemistry, 20.0);
        assert_eq!(luigi.factors.team_direction, 20.0);
        // First place (10) + champion (10) - 5
        assert_eq!(luigi.team_success.total, 20.0);
        assert_eq!(luigi.factors.team_success, 15.0);
        assert!(luigi.trace.contains("TS adj -5"));
    }

    #[test]
    fn team_success_adjustment_is_clamped() {
        let mut s = season();
        s.manual.insert(
            "Mario".into(),
            ManualInputs {
                team_success_adjustment: 8.0,
                ..Default::default()
            },
        );
        let result = grade_season(&s, &EngineConfig::default()).unwrap();
        let mario = result.grades.iter().find(|g| g.player == "Mario").unwrap();
        assert_eq!(mario.factors.team_success, 20.0);
    }

    #[test]
    fn explicit_standings_override() {
        let s = season();
        let config = EngineConfig::default();
        let mut standings = HashMap::new();
        standings.insert("Mario Fireballs".to_string(), 8);
        let ctx = GradingContext::new(&s, standings, &config).unwrap();
        let g = ctx.grade_player(&s.players[0]);
        assert_eq!(g.team_success.regular_season, 0.0);
        assert_eq!(g.team_success.standing, Some(8));
    }

    #[test]
    fn empty_season_grades_nothing() {
        let result = grade_season(&SeasonInputs::default(), &EngineConfig::default()).unwrap();
        assert!(result.grades.is_empty());
        assert!(result.standings.is_empty());
        assert_eq!(result.cutoffs.avg_team_games, 14.0);
    }

    #[test]
    fn invalid_config_is_rejected_before_grading() {
        let mut config = EngineConfig::default();
        config.grade.factor_max = 0.0;
        let err = grade_season(&season(), &config).unwrap_err();
        assert!(err.to_string().contains("grade.factor_max"), "got: {err}");

        let mut config = EngineConfig::default();
        config.grade.output_min = 95.0;
        config.grade.output_max = 5.0;
        assert!(grade_season(&season(), &config).is_err());

        let mut config = EngineConfig::default();
        config.grade.factor_max = f64::NAN;
        assert!(GradingContext::new(&season(), HashMap::new(), &config).is_err());
    }
}
