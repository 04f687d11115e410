// Engine configuration: tier tables, qualification multipliers, modifier
// rules and combination weights.
//
// Resolved once at startup and passed by reference into every component.
// `EngineConfig::default()` matches the shipped `defaults/grading.toml`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::postseason::PostseasonFinish;
use crate::tiers::TierTable;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("factor weights must sum to 1.0, got {sum}")]
    WeightsDoNotSumToOne { sum: f64 },

    #[error("tier table `{table}` has no tiers")]
    EmptyTierTable { table: String },

    #[error("tier table `{table}` thresholds are not strictly ordered at entry {index}")]
    TierTableNotMonotonic { table: String, index: usize },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

/// Tolerance for the weights-sum-to-one check.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    pub league: LeagueRules,
    pub qualification: QualificationConfig,
    pub team_success: TeamSuccessConfig,
    pub play_time: PlayTimeConfig,
    pub performance: PerformanceConfig,
    pub auto_flag: AutoFlagConfig,
    pub draft_expectation: DraftExpectationConfig,
    pub grade: GradeConfig,
}

/// League-shape settings that affect how season data is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueRules {
    /// Season length used when no team has recorded a game yet.
    pub nominal_season_games: f64,
    /// Innings in a regulation game; scales ERA.
    pub innings_per_game: f64,
    /// Leave free agents out of every stat pool.
    pub exclude_players_without_team: bool,
}

impl Default for LeagueRules {
    fn default() -> Self {
        LeagueRules {
            nominal_season_games: 14.0,
            innings_per_game: 7.0,
            exclude_players_without_team: true,
        }
    }
}

/// Multipliers applied to the average games per team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationConfig {
    pub at_bats_per_team_game: f64,
    pub innings_per_team_game: f64,
    pub fielding_games_fraction: f64,
}

impl Default for QualificationConfig {
    fn default() -> Self {
        QualificationConfig {
            at_bats_per_team_game: 2.0,
            innings_per_team_game: 1.0,
            fielding_games_fraction: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Team success
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandingPoints {
    pub standing: u32,
    pub points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishPoints {
    pub finish: PostseasonFinish,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSuccessConfig {
    pub standings: Vec<StandingPoints>,
    pub postseason: Vec<FinishPoints>,
}

impl TeamSuccessConfig {
    /// Points for a final regular-season standing; 0 for standings not in
    /// the table.
    pub fn standing_points(&self, standing: u32) -> f64 {
        self.standings
            .iter()
            .find(|s| s.standing == standing)
            .map_or(0.0, |s| s.points)
    }

    pub fn finish_points(&self, finish: PostseasonFinish) -> f64 {
        self.postseason
            .iter()
            .find(|f| f.finish == finish)
            .map_or(0.0, |f| f.points)
    }
}

impl Default for TeamSuccessConfig {
    fn default() -> Self {
        let standings = [10.0, 8.0, 8.0, 6.0, 5.0, 3.0, 3.0, 0.0]
            .iter()
            .enumerate()
            .map(|(i, &points)| StandingPoints {
                standing: i as u32 + 1,
                points,
            })
            .collect();
        let postseason = [
            (PostseasonFinish::Champion, 10.0),
            (PostseasonFinish::RunnerUp, 7.0),
            (PostseasonFinish::Semifinal, 5.0),
            (PostseasonFinish::Quarterfinal, 2.0),
            (PostseasonFinish::Missed, 0.0),
        ]
        .iter()
        .map(|&(finish, points)| FinishPoints { finish, points })
        .collect();
        TeamSuccessConfig {
            standings,
            postseason,
        }
    }
}

// ---------------------------------------------------------------------------
// Play time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayTimeConfig {
    /// Players with at least this many innings use the pitcher usage proxy.
    pub pitcher_min_innings: f64,
    /// Share of team games played.
    pub games_share: TierTable,
    /// Average batting-order slot from lineup data.
    pub lineup_slot: TierTable,
    /// At-bats per game played (fallback for position players).
    pub hitter_usage: TierTable,
    /// Innings per game played (fallback for pitchers).
    pub pitcher_usage: TierTable,
}

impl Default for PlayTimeConfig {
    fn default() -> Self {
        PlayTimeConfig {
            pitcher_min_innings: 5.0,
            games_share: TierTable::higher_is_better(&[
                (0.90, 10.0, "full-time"),
                (0.75, 8.0, "regular"),
                (0.50, 6.0, "rotation"),
                (0.25, 4.0, "bench"),
                (0.0, 1.0, "minimal"),
            ]),
            lineup_slot: TierTable::lower_is_better(&[
                (3.0, 10.0, "top three"),
                (5.0, 8.0, "four-five"),
                (7.0, 6.0, "six-seven"),
                (9.0, 4.0, "eight-nine"),
                (99.0, 2.0, "bench"),
            ]),
            hitter_usage: TierTable::higher_is_better(&[
                (3.5, 10.0, "everyday bat"),
                (3.0, 8.0, "regular bat"),
                (2.5, 6.0, "part-time bat"),
                (2.0, 4.0, "spot bat"),
                (0.0, 2.0, "bench bat"),
            ]),
            pitcher_usage: TierTable::higher_is_better(&[
                (4.0, 10.0, "workhorse"),
                (3.0, 8.0, "starter"),
                (2.0, 6.0, "swingman"),
                (1.0, 4.0, "reliever"),
                (0.0, 2.0, "mop-up"),
            ]),
        }
    }
}

// ---------------------------------------------------------------------------
// Performance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub offense: TierTable,
    pub defense: TierTable,
    pub pitching: TierTable,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig {
            offense: TierTable::higher_is_better(&[
                (90.0, 14.0, "elite"),
                (80.0, 12.0, "excellent"),
                (70.0, 10.0, "great"),
                (60.0, 8.0, "good"),
                (50.0, 6.0, "above average"),
                (40.0, 4.0, "average"),
                (25.0, 2.0, "below average"),
                (0.0, 0.0, "terrible"),
            ]),
            defense: TierTable::higher_is_better(&[
                (90.0, 4.0, "gold glove"),
                (75.0, 3.0, "excellent"),
                (60.0, 2.0, "good"),
                (45.0, 1.0, "average"),
                (30.0, 0.0, "below average"),
                (15.0, -1.0, "poor"),
                (0.0, -2.0, "liability"),
            ]),
            pitching: TierTable::higher_is_better(&[
                (90.0, 6.0, "ace"),
                (75.0, 5.0, "excellent"),
                (60.0, 4.0, "good"),
                (45.0, 3.0, "average"),
                (30.0, 2.0, "below average"),
                (15.0, 1.0, "poor"),
                (0.0, 0.0, "terrible"),
            ]),
        }
    }
}

// ---------------------------------------------------------------------------
// Auto-flagging
// ---------------------------------------------------------------------------

/// One auto-flag rule: offensive percentile at or above `min_percentile` on a
/// team finishing between `min_standing` and `max_standing` (inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFlagTier {
    pub min_percentile: f64,
    pub min_standing: u32,
    pub max_standing: u32,
    /// Magnitude of the penalty; applied as a deduction.
    pub penalty: f64,
}

impl AutoFlagTier {
    pub fn matches(&self, percentile: f64, standing: u32) -> bool {
        percentile >= self.min_percentile
            && (self.min_standing..=self.max_standing).contains(&standing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFlagConfig {
    pub severe: AutoFlagTier,
    pub moderate: AutoFlagTier,
}

impl Default for AutoFlagConfig {
    fn default() -> Self {
        AutoFlagConfig {
            severe: AutoFlagTier {
                min_percentile: 75.0,
                min_standing: 7,
                max_standing: 8,
                penalty: 4.0,
            },
            moderate: AutoFlagTier {
                min_percentile: 60.0,
                min_standing: 5,
                max_standing: 8,
                penalty: 2.0,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Draft expectation
// ---------------------------------------------------------------------------

/// How a band reads over- and under-performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectationFraming {
    /// Expensive picks: a good season is a good situation, a bad one is not.
    Situation,
    /// Cheap picks: a good season makes the player feel undervalued, a bad
    /// one keeps them content.
    SelfWorth,
}

impl ExpectationFraming {
    /// Sign applied to the over-performance magnitude; the under-performance
    /// sign is always the opposite.
    pub fn over_sign(self) -> f64 {
        match self {
            ExpectationFraming::Situation => 1.0,
            ExpectationFraming::SelfWorth => -1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftBand {
    pub label: String,
    pub first_round: u32,
    /// Last round in the band; `None` for the open-ended final band.
    #[serde(default)]
    pub last_round: Option<u32>,
    pub framing: ExpectationFraming,
    /// Percentile at or above which the player over-performed.
    pub over_percentile: f64,
    pub over_magnitude: f64,
    /// Percentile below which the player under-performed.
    pub under_percentile: f64,
    pub under_magnitude: f64,
}

impl DraftBand {
    pub fn contains(&self, round: u32) -> bool {
        round >= self.first_round && self.last_round.map_or(true, |last| round <= last)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftExpectationConfig {
    pub bands: Vec<DraftBand>,
}

impl DraftExpectationConfig {
    pub fn band_for(&self, round: u32) -> Option<&DraftBand> {
        self.bands.iter().find(|b| b.contains(round))
    }
}

impl Default for DraftExpectationConfig {
    fn default() -> Self {
        DraftExpectationConfig {
            bands: vec![
                DraftBand {
                    label: "high".into(),
                    first_round: 1,
                    last_round: Some(2),
                    framing: ExpectationFraming::Situation,
                    over_percentile: 75.0,
                    over_magnitude: 2.0,
                    under_percentile: 40.0,
                    under_magnitude: 2.0,
                },
                DraftBand {
                    label: "mid".into(),
                    first_round: 3,
                    last_round: Some(5),
                    framing: ExpectationFraming::SelfWorth,
                    over_percentile: 70.0,
                    over_magnitude: 2.0,
                    under_percentile: 30.0,
                    under_magnitude: 1.0,
                },
                DraftBand {
                    label: "late".into(),
                    first_round: 6,
                    last_round: None,
                    framing: ExpectationFraming::SelfWorth,
                    over_percentile: 60.0,
                    over_magnitude: 3.0,
                    under_percentile: 25.0,
                    under_magnitude: 1.0,
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Grade combination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub team_success: f64,
    pub play_time: f64,
    pub performance: f64,
    pub chemistry: f64,
    pub team_direction: f64,
}

impl FactorWeights {
    pub fn sum(&self) -> f64 {
        self.team_success + self.play_time + self.performance + self.chemistry + self.team_direction
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        FactorWeights {
            team_success: 0.18,
            play_time: 0.32,
            performance: 0.17,
            chemistry: 0.12,
            team_direction: 0.21,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeConfig {
    /// Upper bound of every factor total (lower bound is 0).
    pub factor_max: f64,
    pub weights: FactorWeights,
    /// Maps the weighted 0..factor_max composite onto the output range.
    pub scale: f64,
    pub offset: f64,
    pub output_min: f64,
    pub output_max: f64,
}

impl GradeConfig {
    pub fn clamp_factor(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        value.clamp(0.0, self.factor_max)
    }
}

impl Default for GradeConfig {
    fn default() -> Self {
        GradeConfig {
            factor_max: 20.0,
            weights: FactorWeights::default(),
            scale: 4.5,
            offset: 5.0,
            output_min: 5.0,
            output_max: 95.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

impl EngineConfig {
    /// Reject configurations the engine cannot grade with. Data-quality
    /// problems are never errors; only these structural mistakes are.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // League
        if !(self.league.nominal_season_games > 0.0) {
            return Err(invalid("league.nominal_season_games", "must be > 0"));
        }
        if !(self.league.innings_per_game > 0.0) {
            return Err(invalid("league.innings_per_game", "must be > 0"));
        }

        // Qualification
        let q = &self.qualification;
        let q_fields: &[(&str, f64)] = &[
            ("qualification.at_bats_per_team_game", q.at_bats_per_team_game),
            ("qualification.innings_per_team_game", q.innings_per_team_game),
            ("qualification.fielding_games_fraction", q.fielding_games_fraction),
        ];
        for (name, val) in q_fields {
            if !(*val >= 0.0) || !val.is_finite() {
                return Err(invalid(name, format!("must be a finite value >= 0, got {val}")));
            }
        }

        // Team success tables
        let mut seen = std::collections::HashSet::new();
        for entry in &self.team_success.standings {
            if entry.standing == 0 || !seen.insert(entry.standing) {
                return Err(invalid(
                    "team_success.standings",
                    format!("standing {} is zero or listed twice", entry.standing),
                ));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for entry in &self.team_success.postseason {
            if !seen.insert(entry.finish) {
                return Err(invalid(
                    "team_success.postseason",
                    format!("finish {:?} listed twice", entry.finish),
                ));
            }
        }

        // Tier tables
        let tables: &[(&str, &TierTable)] = &[
            ("play_time.games_share", &self.play_time.games_share),
            ("play_time.lineup_slot", &self.play_time.lineup_slot),
            ("play_time.hitter_usage", &self.play_time.hitter_usage),
            ("play_time.pitcher_usage", &self.play_time.pitcher_usage),
            ("performance.offense", &self.performance.offense),
            ("performance.defense", &self.performance.defense),
            ("performance.pitching", &self.performance.pitching),
        ];
        for (name, table) in tables {
            table.validate(name)?;
        }

        // Auto-flag: tier 1 must hurt more than tier 2
        let flag = &self.auto_flag;
        for (name, tier) in [("auto_flag.severe", &flag.severe), ("auto_flag.moderate", &flag.moderate)] {
            if tier.penalty < 0.0 || tier.min_standing > tier.max_standing {
                return Err(invalid(
                    name,
                    "penalty must be >= 0 and min_standing <= max_standing",
                ));
            }
        }
        if flag.severe.penalty <= flag.moderate.penalty {
            return Err(invalid(
                "auto_flag.severe.penalty",
                format!(
                    "must exceed moderate penalty ({} <= {})",
                    flag.severe.penalty, flag.moderate.penalty
                ),
            ));
        }

        // Draft bands: ordered, contiguous-or-gapped but never overlapping,
        // only the final band may be open-ended.
        let bands = &self.draft_expectation.bands;
        for (i, band) in bands.iter().enumerate() {
            let field = format!("draft_expectation.bands[{i}]");
            if band.first_round == 0 {
                return Err(invalid(&field, "first_round must be >= 1"));
            }
            if band.last_round.is_some_and(|last| last < band.first_round) {
                return Err(invalid(&field, "last_round must be >= first_round"));
            }
            if band.over_magnitude < 0.0 || band.under_magnitude < 0.0 {
                return Err(invalid(&field, "magnitudes must be >= 0"));
            }
            if band.under_percentile > band.over_percentile {
                return Err(invalid(&field, "under_percentile must not exceed over_percentile"));
            }
            if let Some(next) = bands.get(i + 1) {
                match band.last_round {
                    Some(last) if last < next.first_round => {}
                    _ => return Err(invalid(&field, "overlaps the following band")),
                }
            }
        }

        // Combination
        let g = &self.grade;
        if !(g.factor_max > 0.0) {
            return Err(invalid("grade.factor_max", "must be > 0"));
        }
        let sum = g.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ConfigError::WeightsDoNotSumToOne { sum });
        }
        let w = &g.weights;
        for (name, val) in [
            ("grade.weights.team_success", w.team_success),
            ("grade.weights.play_time", w.play_time),
            ("grade.weights.performance", w.performance),
            ("grade.weights.chemistry", w.chemistry),
            ("grade.weights.team_direction", w.team_direction),
        ] {
            if val < 0.0 {
                return Err(invalid(name, format!("must be >= 0, got {val}")));
            }
        }
        if !(g.scale > 0.0) {
            return Err(invalid("grade.scale", "must be > 0"));
        }
        if !(g.output_min <= g.output_max) {
            return Err(invalid("grade.output_min", "must not exceed output_max"));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
