// Season data loading.
//
// Reads the aggregated season CSVs (players, teams, head-to-head records)
// plus the optional lineup, postseason and manual-entry sheets, and
// assembles them into the engine's `SeasonInputs`.

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use retention_core::model::{
    FieldingTotals, HeadToHead, HittingTotals, LineupRecord, LineupUsage, PitchingTotals,
    PlayerSeasonAggregate, TeamSeasonAggregate,
};
use retention_core::modifiers::draft_expectation::parse_acquisition_cost;
use retention_core::postseason::PostseasonFinish;
use retention_core::{ManualInputs, SeasonInputs};

use crate::config::Config;

/// Manual chemistry and direction scores must fall in this range.
const MANUAL_SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=20.0;

#[derive(Debug, Error)]
pub enum SeasonDataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// One player's season line. Every stat column is optional so sheets that
/// only track hitting still load; blank cells read as zero.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPlayer {
    Name: String,
    #[serde(default)]
    Team: String,
    #[serde(default)]
    G: Option<u32>,
    #[serde(default)]
    AB: Option<u32>,
    #[serde(default)]
    H: Option<u32>,
    #[serde(default)]
    HR: Option<u32>,
    #[serde(default)]
    RBI: Option<u32>,
    #[serde(default)]
    BB: Option<u32>,
    #[serde(default)]
    SO: Option<u32>,
    #[serde(default)]
    ROB: Option<u32>,
    #[serde(default)]
    DP: Option<u32>,
    #[serde(default)]
    TB: Option<u32>,
    #[serde(default)]
    IP: Option<f64>,
    #[serde(default)]
    BF: Option<u32>,
    #[serde(default)]
    HA: Option<u32>,
    #[serde(default)]
    HRA: Option<u32>,
    #[serde(default)]
    RA: Option<u32>,
    #[serde(default)]
    BBA: Option<u32>,
    #[serde(default)]
    K: Option<u32>,
    #[serde(default)]
    W: Option<u32>,
    #[serde(default)]
    L: Option<u32>,
    #[serde(default)]
    SV: Option<u32>,
    #[serde(default)]
    NP: Option<u32>,
    #[serde(default)]
    E: Option<u32>,
    #[serde(default)]
    SB: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawTeam {
    Team: String,
    GP: u32,
    W: u32,
    L: u32,
    #[serde(default)]
    RS: Option<u32>,
    #[serde(default)]
    RA: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawHeadToHead {
    Team: String,
    Opponent: String,
    W: u32,
    L: u32,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawLineup {
    Name: String,
    Team: String,
    #[serde(default)]
    G: Option<u32>,
    #[serde(default, alias = "Slot")]
    AvgSlot: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPostseason {
    Team: String,
    #[serde(default)]
    Finish: String,
}

/// Hand-entered sheet. The draft round stays raw text; it is often blank or
/// annotated ("FA", "keeper").
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawManual {
    Name: String,
    #[serde(default)]
    Chemistry: Option<f64>,
    #[serde(default)]
    Direction: Option<f64>,
    #[serde(default)]
    DraftRound: String,
    #[serde(default)]
    TSAdjust: Option<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn manual_score(name: &str, column: &str, value: Option<f64>) -> f64 {
    match value {
        None => 0.0,
        Some(v) if v.is_finite() && MANUAL_SCORE_RANGE.contains(&v) => v,
        Some(v) => {
            warn!("{column} for '{name}' out of range ({v}); using 0");
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerSeasonAggregate>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players: Vec<PlayerSeasonAggregate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for result in reader.deserialize::<RawPlayer>() {
        match result {
            Ok(raw) => {
                let name = raw.Name.trim().to_string();
                if name.is_empty() {
                    warn!("skipping player row with no name");
                    continue;
                }
                let innings = raw.IP.unwrap_or(0.0);
                if !innings.is_finite() || innings < 0.0 {
                    warn!("skipping player '{}': invalid IP value {}", name, innings);
                    continue;
                }
                let team = raw.Team.trim();
                let mut player =
                    PlayerSeasonAggregate::new(name.clone(), (!team.is_empty()).then_some(team));
                player.hitting = HittingTotals {
                    at_bats: raw.AB.unwrap_or(0),
                    hits: raw.H.unwrap_or(0),
                    home_runs: raw.HR.unwrap_or(0),
                    rbi: raw.RBI.unwrap_or(0),
                    walks: raw.BB.unwrap_or(0),
                    strikeouts: raw.SO.unwrap_or(0),
                    hits_robbed: raw.ROB.unwrap_or(0),
                    double_plays: raw.DP.unwrap_or(0),
                    total_bases: raw.TB.unwrap_or(0),
                };
                player.pitching = PitchingTotals {
                    innings,
                    batters_faced: raw.BF.unwrap_or(0),
                    hits_allowed: raw.HA.unwrap_or(0),
                    home_runs_allowed: raw.HRA.unwrap_or(0),
                    runs_allowed: raw.RA.unwrap_or(0),
                    walks_allowed: raw.BBA.unwrap_or(0),
                    strikeouts: raw.K.unwrap_or(0),
                    wins: raw.W.unwrap_or(0),
                    losses: raw.L.unwrap_or(0),
                    saves: raw.SV.unwrap_or(0),
                };
                player.fielding = FieldingTotals {
                    nice_plays: raw.NP.unwrap_or(0),
                    errors: raw.E.unwrap_or(0),
                    stolen_bases: raw.SB.unwrap_or(0),
                    games: raw.G.unwrap_or(0),
                };
                match index.get(&name) {
                    Some(&i) => {
                        warn!("duplicate player '{}', using latest row", name);
                        players[i] = player;
                    }
                    None => {
                        index.insert(name, players.len());
                        players.push(player);
                    }
                }
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }
    Ok(players)
}

fn load_teams_from_reader<R: Read>(
    rdr: R,
) -> Result<HashMap<String, TeamSeasonAggregate>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut teams = HashMap::new();
    for result in reader.deserialize::<RawTeam>() {
        match result {
            Ok(raw) => {
                let name = raw.Team.trim().to_string();
                if name.is_empty() {
                    warn!("skipping team row with no name");
                    continue;
                }
                if raw.W + raw.L > raw.GP {
                    warn!(
                        "team '{}': {} wins + {} losses exceeds {} games played",
                        name, raw.W, raw.L, raw.GP
                    );
                }
                let team = TeamSeasonAggregate {
                    name: name.clone(),
                    games_played: raw.GP,
                    wins: raw.W,
                    losses: raw.L,
                    runs_scored: raw.RS.unwrap_or(0),
                    runs_allowed: raw.RA.unwrap_or(0),
                    head_to_head: HashMap::new(),
                };
                if teams.insert(name.clone(), team).is_some() {
                    warn!("duplicate team '{}', using latest row", name);
                }
            }
            Err(e) => {
                warn!("skipping malformed team row: {}", e);
            }
        }
    }
    Ok(teams)
}

/// Merge head-to-head rows into `teams`. Rows naming an unknown team are
/// skipped.
fn load_head_to_head_from_reader<R: Read>(
    rdr: R,
    teams: &mut HashMap<String, TeamSeasonAggregate>,
) -> Result<usize, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut merged = 0;
    for result in reader.deserialize::<RawHeadToHead>() {
        match result {
            Ok(raw) => {
                let team_name = raw.Team.trim();
                let opponent = raw.Opponent.trim();
                if team_name == opponent {
                    warn!("skipping head-to-head row for '{}' against itself", team_name);
                    continue;
                }
                let Some(team) = teams.get_mut(team_name) else {
                    warn!("skipping head-to-head row for unknown team '{}'", team_name);
                    continue;
                };
                team.head_to_head.insert(
                    opponent.to_string(),
                    HeadToHead {
                        wins: raw.W,
                        losses: raw.L,
                    },
                );
                merged += 1;
            }
            Err(e) => {
                warn!("skipping malformed head-to-head row: {}", e);
            }
        }
    }
    Ok(merged)
}

fn load_lineups_from_reader<R: Read>(rdr: R) -> Result<LineupUsage, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut usage = LineupUsage::default();
    for result in reader.deserialize::<RawLineup>() {
        match result {
            Ok(raw) => {
                let Some(average_slot) = raw.AvgSlot.filter(|slot| slot.is_finite()) else {
                    warn!("skipping lineup for '{}': missing or non-finite slot", raw.Name.trim());
                    continue;
                };
                usage.insert(
                    raw.Name.trim(),
                    raw.Team.trim(),
                    LineupRecord {
                        games: raw.G.unwrap_or(0),
                        average_slot,
                    },
                );
            }
            Err(e) => {
                warn!("skipping malformed lineup row: {}", e);
            }
        }
    }
    Ok(usage)
}

fn load_postseason_from_reader<R: Read>(
    rdr: R,
) -> Result<HashMap<String, PostseasonFinish>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut finishes = HashMap::new();
    for result in reader.deserialize::<RawPostseason>() {
        match result {
            Ok(raw) => {
                let finish = PostseasonFinish::parse(&raw.Finish);
                if finish == PostseasonFinish::Missed && !raw.Finish.trim().is_empty() {
                    debug!("postseason '{}' for '{}' read as missed", raw.Finish.trim(), raw.Team.trim());
                }
                finishes.insert(raw.Team.trim().to_string(), finish);
            }
            Err(e) => {
                warn!("skipping malformed postseason row: {}", e);
            }
        }
    }
    Ok(finishes)
}

fn load_manual_from_reader<R: Read>(rdr: R) -> Result<HashMap<String, ManualInputs>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut manual = HashMap::new();
    for result in reader.deserialize::<RawManual>() {
        match result {
            Ok(raw) => {
                let name = raw.Name.trim().to_string();
                let adjustment = match raw.TSAdjust {
                    Some(v) if v.is_finite() => v,
                    Some(v) => {
                        warn!("TSAdjust for '{}' is not finite ({}); using 0", name, v);
                        0.0
                    }
                    None => 0.0,
                };
                let inputs = ManualInputs {
                    chemistry: manual_score(&name, "Chemistry", raw.Chemistry),
                    team_direction: manual_score(&name, "Direction", raw.Direction),
                    acquisition_cost: parse_acquisition_cost(&raw.DraftRound),
                    team_success_adjustment: adjustment,
                };
                if manual.insert(name.clone(), inputs).is_some() {
                    warn!("duplicate manual entry for '{}', using latest value", name);
                }
            }
            Err(e) => {
                warn!("skipping malformed manual row: {}", e);
            }
        }
    }
    Ok(manual)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, SeasonDataError> {
    std::fs::File::open(path).map_err(|e| SeasonDataError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> SeasonDataError + '_ {
    move |e| SeasonDataError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

pub fn load_players(path: &Path) -> Result<Vec<PlayerSeasonAggregate>, SeasonDataError> {
    load_players_from_reader(open(path)?).map_err(csv_error(path))
}

pub fn load_teams(path: &Path) -> Result<HashMap<String, TeamSeasonAggregate>, SeasonDataError> {
    load_teams_from_reader(open(path)?).map_err(csv_error(path))
}

/// Merge head-to-head records into `teams`; returns the number merged.
pub fn load_head_to_head(
    path: &Path,
    teams: &mut HashMap<String, TeamSeasonAggregate>,
) -> Result<usize, SeasonDataError> {
    load_head_to_head_from_reader(open(path)?, teams).map_err(csv_error(path))
}

pub fn load_lineups(path: &Path) -> Result<LineupUsage, SeasonDataError> {
    load_lineups_from_reader(open(path)?).map_err(csv_error(path))
}

pub fn load_postseason(path: &Path) -> Result<HashMap<String, PostseasonFinish>, SeasonDataError> {
    load_postseason_from_reader(open(path)?).map_err(csv_error(path))
}

pub fn load_manual(path: &Path) -> Result<HashMap<String, ManualInputs>, SeasonDataError> {
    load_manual_from_reader(open(path)?).map_err(csv_error(path))
}

/// Load an optional sheet: unconfigured or absent files yield the default.
fn load_optional<T: Default>(
    config: &Config,
    path: Option<&str>,
    what: &str,
    load: impl FnOnce(&Path) -> Result<T, SeasonDataError>,
) -> Result<T, SeasonDataError> {
    let Some(path) = path else {
        debug!("no {what} file configured");
        return Ok(T::default());
    };
    let resolved = config.resolve(path);
    if !resolved.exists() {
        info!("{what} file {} not found; continuing without it", resolved.display());
        return Ok(T::default());
    }
    load(&resolved)
}

/// Load every season sheet named in the config.
pub fn load_season(config: &Config) -> Result<SeasonInputs, SeasonDataError> {
    let paths = &config.data_paths;
    let players = load_players(&config.resolve(&paths.players))?;
    let mut teams = load_teams(&config.resolve(&paths.teams))?;

    if players.is_empty() {
        return Err(SeasonDataError::Validation(
            "player CSV produced zero valid rows".into(),
        ));
    }
    if teams.is_empty() {
        return Err(SeasonDataError::Validation(
            "team CSV produced zero valid rows".into(),
        ));
    }

    let merged = load_head_to_head(&config.resolve(&paths.head_to_head), &mut teams)?;
    let lineups = load_optional(config, paths.lineups.as_deref(), "lineup", load_lineups)?;
    let postseason =
        load_optional(config, paths.postseason.as_deref(), "postseason", load_postseason)?;
    let manual = load_optional(config, paths.manual.as_deref(), "manual", load_manual)?;

    for player in &players {
        if let Some(team) = player.team_name() {
            if !teams.contains_key(team) {
                warn!("player '{}' is on unknown team '{}'", player.name, team);
            }
        }
    }

    info!(
        "season loaded: {} players, {} teams, {} head-to-head records, {} lineup records, {} manual entries",
        players.len(),
        teams.len(),
        merged,
        lineups.len(),
        manual.len()
    );

    Ok(SeasonInputs {
        players,
        teams,
        postseason,
        lineups,
        manual,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
