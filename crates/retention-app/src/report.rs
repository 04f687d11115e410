// Report rendering: plain-text table, CSV or JSON.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

use retention_core::grade::GradeBreakdown;
use retention_core::qualification::QualificationCutoffs;
use retention_core::standings::StandingEntry;
use retention_core::SeasonGrades;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned plain-text table
    #[default]
    Table,
    /// One row per player
    Csv,
    /// Full breakdowns with traces
    Json,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Order breakdowns by team, then player name. Free agents sort last.
pub fn sort_grades(grades: &mut [GradeBreakdown]) {
    grades.sort_by(|a, b| {
        let team = |g: &GradeBreakdown| (g.team.is_none(), g.team.clone().unwrap_or_default());
        team(a).cmp(&team(b)).then_with(|| a.player.cmp(&b.player))
    });
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

fn flags(g: &GradeBreakdown) -> String {
    let mut out = Vec::new();
    if g.performance.auto_flag_penalty != 0.0 {
        out.push(format!("flag {:+}", g.performance.auto_flag_penalty));
    }
    if g.performance.expectation_mod != 0.0 {
        out.push(format!("draft {:+}", g.performance.expectation_mod));
    }
    if g.play_time.estimated_usage {
        out.push("est. usage".to_string());
    }
    out.join(", ")
}

pub fn render_table(grades: &[GradeBreakdown]) -> String {
    let name_w = grades
        .iter()
        .map(|g| g.player.chars().count())
        .max()
        .unwrap_or(0)
        .max("Player".len());
    let team_w = grades
        .iter()
        .map(|g| g.team.as_deref().map_or(1, |t| t.chars().count()))
        .max()
        .unwrap_or(0)
        .max("Team".len());

    let mut out = format!(
        "{:<team_w$}  {:<name_w$}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}  Notes\n",
        "Team", "Player", "TS", "PT", "PERF", "CHEM", "DIR", "GRADE"
    );
    for g in grades {
        let f = &g.factors;
        out.push_str(&format!(
            "{:<team_w$}  {:<name_w$}  {:>5.1}  {:>5.1}  {:>5.1}  {:>5.1}  {:>5.1}  {:>5}  {}\n",
            g.team.as_deref().unwrap_or("-"),
            g.player,
            f.team_success,
            f.play_time,
            f.performance,
            f.chemistry,
            f.team_direction,
            g.grade,
            flags(g)
        ));
    }
    out
}

pub fn render_standings(standings: &[StandingEntry]) -> String {
    let team_w = standings
        .iter()
        .map(|s| s.team.chars().count())
        .max()
        .unwrap_or(0)
        .max("Team".len());
    let mut out = format!(
        "{:>4}  {:<team_w$}  {:>3}  {:>3}  {:>5}  {:>5}  {:>4}\n",
        "Rank", "Team", "W", "L", "PCT", "H2H", "RD"
    );
    for s in standings {
        out.push_str(&format!(
            "{:>4}  {:<team_w$}  {:>3}  {:>3}  {:>5.3}  {:>5.3}  {:>+4}\n",
            s.display, s.team, s.wins, s.losses, s.win_pct, s.head_to_head_pct, s.run_differential
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    team: &'a str,
    player: &'a str,
    standing: Option<u32>,
    team_success: f64,
    play_time: f64,
    performance: f64,
    offensive_percentile: Option<f64>,
    auto_flag: f64,
    draft_expectation: f64,
    chemistry: f64,
    team_direction: f64,
    grade: i32,
    trace: &'a str,
}

pub fn write_csv<W: Write>(grades: &[GradeBreakdown], out: W) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(out);
    for g in grades {
        writer.serialize(CsvRow {
            team: g.team.as_deref().unwrap_or(""),
            player: &g.player,
            standing: g.team_success.standing,
            team_success: g.factors.team_success,
            play_time: g.factors.play_time,
            performance: g.factors.performance,
            offensive_percentile: g.performance.offensive_percentile,
            auto_flag: g.performance.auto_flag_penalty,
            draft_expectation: g.performance.expectation_mod,
            chemistry: g.factors.chemistry,
            team_direction: g.factors.team_direction,
            grade: g.grade,
            trace: &g.trace,
        })?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub league: &'a str,
    pub generated_at: DateTime<Utc>,
    pub cutoffs: &'a QualificationCutoffs,
    pub standings: &'a [StandingEntry],
    pub grades: &'a [GradeBreakdown],
}

pub fn write_json<W: Write>(
    league: &str,
    season: &SeasonGrades,
    mut out: W,
) -> Result<(), ReportError> {
    let report = JsonReport {
        league,
        generated_at: Utc::now(),
        cutoffs: &season.cutoffs,
        standings: &season.standings,
        grades: &season.grades,
    };
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    Ok(())
}

/// Write the season report in `format`. Grades are expected to be sorted.
pub fn write_report<W: Write>(
    format: OutputFormat,
    league: &str,
    season: &SeasonGrades,
    mut out: W,
) -> Result<(), ReportError> {
    match format {
        OutputFormat::Table => {
            writeln!(out, "{league}\n")?;
            out.write_all(render_table(&season.grades).as_bytes())?;
        }
        OutputFormat::Csv => write_csv(&season.grades, out)?,
        OutputFormat::Json => write_json(league, season, out)?,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
