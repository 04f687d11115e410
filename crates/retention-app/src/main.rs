// Retention grader entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, so stdout stays clean for reports)
// 2. Parse the command line
// 3. Load config (copying defaults on first run)
// 4. Load season data
// 5. Grade or rank, then write the report

use retention::cli::{Cli, Commands};
use retention::config;
use retention::report;
use retention::season;
use retention_core::standings::compute_standings;

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;

    // 2. Parse the command line
    let cli = Cli::parse();

    match cli.command {
        Commands::Grade {
            base_dir,
            format,
            output,
            team,
        } => run_grade(&base_dir, format, output, team),
        Commands::Standings { base_dir } => run_standings(&base_dir),
    }
}

fn load(base_dir: &Path) -> anyhow::Result<(config::Config, retention_core::SeasonInputs)> {
    // 3. Load config
    let copied = config::ensure_config_files(base_dir)
        .context("failed to initialize configuration")?;
    for path in &copied {
        info!("Copied default config to {}", path.display());
    }
    let config = config::load_config_from(base_dir).context("failed to load configuration")?;
    info!("Config loaded: league={}", config.league_name);

    // 4. Load season data
    let season = season::load_season(&config).context("failed to load season data")?;
    Ok((config, season))
}

fn run_grade(
    base_dir: &Path,
    format: Option<report::OutputFormat>,
    output: Option<PathBuf>,
    team: Option<String>,
) -> anyhow::Result<()> {
    let (config, season) = load(base_dir)?;

    // 5. Grade and write the report
    let mut grades = retention_core::grade_season(&season, &config.engine)
        .context("invalid grading configuration")?;
    if let Some(team) = &team {
        grades.grades.retain(|g| g.team.as_deref() == Some(team.as_str()));
        if grades.grades.is_empty() {
            anyhow::bail!("no graded players on team '{team}'");
        }
    }
    report::sort_grades(&mut grades.grades);

    let format = format.unwrap_or(config.output.format);
    match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            report::write_report(format, &config.league_name, &grades, BufWriter::new(file))
                .context("failed to write report")?;
            info!("Report written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            report::write_report(format, &config.league_name, &grades, stdout.lock())
                .context("failed to write report")?;
        }
    }
    Ok(())
}

fn run_standings(base_dir: &Path) -> anyhow::Result<()> {
    let (config, season) = load(base_dir)?;
    let standings = compute_standings(&season.sorted_teams());

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}\n", config.league_name)?;
    stdout.write_all(report::render_standings(&standings).as_bytes())?;
    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default filter.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("retention=info,retention_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
