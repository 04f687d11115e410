// Library root for the retention grading engine. Pure computation over
// already-aggregated season data; no I/O.

pub mod config;
pub mod engine;
pub mod factors;
pub mod grade;
pub mod model;
pub mod modifiers;
pub mod percentile;
pub mod postseason;
pub mod qualification;
pub mod standings;
pub mod stat_pool;
pub mod tiers;

pub use config::{ConfigError, EngineConfig};
pub use engine::{grade_season, GradingContext, ManualInputs, SeasonGrades, SeasonInputs};
pub use grade::GradeBreakdown;
