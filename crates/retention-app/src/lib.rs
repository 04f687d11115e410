// Library root: configuration, season loading and report output for the
// `retention` binary. Exposed so integration tests can drive the pipeline.

pub mod cli;
pub mod config;
pub mod report;
pub mod season;
