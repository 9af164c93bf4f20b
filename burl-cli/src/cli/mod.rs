//! Command-line interface orchestration for burl.
//!
//! The CLI offers a `cluster` command that loads a JSON scene description,
//! runs the clustering engine over its seeds, and renders a summary.

mod commands;

pub use commands::{
    Cli, CliError, ClusterCommand, Command, ExecutionSummary, render_summary, run_cli,
};

#[cfg(test)]
mod tests;
