//! Command implementations and argument parsing for the burl CLI.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use burl_core::{Cluster, ClusterError, SeedClusterer};
use burl_providers_scene::{Scene, SceneError};
use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "burl", about = "Cluster alignment seeds over a snarl decomposition.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster the seeds described by a scene file.
    Cluster(ClusterCommand),
}

/// Options accepted by the `cluster` command.
#[derive(Debug, Args, Clone)]
pub struct ClusterCommand {
    /// Path to a JSON scene description.
    pub scene: PathBuf,

    /// Maximum distance between seeds of one read in a cluster.
    #[arg(long = "read-limit")]
    pub read_limit: usize,

    /// Maximum distance for fragment clustering; `0` disables it.
    #[arg(long = "fragment-limit", default_value_t = 0)]
    pub fragment_limit: usize,

    /// Override name for the scene (defaults to the description's name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading the scene.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Scene parsing or compilation failed.
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// The clustering engine rejected the request.
    #[error(transparent)]
    Core(#[from] ClusterError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the scene that was clustered.
    pub scene: String,
    /// Clusters per read, in read order.
    pub per_read: Vec<Vec<Cluster>>,
    /// Fragment-level clusters; empty when fragment clustering was off.
    pub fragments: Vec<Cluster>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, parsing, or clustering fails.
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Cluster(command) => {
            Span::current().record("command", field::display("cluster"));
            cluster_command(command)
        }
    }
}

#[instrument(
    name = "cli.cluster",
    err,
    skip(command),
    fields(scene = field::Empty, read_limit = field::Empty, fragment_limit = field::Empty),
)]
pub(super) fn cluster_command(command: ClusterCommand) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    span.record("scene", field::display(command.scene.display()));
    span.record("read_limit", field::display(command.read_limit));
    span.record("fragment_limit", field::display(command.fragment_limit));

    let input = fs::read_to_string(&command.scene).map_err(|source| CliError::Io {
        path: command.scene.clone(),
        source,
    })?;
    let scene = Scene::from_json(&input)?;
    let clusterer = SeedClusterer::new(&scene, &scene);
    let mut reads = scene.seeds();

    let (per_read, fragments) = if reads.len() == 1 && command.fragment_limit == 0 {
        let clusters = clusterer.cluster_seeds(&mut reads[0], command.read_limit)?;
        (vec![clusters], Vec::new())
    } else {
        clusterer.cluster_fragment(&mut reads, command.read_limit, command.fragment_limit)?
    };

    let name = command.name.unwrap_or_else(|| scene.name().to_owned());
    info!(
        scene = name.as_str(),
        reads = per_read.len(),
        fragments = fragments.len(),
        "clustering completed"
    );
    Ok(ExecutionSummary {
        scene: name,
        per_read,
        fragments,
    })
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "scene: {}", summary.scene)?;
    for (read, clusters) in summary.per_read.iter().enumerate() {
        writeln!(writer, "read {read}: {} clusters", clusters.len())?;
        render_clusters(clusters, &mut writer)?;
    }
    if !summary.fragments.is_empty() {
        writeln!(writer, "fragment: {} clusters", summary.fragments.len())?;
        render_clusters(&summary.fragments, &mut writer)?;
    }
    Ok(())
}

fn render_clusters(clusters: &[Cluster], mut writer: impl Write) -> io::Result<()> {
    for (index, cluster) in clusters.iter().enumerate() {
        writeln!(
            writer,
            "  {index}\tseeds {:?}\tscore {:.1}\tcoverage {:.2}",
            cluster.seeds(),
            cluster.score(),
            cluster.coverage(),
        )?;
    }
    Ok(())
}
