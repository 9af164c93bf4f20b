//! Tests for CLI command execution and summary rendering.

use std::io::Cursor;
use std::path::PathBuf;

use burl_test_support::logging::init_test_logging;
use tempfile::NamedTempFile;

use super::{Cli, CliError, ClusterCommand, Command, render_summary, run_cli};

const SINGLE_READ_SCENE: &str = r#"{
    "name": "demo",
    "nodes": [{"id": 1, "length": 200}],
    "reads": [[
        {"node": 1, "offset": 10, "source": 0},
        {"node": 1, "offset": 15, "source": 1},
        {"node": 1, "offset": 100, "source": 2}
    ]]
}"#;

const PAIRED_SCENE: &str = r#"{
    "name": "paired",
    "nodes": [{"id": 1, "length": 200}],
    "reads": [
        [{"node": 1, "offset": 10, "source": 0}, {"node": 1, "offset": 100, "source": 1}],
        [{"node": 1, "offset": 15, "source": 0}]
    ]
}"#;

fn scene_file(contents: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file must be created");
    std::fs::write(file.path(), contents).expect("scene must be written");
    file
}

fn cluster_cli(path: PathBuf, read_limit: usize, fragment_limit: usize) -> Cli {
    Cli {
        command: Command::Cluster(ClusterCommand {
            scene: path,
            read_limit,
            fragment_limit,
            name: None,
        }),
    }
}

#[test]
fn clusters_a_single_read_scene() {
    init_test_logging();
    let file = scene_file(SINGLE_READ_SCENE);
    let summary = run_cli(cluster_cli(file.path().to_path_buf(), 10, 0))
        .expect("command must succeed");
    assert_eq!(summary.scene, "demo");
    assert_eq!(summary.per_read.len(), 1);
    assert_eq!(summary.per_read[0].len(), 2);
    assert!(summary.fragments.is_empty());
}

#[test]
fn clusters_a_paired_scene_with_fragments() {
    init_test_logging();
    let file = scene_file(PAIRED_SCENE);
    let summary = run_cli(cluster_cli(file.path().to_path_buf(), 10, 90))
        .expect("command must succeed");
    assert_eq!(summary.per_read.len(), 2);
    assert_eq!(summary.per_read[0].len(), 2);
    assert_eq!(summary.per_read[1].len(), 1);
    assert_eq!(summary.fragments.len(), 1);
}

#[test]
fn overrides_the_scene_name() {
    init_test_logging();
    let file = scene_file(SINGLE_READ_SCENE);
    let cli = Cli {
        command: Command::Cluster(ClusterCommand {
            scene: file.path().to_path_buf(),
            read_limit: 10,
            fragment_limit: 0,
            name: Some("renamed".to_owned()),
        }),
    };
    let summary = run_cli(cli).expect("command must succeed");
    assert_eq!(summary.scene, "renamed");
}

#[test]
fn reports_missing_scene_files() {
    init_test_logging();
    let err = run_cli(cluster_cli(PathBuf::from("/no/such/scene.json"), 10, 0))
        .expect_err("missing file must fail");
    assert!(matches!(err, CliError::Io { .. }));
}

#[test]
fn reports_malformed_scenes() {
    init_test_logging();
    let file = scene_file("{ not json }");
    let err = run_cli(cluster_cli(file.path().to_path_buf(), 10, 0))
        .expect_err("malformed scene must fail");
    assert!(matches!(err, CliError::Scene(_)));
}

#[test]
fn renders_reads_and_fragments() {
    init_test_logging();
    let file = scene_file(PAIRED_SCENE);
    let summary = run_cli(cluster_cli(file.path().to_path_buf(), 10, 90))
        .expect("command must succeed");
    let mut buffer = Cursor::new(Vec::new());
    render_summary(&summary, &mut buffer).expect("rendering must succeed");
    let output = String::from_utf8(buffer.into_inner()).expect("output must be UTF-8");
    assert!(output.starts_with("scene: paired\n"));
    assert!(output.contains("read 0: 2 clusters"));
    assert!(output.contains("read 1: 1 clusters"));
    assert!(output.contains("fragment: 1 clusters"));
}
