//! trellis-layers - print the dependency layers of one project.
//!
//! Usage: trellis-layers projects.json <ROOT_ID> [--config layers.json] [--max-layers N] [--json]
//!
//! An empty layer map prints nothing in text mode and `{}` with `--json`.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use trellis_core::store::ProjectStore;
use trellis_core::{compute_layers_with, LayerConfig, TrellisError};

/// Print the dependency layers of a project from a datasource export.
#[derive(Debug, Parser)]
#[command(name = "trellis-layers", version, about)]
struct Cli {
    /// JSON array of project rows (`id`, `name`, `dependsOnProjects`)
    projects: PathBuf,

    /// Id of the root project
    root: String,

    /// JSON layer configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many layers (overrides the config file)
    #[arg(long)]
    max_layers: Option<NonZeroUsize>,

    /// Emit the layer map as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn layer_config(&self) -> anyhow::Result<LayerConfig> {
        let mut config = match &self.config {
            Some(path) => LayerConfig::load(path)
                .with_context(|| format!("loading layer config {}", path.display()))?,
            None => LayerConfig::default(),
        };
        if let Some(max_layers) = self.max_layers {
            config = config.with_max_layers(max_layers);
        }
        Ok(config)
    }
}

/// Compute the layers for `cli` and render them.
fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = cli.layer_config()?;

    let store = ProjectStore::load(&cli.projects)
        .with_context(|| format!("loading projects from {}", cli.projects.display()))?;
    info!(projects = store.len(), "projects loaded");

    let snapshot = store.snapshot();
    let root = snapshot
        .get(&cli.root)
        .ok_or_else(|| TrellisError::UnknownProject {
            id: cli.root.as_str().into(),
        })?;

    let layers = compute_layers_with(root, &snapshot, &config);
    info!(root = %root.id, layers = layers.layer_count(), "layers computed");

    if cli.json {
        Ok(serde_json::to_string_pretty(&layers)?)
    } else {
        Ok(layers.to_string())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = run(&cli)?;
    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    const PROJECTS: &str = r#"[
        {"id": "api", "dependsOnProjects": ["db", "auth"]},
        {"id": "db", "dependsOnProjects": ["storage"]},
        {"id": "auth", "dependsOnProjects": ["db"]},
        {"id": "storage"},
        {"id": "docs"}
    ]"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn cli(projects: &Path, args: &[&str]) -> Cli {
        let mut argv = vec!["trellis-layers", projects.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn prints_layers_as_text() {
        let dir = TempDir::new().unwrap();
        let projects = write(&dir, "projects.json", PROJECTS);

        let output = run(&cli(&projects, &["api"])).unwrap();
        assert_eq!(output, "Layer 1: db, auth\nLayer 2: storage");
    }

    #[test]
    fn prints_layers_as_json() {
        let dir = TempDir::new().unwrap();
        let projects = write(&dir, "projects.json", PROJECTS);

        let output = run(&cli(&projects, &["api", "--json"])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["1"][0]["id"], "db");
        assert_eq!(json["1"][1]["id"], "auth");
        assert_eq!(json["2"][0]["id"], "storage");
    }

    #[test]
    fn root_without_dependencies_prints_nothing() {
        let dir = TempDir::new().unwrap();
        let projects = write(&dir, "projects.json", PROJECTS);

        assert_eq!(run(&cli(&projects, &["docs"])).unwrap(), "");
        assert_eq!(run(&cli(&projects, &["docs", "--json"])).unwrap(), "{}");
    }

    #[test]
    fn unknown_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let projects = write(&dir, "projects.json", PROJECTS);

        let err = run(&cli(&projects, &["ghost"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrellisError>(),
            Some(TrellisError::UnknownProject { id }) if id.as_str() == "ghost"
        ));
    }

    #[test]
    fn max_layers_flag_overrides_config_file() {
        let dir = TempDir::new().unwrap();
        let projects = write(&dir, "projects.json", PROJECTS);
        let config = write(&dir, "layers.json", r#"{"maxLayers": 2}"#);
        let config = config.to_str().unwrap();

        let from_file = run(&cli(&projects, &["api", "--config", config])).unwrap();
        assert_eq!(from_file, "Layer 1: db, auth\nLayer 2: storage");

        let overridden =
            run(&cli(&projects, &["api", "--config", config, "--max-layers", "1"])).unwrap();
        assert_eq!(overridden, "Layer 1: db, auth");
    }

    #[test]
    fn missing_projects_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.json");

        let err = run(&cli(&missing, &["api"])).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }
}
