use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use super::error::Error;
use common::numeric_kernel::DEFAULT_SINGULAR_EPSILON;
use common::types::DuplicateEdges;
use mason_solver_core::SolverLimits;

/// Environment variable overriding the configuration file location.
const CONFIG_PATH_VAR: &str = "MASON_CONFIG";

#[derive(Debug, Deserialize, Clone)]
pub struct SolverConfig {
    #[serde(default)]
    pub limits: SolverLimits,
    #[serde(default = "default_singular_epsilon")]
    pub singular_epsilon: f64,
    #[serde(default)]
    pub duplicate_edges: DuplicateEdges,
    #[serde(default)]
    pub diagnostics: bool,
}

fn default_singular_epsilon() -> f64 {
    DEFAULT_SINGULAR_EPSILON
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    pub graphs: usize,
    pub stages: usize,
    pub skip_edges: usize,
    pub feedback_edges: usize,
    pub min_gain: f64,
    pub max_gain: f64,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExecutorConfig {
    pub buffer_size: usize,
    pub max_concurrent_solves: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub solver: SolverConfig,
    pub simulator: SimulatorConfig,
    pub executor: ExecutorConfig,
}

/// Loads configuration from `MASON_CONFIG`, or `crates/executor/Config.toml`
/// under the working directory, layered with `MASON_*` environment variables.
pub fn load_config() -> Result<Config, Error> {
    let config_file_path = match env::var_os(CONFIG_PATH_VAR) {
        Some(path) => PathBuf::from(path),
        None => {
            let base_path = env::current_dir().map_err(|e| {
                Error::ConfigLoadError(format!("Failed to determine current directory: {}", e))
            })?;
            base_path.join("crates").join("executor").join("Config.toml")
        }
    };

    load_config_from(&config_file_path)
}

/// Loads configuration from `path`; `MASON_<SECTION>__<KEY>` variables
/// override file values (e.g. `MASON_SOLVER__LIMITS__MAX_LOOPS=500`).
pub fn load_config_from(path: &Path) -> Result<Config, Error> {
    if !path.exists() {
        return Err(Error::ConfigLoadError(format!(
            "Configuration file not found at calculated path: {}",
            path.display()
        )));
    }

    let s = ConfigLoader::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("MASON")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?;

    let app_config: Config = s
        .try_deserialize()
        .map_err(|e| Error::ConfigLoadError(format!("Failed to deserialize config: {}", e)))?;

    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const FULL_CONFIG: &str = r#"
[solver]
singular_epsilon = 1e-8
duplicate_edges = "sum"
diagnostics = true

[solver.limits]
max_loops = 50
deadline_ms = 250

[simulator]
graphs = 2
stages = 5
skip_edges = 1
feedback_edges = 2
min_gain = 0.1
max_gain = 0.9
seed = 7

[executor]
buffer_size = 4
max_concurrent_solves = 2
"#;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write config");
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(FULL_CONFIG);
        let config = load_config_from(file.path()).expect("Config should load");

        assert_eq!(config.solver.singular_epsilon, 1e-8);
        assert_eq!(config.solver.duplicate_edges, DuplicateEdges::Sum);
        assert!(config.solver.diagnostics);
        assert_eq!(config.solver.limits.max_loops, 50);
        assert_eq!(config.solver.limits.deadline_ms, Some(250));
        // Unset limits fall back to their defaults.
        assert_eq!(
            config.solver.limits.max_nodes,
            SolverLimits::default().max_nodes
        );
        assert_eq!(config.simulator.seed, Some(7));
        assert_eq!(config.executor.max_concurrent_solves, 2);
    }

    #[test]
    fn test_solver_section_defaults() {
        let file = write_config(
            r#"
[solver]

[simulator]
graphs = 1
stages = 3
skip_edges = 0
feedback_edges = 0
min_gain = 1.0
max_gain = 2.0

[executor]
buffer_size = 1
max_concurrent_solves = 1
"#,
        );
        let config = load_config_from(file.path()).expect("Config should load");

        assert_eq!(config.solver.singular_epsilon, DEFAULT_SINGULAR_EPSILON);
        assert_eq!(config.solver.duplicate_edges, DuplicateEdges::Replace);
        assert_eq!(config.solver.limits, SolverLimits::default());
        assert_eq!(config.simulator.seed, None);
    }

    #[test]
    fn test_missing_config_file() {
        let result = load_config_from(Path::new("does/not/exist/Config.toml"));

        assert!(matches!(result, Err(Error::ConfigLoadError(_))));
    }
}
