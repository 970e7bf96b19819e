use anyhow::Result;
use std::path::{Path, PathBuf};

const DEFAULT_DATA_DIR: &str = "data";
const DATA_DIR_VAR: &str = "CLUSTER_DATA_DIR";

/// Configuration resolved from the command line, `.env` and environment
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    pub fn paths(&self) -> Paths {
        Paths::new(&self.data_dir)
    }
}

/// Load configuration, preferring an explicit data directory over the environment
pub fn load_config(data_dir: Option<PathBuf>) -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();

    let data_dir = match data_dir {
        Some(dir) => dir,
        None => match std::env::var(DATA_DIR_VAR) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            Ok(_) | Err(std::env::VarError::NotPresent) => PathBuf::from(DEFAULT_DATA_DIR),
            Err(e) => return Err(anyhow::anyhow!("Invalid {}: {}", DATA_DIR_VAR, e)),
        },
    };

    Ok(Config { data_dir })
}

/// Every input and output location, derived from the data root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub edges: PathBuf,
    pub metadata: PathBuf,
    pub out_dir: PathBuf,
}

impl Paths {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            edges: data_dir.join("edges").join("edges_thresholded.tsv"),
            metadata: data_dir.join("samples").join("Spotify_Filtered_1k.csv"),
            out_dir: data_dir.join("out"),
        }
    }

    pub fn outcomes(&self) -> PathBuf {
        self.out_dir.join("cluster_outcomes.tsv")
    }

    pub fn outcomes_simple(&self) -> PathBuf {
        self.out_dir.join("cluster_outcomes_simple.tsv")
    }

    pub fn outcomes_plot(&self) -> PathBuf {
        self.out_dir.join("cluster_outcomes_plot.png")
    }

    pub fn dashboard(&self) -> PathBuf {
        self.out_dir.join("cluster_viz_dashboard.png")
    }

    pub fn output(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }
}
