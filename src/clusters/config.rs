use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resolution of every raster written by the renderers
pub const DPI: u32 = 300;

/// Seed shared by track sampling, spring layout and label selection
pub const DEFAULT_SEED: u64 = 42;

/// Configuration for one network visualization variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkVizConfig {
    pub name: String,        // Title shown on the rendering
    pub output_file: String, // File name inside the output directory
    pub top_n: usize,        // Number of artists to keep, ranked by edge count
    #[serde(default)]
    pub sample_per_artist: Option<usize>, // None keeps every edge of a selected artist
    pub layout: LayoutSettings,
    pub figure: FigureSettings,
    #[serde(default)]
    pub track_labels: usize, // Number of randomly chosen track nodes to label
}

/// Spring layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    pub k: f64, // Optimal distance between nodes (repulsion constant)
    pub iterations: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Canvas and node styling, sizes in inches and points as in a print figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSettings {
    pub width_in: f64,
    pub height_in: f64,
    pub artist_node_size: f64,
    pub track_node_size: f64,
    pub artist_font_size: f64,
    pub title_font_size: f64,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl FigureSettings {
    /// Pixel dimensions at the shared DPI
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * DPI as f64).round() as u32,
            (self.height_in * DPI as f64).round() as u32,
        )
    }
}

impl NetworkVizConfig {
    /// Load visualization variants directly from a JSON array file
    pub fn load_all_from_file(path: &Path) -> Result<Vec<NetworkVizConfig>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read visualization config {}", path.display()))?;
        let configs: Vec<NetworkVizConfig> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid visualization config {}", path.display()))?;
        for config in &configs {
            config
                .validate()
                .with_context(|| format!("Invalid visualization config {}", path.display()))?;
        }
        Ok(configs)
    }

    /// Reject settings the layout and renderer cannot draw
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            bail!("variant '{}': top_n must be at least 1", self.name);
        }
        if self.sample_per_artist == Some(0) {
            bail!("variant '{}': sample_per_artist must be at least 1", self.name);
        }
        if !(self.layout.k.is_finite() && self.layout.k > 0.0) {
            bail!(
                "variant '{}': layout.k must be a positive number, got {}",
                self.name,
                self.layout.k
            );
        }
        let figure = &self.figure;
        for (field, value) in [("width_in", figure.width_in), ("height_in", figure.height_in)] {
            if !(value.is_finite() && value > 0.0) {
                bail!(
                    "variant '{}': figure.{} must be a positive number, got {}",
                    self.name,
                    field,
                    value
                );
            }
        }
        Ok(())
    }

    /// Top 20 artists, every edge kept
    pub fn full() -> Self {
        Self {
            name: "Spotify Artist-Track Network Visualization (Top 20 Artists by Track Count)"
                .to_string(),
            output_file: "cluster_viz.png".to_string(),
            top_n: 20,
            sample_per_artist: None,
            layout: LayoutSettings {
                k: 3.0,
                iterations: 50,
                seed: DEFAULT_SEED,
            },
            figure: FigureSettings {
                width_in: 15.0,
                height_in: 12.0,
                artist_node_size: 100.0,
                track_node_size: 20.0,
                artist_font_size: 8.0,
                title_font_size: 16.0,
            },
            track_labels: 0,
        }
    }

    /// Top 5 artists for a more readable view
    pub fn small() -> Self {
        Self {
            name: "Spotify Artist-Track Network (Top 5 Artists)".to_string(),
            output_file: "cluster_viz_small.png".to_string(),
            top_n: 5,
            sample_per_artist: None,
            layout: LayoutSettings {
                k: 2.0,
                iterations: 50,
                seed: DEFAULT_SEED,
            },
            figure: FigureSettings {
                width_in: 12.0,
                height_in: 10.0,
                artist_node_size: 200.0,
                track_node_size: 30.0,
                artist_font_size: 10.0,
                title_font_size: 14.0,
            },
            track_labels: 0,
        }
    }

    /// Top 3 artists with at most 20 sampled tracks each
    pub fn clean() -> Self {
        Self {
            name: "Spotify Artist-Track Network (Top 3 Artists) - Clean Visualization".to_string(),
            output_file: "cluster_viz_clean.png".to_string(),
            top_n: 3,
            sample_per_artist: Some(20),
            layout: LayoutSettings {
                k: 4.0,
                iterations: 100,
                seed: DEFAULT_SEED,
            },
            figure: FigureSettings {
                width_in: 16.0,
                height_in: 12.0,
                artist_node_size: 800.0,
                track_node_size: 100.0,
                artist_font_size: 14.0,
                title_font_size: 18.0,
            },
            track_labels: 10,
        }
    }

    /// The variants rendered by the `network` command
    pub fn network_defaults() -> Vec<NetworkVizConfig> {
        vec![Self::full(), Self::small()]
    }
}
