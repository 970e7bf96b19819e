use crate::config::Paths;
use crate::models::{Edge, TrackMetadata};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const EDGE_COLUMNS: usize = 2;

/// Where the pipelines get their input tables from
#[cfg_attr(test, mockall::automock)]
pub trait ClusterSource {
    fn load_edges(&self) -> Result<Vec<Edge>>;
    fn load_metadata(&self) -> Result<Vec<TrackMetadata>>;
}

/// Reads the edge list and metadata table from disk
pub struct FileSource {
    edges_path: PathBuf,
    metadata_path: PathBuf,
}

impl FileSource {
    pub fn new(paths: &Paths) -> Self {
        Self {
            edges_path: paths.edges.clone(),
            metadata_path: paths.metadata.clone(),
        }
    }
}

impl ClusterSource for FileSource {
    fn load_edges(&self) -> Result<Vec<Edge>> {
        info!("Reading thresholded edges from {}", self.edges_path.display());
        EdgeLoader::load(&self.edges_path)
    }

    fn load_metadata(&self) -> Result<Vec<TrackMetadata>> {
        info!("Reading Spotify dataset from {}", self.metadata_path.display());
        MetadataLoader::load(&self.metadata_path)
    }
}

/// Headerless, tab-separated (artist, track) pairs
pub struct EdgeLoader;

impl EdgeLoader {
    pub fn load(path: &Path) -> Result<Vec<Edge>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open edge list {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("Failed to parse edge list {}", path.display()))
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Vec<Edge>> {
        let reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(rdr);
        Self::read(reader)
    }

    fn read<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<Edge>> {
        let mut edges = Vec::new();
        for record in reader.records() {
            let record = record?;
            // Column count is checked here rather than by the reader so the error names the row
            if record.len() != EDGE_COLUMNS {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                return Err(anyhow::anyhow!(
                    "line {}: expected {} tab-separated columns, found {}",
                    line,
                    EDGE_COLUMNS,
                    record.len()
                ));
            }
            edges.push(Edge::new(&record[0], &record[1]));
        }
        debug!("Loaded {} edges", edges.len());
        Ok(edges)
    }
}

/// Comma-separated metadata table with a header row
pub struct MetadataLoader;

impl MetadataLoader {
    pub fn load(path: &Path) -> Result<Vec<TrackMetadata>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open metadata table {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("Failed to parse metadata table {}", path.display()))
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Vec<TrackMetadata>> {
        Self::read(ReaderBuilder::new().from_reader(rdr))
    }

    fn read<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<TrackMetadata>> {
        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<TrackMetadata>, csv::Error>>()?;
        debug!("Loaded {} metadata rows", rows.len());
        Ok(rows)
    }
}
