use serde::{Deserialize, Serialize};

/// An observed (artist, track) association from the thresholded edge list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub artist: String,
    pub track: String,
}

impl Edge {
    pub fn new(artist: impl Into<String>, track: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            track: track.into(),
        }
    }
}

/// One row of the Spotify metadata table.
///
/// Only the columns the pipelines consume are deserialized; the csv reader
/// skips every other header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub track_name: String,
    pub popularity: u32, // 0-100
}

impl TrackMetadata {
    #[cfg(test)]
    pub fn new(track_name: impl Into<String>, popularity: u32) -> Self {
        Self {
            track_name: track_name.into(),
            popularity,
        }
    }
}

/// Result of joining an edge with one matching metadata row
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub artist: String,
    pub track: String,
    pub popularity: u32,
}

/// Per-artist popularity statistics, every float rounded to two decimals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistSummary {
    pub artist: String,
    pub track_count: usize,
    pub mean_popularity: f64,
    pub median_popularity: f64,
    pub std_popularity: Option<f64>, // undefined for single-track artists
    pub min_popularity: u32,
    pub max_popularity: u32,
}

/// An artist selected for visualization together with its edge count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedArtist {
    pub artist: String,
    pub edge_count: usize,
}
