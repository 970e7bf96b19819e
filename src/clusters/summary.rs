use super::loader::ClusterSource;
use super::stats::{PopularityStats, round2};
use crate::models::{ArtistSummary, Edge, JoinedRecord, TrackMetadata};
use anyhow::Result;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Join and aggregation over the edge list and metadata table
pub struct ClusterSummary;

impl ClusterSummary {
    /// Inner join on exact track name equality.
    ///
    /// Every metadata row sharing a track name produces its own joined row, so
    /// the result can hold more rows than there are edges. Edge order is kept.
    pub fn join(edges: &[Edge], metadata: &[TrackMetadata]) -> Vec<JoinedRecord> {
        let mut by_name: HashMap<&str, Vec<u32>> = HashMap::new();
        for row in metadata {
            by_name
                .entry(row.track_name.as_str())
                .or_default()
                .push(row.popularity);
        }

        edges
            .iter()
            .flat_map(|edge| {
                by_name
                    .get(edge.track.as_str())
                    .into_iter()
                    .flatten()
                    .map(move |&popularity| JoinedRecord {
                        artist: edge.artist.clone(),
                        track: edge.track.clone(),
                        popularity,
                    })
            })
            .collect()
    }

    /// Group joined rows by artist, most tracks first, ties by artist name
    pub fn aggregate(joined: &[JoinedRecord]) -> Vec<ArtistSummary> {
        let mut groups: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
        for record in joined {
            groups
                .entry(record.artist.as_str())
                .or_default()
                .push(record.popularity);
        }

        let mut summaries: Vec<ArtistSummary> = groups
            .into_iter()
            .filter_map(|(artist, values)| Self::summarize(artist, &values))
            .collect();

        // Stable sort keeps the ascending artist order among equal counts
        summaries.sort_by(|a, b| b.track_count.cmp(&a.track_count));
        summaries
    }

    fn summarize(artist: &str, values: &[u32]) -> Option<ArtistSummary> {
        Some(ArtistSummary {
            artist: artist.to_string(),
            track_count: values.len(),
            mean_popularity: round2(PopularityStats::mean(values)?),
            median_popularity: round2(PopularityStats::median(values)?),
            std_popularity: PopularityStats::sample_std(values).map(round2),
            min_popularity: *values.iter().min()?,
            max_popularity: *values.iter().max()?,
        })
    }
}

/// Headline figures printed after the summary is written
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryInsights {
    pub total_artists: usize,
    pub total_tracks: usize,
    pub average_tracks_per_artist: f64,
    pub most_tracks: (String, usize),
    pub highest_mean: (String, f64),
    pub lowest_mean: (String, f64),
}

impl SummaryInsights {
    /// `None` when no artist survived the join
    pub fn from_summaries(summaries: &[ArtistSummary]) -> Option<Self> {
        let first = summaries.first()?;
        let total_tracks: usize = summaries.iter().map(|s| s.track_count).sum();

        // First occurrence wins on equal means
        let mut highest = first;
        let mut lowest = first;
        for summary in summaries {
            if summary.mean_popularity > highest.mean_popularity {
                highest = summary;
            }
            if summary.mean_popularity < lowest.mean_popularity {
                lowest = summary;
            }
        }

        Some(Self {
            total_artists: summaries.len(),
            total_tracks,
            average_tracks_per_artist: total_tracks as f64 / summaries.len() as f64,
            most_tracks: (first.artist.clone(), first.track_count),
            highest_mean: (highest.artist.clone(), highest.mean_popularity),
            lowest_mean: (lowest.artist.clone(), lowest.mean_popularity),
        })
    }
}

/// Everything the summary command produces before anything is written
#[derive(Debug)]
pub struct SummaryOutcome {
    pub joined_count: usize,
    pub summaries: Vec<ArtistSummary>,
}

impl SummaryOutcome {
    pub fn insights(&self) -> Option<SummaryInsights> {
        SummaryInsights::from_summaries(&self.summaries)
    }
}

/// Load, join and aggregate from any source
pub fn compute_summary(source: &dyn ClusterSource) -> Result<SummaryOutcome> {
    let edges = source.load_edges()?;
    let metadata = source.load_metadata()?;

    info!("Joining edges with track metadata...");
    let joined = ClusterSummary::join(&edges, &metadata);
    info!("Successfully joined {} records", joined.len());
    let matched: HashSet<&str> = joined.iter().map(|r| r.track.as_str()).collect();
    let unmatched = edges
        .iter()
        .filter(|e| !matched.contains(e.track.as_str()))
        .count();
    debug!(
        "{} distinct tracks matched, {} of {} edges dropped",
        matched.len(),
        unmatched,
        edges.len()
    );
    if joined.is_empty() {
        warn!("No edge matched a metadata track name; outputs will only contain headers");
    }

    info!("Computing summary statistics by artist...");
    let summaries = ClusterSummary::aggregate(&joined);

    Ok(SummaryOutcome {
        joined_count: joined.len(),
        summaries,
    })
}

/// Print the top artists and headline figures to stdout
pub fn print_report(outcome: &SummaryOutcome) {
    println!("Joined records: {}", outcome.joined_count);
    println!("\nTop 10 artists by track count:");
    println!(
        "{:<32} {:>6} {:>8} {:>8} {:>8} {:>5} {:>5}",
        "artist", "count", "mean", "median", "std", "min", "max"
    );
    for summary in outcome.summaries.iter().take(10) {
        let std_display = summary
            .std_popularity
            .map(|s| format!("{s:.2}"))
            .unwrap_or_else(|| "NA".to_string());
        println!(
            "{:<32} {:>6} {:>8.2} {:>8.2} {:>8} {:>5} {:>5}",
            summary.artist,
            summary.track_count,
            summary.mean_popularity,
            summary.median_popularity,
            std_display,
            summary.min_popularity,
            summary.max_popularity
        );
    }

    println!("\n=== SUMMARY INSIGHTS ===");
    match outcome.insights() {
        Some(insights) => {
            println!("Total artists in clusters: {}", insights.total_artists);
            println!("Total tracks in clusters: {}", insights.total_tracks);
            println!(
                "Average tracks per artist: {:.1}",
                insights.average_tracks_per_artist
            );
            println!(
                "Artist with most tracks: {} ({} tracks)",
                insights.most_tracks.0, insights.most_tracks.1
            );
            println!(
                "Highest mean popularity: {:.1} ({})",
                insights.highest_mean.1, insights.highest_mean.0
            );
            println!(
                "Lowest mean popularity: {:.1} ({})",
                insights.lowest_mean.1, insights.lowest_mean.0
            );
        }
        None => println!("No artists in clusters: the join produced no records."),
    }
}
