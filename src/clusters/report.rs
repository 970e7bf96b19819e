use crate::models::ArtistSummary;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Written in place of an undefined standard deviation
pub const UNDEFINED: &str = "NA";

pub const FULL_HEADER: [&str; 7] = [
    "artist",
    "track_count",
    "mean_popularity",
    "median_popularity",
    "std_popularity",
    "min_popularity",
    "max_popularity",
];

pub const SIMPLE_HEADER: [&str; 4] = ["artist", "count", "mean", "median"];

/// Shortest representation that still reads as a float: `60.0`, `61.33`
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// TSV writers for the artist summary
pub struct ReportWriter;

impl ReportWriter {
    /// Seven-column report with every statistic
    pub fn write_full<W: Write>(out: W, summaries: &[ArtistSummary]) -> Result<()> {
        let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(out);
        writer.write_record(FULL_HEADER)?;
        for s in summaries {
            writer.write_record([
                s.artist.clone(),
                s.track_count.to_string(),
                format_float(s.mean_popularity),
                format_float(s.median_popularity),
                s.std_popularity
                    .map(format_float)
                    .unwrap_or_else(|| UNDEFINED.to_string()),
                s.min_popularity.to_string(),
                s.max_popularity.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Four-column report: artist, count, mean, median
    pub fn write_simple<W: Write>(out: W, summaries: &[ArtistSummary]) -> Result<()> {
        let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(out);
        writer.write_record(SIMPLE_HEADER)?;
        for s in summaries {
            writer.write_record([
                s.artist.clone(),
                s.track_count.to_string(),
                format_float(s.mean_popularity),
                format_float(s.median_popularity),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Overwrite both report files, creating their directory if needed
    pub fn write_files(
        full_path: &Path,
        simple_path: &Path,
        summaries: &[ArtistSummary],
    ) -> Result<()> {
        for path in [full_path, simple_path] {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }

        let file = std::fs::File::create(full_path)
            .with_context(|| format!("Failed to create {}", full_path.display()))?;
        Self::write_full(file, summaries)
            .with_context(|| format!("Failed to write {}", full_path.display()))?;
        info!("Summary statistics saved to {}", full_path.display());

        let file = std::fs::File::create(simple_path)
            .with_context(|| format!("Failed to create {}", simple_path.display()))?;
        Self::write_simple(file, summaries)
            .with_context(|| format!("Failed to write {}", simple_path.display()))?;
        info!("Simplified summary statistics saved to {}", simple_path.display());

        Ok(())
    }
}
