use super::config::{DPI, NetworkVizConfig};
use super::graph::{BipartiteGraph, Partition};
use super::layout::{Position, bipartite_rows};
use crate::models::{ArtistSummary, Edge};
use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
const DARK_BLUE: RGBColor = RGBColor(0, 0, 139);
const GREY: RGBColor = RGBColor(128, 128, 128);
const BAR_COLORS: [RGBColor; 3] = [RED, BLUE, GREEN];
const HISTOGRAM_BINS: usize = 20;
const TOP_BARS: usize = 15;
const TRACK_LIST_LEN: usize = 15;

/// Convert a print size in points to pixels at the shared DPI
fn pt(points: f64) -> f64 {
    points * DPI as f64 / 72.0
}

fn font(points: f64) -> FontDesc<'static> {
    ("sans-serif", pt(points)).into()
}

/// Marker radius in pixels for a node size given as an area in points squared
pub fn marker_radius(area: f64) -> i32 {
    (pt(area.max(0.0).sqrt() / 2.0)).round().max(1.0) as i32
}

fn prepare(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

/// Draw a spring-laid-out artist-track graph
pub fn render_network(
    path: &Path,
    graph: &BipartiteGraph,
    positions: &[Position],
    labelled_tracks: &[usize],
    viz: &NetworkVizConfig,
) -> Result<()> {
    prepare(path)?;
    let figure = &viz.figure;
    let root = BitMapBackend::new(path, figure.pixel_size()).into_drawing_area();
    root.fill(&WHITE)?;

    let title_font = font(figure.title_font_size).style(FontStyle::Bold);
    let mut chart = ChartBuilder::on(&root)
        .caption(&viz.name, title_font)
        .margin(pt(12.0) as u32)
        .build_cartesian_2d(-1.1f64..1.1f64, -1.1f64..1.1f64)?;

    if graph.is_empty() {
        root.present()?;
        return Ok(());
    }

    let edge_width = if viz.sample_per_artist.is_some() { 1.5 } else { 0.5 };
    chart.draw_series(graph.edges().iter().map(|&(a, t)| {
        PathElement::new(
            vec![positions[a], positions[t]],
            GREY.mix(0.5).stroke_width(pt(edge_width).round().max(1.0) as u32),
        )
    }))?;

    let track_radius = marker_radius(figure.track_node_size);
    chart
        .draw_series(
            graph
                .nodes_in(Partition::Track)
                .map(|(id, _)| Circle::new(positions[id], track_radius, LIGHT_BLUE.filled())),
        )?
        .label("Tracks")
        .legend(move |(x, y)| Circle::new((x, y), track_radius.min(20), LIGHT_BLUE.filled()));

    let artist_radius = marker_radius(figure.artist_node_size);
    chart
        .draw_series(
            graph
                .nodes_in(Partition::Artist)
                .map(|(id, _)| Circle::new(positions[id], artist_radius, RED.mix(0.85).filled())),
        )?
        .label("Artists")
        .legend(move |(x, y)| Circle::new((x, y), artist_radius.min(20), RED.filled()));

    let centered = Pos::new(HPos::Center, VPos::Center);
    let artist_font = font(figure.artist_font_size)
        .style(FontStyle::Bold)
        .color(&BLACK)
        .pos(centered);
    chart.draw_series(
        graph
            .nodes_in(Partition::Artist)
            .map(|(id, node)| Text::new(node.name.clone(), positions[id], artist_font.clone())),
    )?;

    let track_font = font(8.0).color(&DARK_BLUE).pos(centered);
    let nodes = graph.nodes();
    chart.draw_series(
        labelled_tracks
            .iter()
            .map(|&id| Text::new(nodes[id].name.clone(), positions[id], track_font.clone())),
    )?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(font(12.0))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Equal-width bins over the value range as (start, end, count).
///
/// The last bin includes its upper edge; a zero-width range is widened by 0.5
/// on both sides.
pub fn histogram(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let bin = (((v - lo) / width) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| (lo + i as f64 * width, lo + (i + 1) as f64 * width, count))
        .collect()
}

fn padded_range(lo: f64, hi: f64) -> std::ops::Range<f64> {
    if lo == hi {
        (lo - 1.0)..(hi + 1.0)
    } else {
        let pad = (hi - lo) * 0.05;
        (lo - pad)..(hi + pad)
    }
}

fn draw_no_data(area: &DrawingArea<BitMapBackend<'_>, Shift>, message: &str) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let style = font(10.0)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(message.to_string(), (w as i32 / 2, h as i32 / 2), style))?;
    Ok(())
}

/// Histogram, scatter and top-artist bars side by side in one image
pub fn render_summary_plot(path: &Path, summaries: &[ArtistSummary]) -> Result<()> {
    prepare(path)?;
    let size = ((15.0 * DPI as f64) as u32, (5.0 * DPI as f64) as u32);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 3));

    draw_track_count_histogram(&panels[0], summaries)?;
    draw_count_vs_mean(&panels[1], summaries)?;
    draw_top_artists(&panels[2], summaries)?;

    root.present()?;
    Ok(())
}

fn draw_track_count_histogram(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    summaries: &[ArtistSummary],
) -> Result<()> {
    let area = area.titled("Distribution of Track Counts per Artist", font(12.0))?;
    let counts: Vec<f64> = summaries.iter().map(|s| s.track_count as f64).collect();
    let bins = histogram(&counts, HISTOGRAM_BINS);
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return draw_no_data(&area, "No artists");
    };
    let y_max = bins.iter().map(|b| b.2).max().unwrap_or(1).max(1) as f64;

    let mut chart = ChartBuilder::on(&area)
        .margin(pt(8.0) as u32)
        .x_label_area_size(pt(30.0) as u32)
        .y_label_area_size(pt(36.0) as u32)
        .build_cartesian_2d(first.0..last.1, 0.0..y_max * 1.05)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Number of Tracks per Artist")
        .y_desc("Number of Artists")
        .label_style(font(9.0))
        .draw()?;

    chart.draw_series(bins.iter().map(|&(x0, x1, count)| {
        Rectangle::new([(x0, 0.0), (x1, count as f64)], BLUE.mix(0.7).filled())
    }))?;
    chart.draw_series(bins.iter().map(|&(x0, x1, count)| {
        Rectangle::new([(x0, 0.0), (x1, count as f64)], BLACK.stroke_width(2))
    }))?;
    Ok(())
}

fn draw_count_vs_mean(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    summaries: &[ArtistSummary],
) -> Result<()> {
    let area = area.titled("Track Count vs Mean Popularity", font(12.0))?;
    if summaries.is_empty() {
        return draw_no_data(&area, "No artists");
    }
    let points: Vec<(f64, f64)> = summaries
        .iter()
        .map(|s| (s.track_count as f64, s.mean_popularity))
        .collect();
    let x_range = padded_range(
        points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min),
        points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max),
    );
    let y_range = padded_range(
        points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min),
        points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max),
    );

    let mut chart = ChartBuilder::on(&area)
        .margin(pt(8.0) as u32)
        .x_label_area_size(pt(30.0) as u32)
        .y_label_area_size(pt(36.0) as u32)
        .build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Number of Tracks")
        .y_desc("Mean Popularity")
        .label_style(font(9.0))
        .draw()?;

    let radius = marker_radius(36.0);
    chart.draw_series(
        points
            .into_iter()
            .map(|p| Circle::new(p, radius, BLUE.mix(0.6).filled())),
    )?;
    Ok(())
}

fn draw_top_artists(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    summaries: &[ArtistSummary],
) -> Result<()> {
    let area = area.titled("Top 15 Artists by Track Count", font(12.0))?;
    let top = &summaries[..summaries.len().min(TOP_BARS)];
    if top.is_empty() {
        return draw_no_data(&area, "No artists");
    }
    let n = top.len();
    let x_max = top.iter().map(|s| s.track_count).max().unwrap_or(1).max(1) as f64;

    // Row 0 is drawn at the top, so rank r sits on segment n - 1 - r
    let name_of = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) if *i < n => top[n - 1 - *i].artist.clone(),
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(&area)
        .margin(pt(8.0) as u32)
        .x_label_area_size(pt(30.0) as u32)
        .y_label_area_size(pt(110.0) as u32)
        .build_cartesian_2d(0.0..x_max * 1.05, (0usize..n).into_segmented())?;
    chart
        .configure_mesh()
        .disable_mesh()
        .y_labels(n)
        .y_label_formatter(&name_of)
        .y_label_style(font(8.0))
        .x_label_style(font(9.0))
        .x_desc("Number of Tracks")
        .draw()?;

    chart.draw_series(top.iter().enumerate().map(|(rank, s)| {
        let row = n - 1 - rank;
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(row)),
                (s.track_count as f64, SegmentValue::Exact(row + 1)),
            ],
            BLUE.filled(),
        );
        bar.set_margin(pt(2.0) as u32, pt(2.0) as u32, 0, 0);
        bar
    }))?;
    Ok(())
}

/// Figures shown on the dashboard for a sampled edge set
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub artist_counts: Vec<(String, usize)>,
    pub artists: usize,
    pub tracks: usize,
    pub connections: usize,
    pub track_names: Vec<String>,
}

impl DashboardData {
    pub fn new(sampled: &[Edge], graph: &BipartiteGraph) -> Self {
        let mut artist_counts: Vec<(String, usize)> = Vec::new();
        for edge in sampled {
            match artist_counts.iter_mut().find(|(a, _)| *a == edge.artist) {
                Some((_, count)) => *count += 1,
                None => artist_counts.push((edge.artist.clone(), 1)),
            }
        }
        // Stable, so equal counts keep their rank order
        artist_counts.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            artist_counts,
            artists: graph.count_in(Partition::Artist),
            tracks: graph.count_in(Partition::Track),
            connections: graph.edge_count(),
            track_names: graph
                .nodes_in(Partition::Track)
                .map(|(_, n)| n.name.clone())
                .collect(),
        }
    }

    pub fn average_tracks_per_artist(&self) -> f64 {
        if self.artists == 0 {
            0.0
        } else {
            self.tracks as f64 / self.artists as f64
        }
    }

    pub fn statistics_lines(&self) -> Vec<String> {
        vec![
            format!("Total Artists: {}", self.artists),
            format!("Total Tracks: {}", self.tracks),
            format!("Total Connections: {}", self.connections),
            format!(
                "Avg Tracks per Artist: {:.1}",
                self.average_tracks_per_artist()
            ),
        ]
    }

    pub fn track_list_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .track_names
            .iter()
            .take(TRACK_LIST_LEN)
            .map(|t| format!("• {t}"))
            .collect();
        if self.track_names.len() > TRACK_LIST_LEN {
            lines.push(format!(
                "... and {} more",
                self.track_names.len() - TRACK_LIST_LEN
            ));
        }
        lines
    }
}

/// Four-panel overview of a sampled network
pub fn render_dashboard(path: &Path, graph: &BipartiteGraph, data: &DashboardData) -> Result<()> {
    prepare(path)?;
    let size = ((12.0 * DPI as f64) as u32, (8.0 * DPI as f64) as u32);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));

    draw_sampled_counts(&panels[0], data)?;
    draw_simple_network(&panels[1], graph)?;
    draw_text_panel(&panels[2], "Network Statistics", &data.statistics_lines(), 12.0)?;
    draw_text_panel(&panels[3], "Sample Tracks", &data.track_list_lines(), 8.0)?;

    root.present()?;
    Ok(())
}

fn draw_sampled_counts(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    data: &DashboardData,
) -> Result<()> {
    let area = area.titled("Track Counts per Artist", font(12.0))?;
    let n = data.artist_counts.len();
    if n == 0 {
        return draw_no_data(&area, "No artists");
    }
    let y_max = data.artist_counts.iter().map(|c| c.1).max().unwrap_or(1).max(1) as f64;
    let name_of = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) if *i < n => data.artist_counts[*i].0.clone(),
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(&area)
        .margin(pt(8.0) as u32)
        .x_label_area_size(pt(40.0) as u32)
        .y_label_area_size(pt(36.0) as u32)
        .build_cartesian_2d((0usize..n).into_segmented(), 0.0..y_max * 1.2)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .x_label_formatter(&name_of)
        .x_desc("Artists")
        .y_desc("Number of Tracks (Sampled)")
        .label_style(font(8.0))
        .draw()?;

    chart.draw_series(data.artist_counts.iter().enumerate().map(|(i, (_, count))| {
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), *count as f64),
            ],
            BAR_COLORS[i % BAR_COLORS.len()].filled(),
        );
        bar.set_margin(0, 0, pt(6.0) as u32, pt(6.0) as u32);
        bar
    }))?;

    let value_font = font(9.0)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(data.artist_counts.iter().enumerate().map(|(i, (_, count))| {
        Text::new(
            count.to_string(),
            (SegmentValue::CenterOf(i), *count as f64 + y_max * 0.02),
            value_font.clone(),
        )
    }))?;
    Ok(())
}

fn draw_simple_network(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    graph: &BipartiteGraph,
) -> Result<()> {
    let area = area.titled("Simplified Network View", font(12.0))?;
    if graph.is_empty() {
        return draw_no_data(&area, "No connections");
    }
    let positions = bipartite_rows(graph);
    let x_max = positions.iter().map(|p| p.0).fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(&area)
        .margin(pt(12.0) as u32)
        .build_cartesian_2d(-0.5..x_max + 0.5, -0.3..1.4)?;

    chart.draw_series(graph.edges().iter().map(|&(a, t)| {
        PathElement::new(vec![positions[a], positions[t]], BLACK.mix(0.3).stroke_width(1))
    }))?;
    let track_radius = marker_radius(50.0);
    chart.draw_series(
        graph
            .nodes_in(Partition::Track)
            .map(|(id, _)| Circle::new(positions[id], track_radius, LIGHT_BLUE.filled())),
    )?;
    let artist_radius = marker_radius(200.0);
    chart.draw_series(
        graph
            .nodes_in(Partition::Artist)
            .map(|(id, _)| Circle::new(positions[id], artist_radius, RED.mix(0.8).filled())),
    )?;

    let label_font = font(9.0)
        .style(FontStyle::Bold)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(graph.nodes_in(Partition::Artist).map(|(id, node)| {
        let (x, y) = positions[id];
        Text::new(node.name.clone(), (x, y + 0.08), label_font.clone())
    }))?;
    Ok(())
}

fn draw_text_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    lines: &[String],
    font_points: f64,
) -> Result<()> {
    let area = area.titled(title, font(12.0))?;
    let (w, h) = area.dim_in_pixel();
    let line_height = (pt(font_points) * 1.4) as i32;
    let style = font(font_points).color(&BLACK);

    let x = (w as f64 * 0.05) as i32;
    let mut y = (h as f64 * 0.05) as i32;
    for line in lines {
        area.draw(&Text::new(line.clone(), (x, y), style.clone()))?;
        y += line_height;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_bins_cover_range() {
        let values = [1.0, 2.0, 2.0, 3.0, 5.0];
        let bins = histogram(&values, 4);

        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].0, 1.0);
        assert_eq!(bins[3].1, 5.0);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), values.len());
        // Upper edge lands in the last bin
        assert_eq!(bins[3].2, 1);
        assert_eq!(bins[0].2, 1);
        assert_eq!(bins[1].2, 2);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram(&[4.0, 4.0], 20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins[0].0, 3.5);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), 2);
        assert!(histogram(&[], 20).is_empty());
    }

    #[test]
    fn test_marker_radius_scales_with_area() {
        assert!(marker_radius(800.0) > marker_radius(100.0));
        assert!(marker_radius(20.0) >= 1);
        assert_eq!(marker_radius(0.0), 1);
    }

    #[test]
    fn test_dashboard_data() {
        let sampled = vec![
            Edge::new("A", "t1"),
            Edge::new("B", "t2"),
            Edge::new("B", "t3"),
            Edge::new("C", "t3"),
        ];
        let graph = BipartiteGraph::from_edges(&sampled);
        let data = DashboardData::new(&sampled, &graph);

        assert_eq!(
            data.artist_counts,
            vec![
                ("B".to_string(), 2),
                ("A".to_string(), 1),
                ("C".to_string(), 1)
            ]
        );
        assert_eq!(data.artists, 3);
        assert_eq!(data.tracks, 3);
        assert_eq!(data.connections, 4);
        assert_eq!(data.statistics_lines()[3], "Avg Tracks per Artist: 1.0");
        assert_eq!(data.track_list_lines(), vec!["• t1", "• t2", "• t3"]);
    }

    #[test]
    fn test_dashboard_track_list_is_truncated() {
        let sampled: Vec<Edge> = (0..18).map(|i| Edge::new("A", format!("t{i}"))).collect();
        let graph = BipartiteGraph::from_edges(&sampled);
        let lines = DashboardData::new(&sampled, &graph).track_list_lines();

        assert_eq!(lines.len(), 16);
        assert_eq!(lines[15], "... and 3 more");
    }

    #[test]
    fn test_dashboard_data_empty() {
        let graph = BipartiteGraph::default();
        let data = DashboardData::new(&[], &graph);
        assert_eq!(data.average_tracks_per_artist(), 0.0);
        assert!(data.track_list_lines().is_empty());
    }

    fn assert_png(path: &Path) {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.len() > 8, "{} is empty", path.display());
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    fn small_figure(mut viz: NetworkVizConfig) -> NetworkVizConfig {
        viz.figure.width_in = 2.0;
        viz.figure.height_in = 1.5;
        viz
    }

    fn clean_graph() -> (Vec<Edge>, BipartiteGraph) {
        let mut sampled = Vec::new();
        for (artist, count) in [("Alpha", 20), ("Beta", 20), ("Gamma", 5)] {
            for i in 0..count {
                sampled.push(Edge::new(artist, format!("{artist} track {i}")));
            }
        }
        let graph = BipartiteGraph::from_edges(&sampled);
        (sampled, graph)
    }

    fn summaries() -> Vec<ArtistSummary> {
        use crate::clusters::summary::ClusterSummary;
        use crate::models::TrackMetadata;

        let (edges, _) = clean_graph();
        let metadata: Vec<TrackMetadata> = edges
            .iter()
            .enumerate()
            .map(|(i, e)| TrackMetadata::new(e.track.clone(), (i * 7 % 101) as u32))
            .collect();
        ClusterSummary::aggregate(&ClusterSummary::join(&edges, &metadata))
    }

    #[test]
    fn test_render_network_without_edges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("empty.png");
        let viz = small_figure(NetworkVizConfig::small());

        render_network(&path, &BipartiteGraph::default(), &[], &[], &viz).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_render_clean_network() {
        use crate::clusters::layout::SpringLayout;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.png");
        let viz = small_figure(NetworkVizConfig::clean());
        let (_, graph) = clean_graph();
        let positions = SpringLayout::new(viz.layout.k, 20, viz.layout.seed).compute(&graph);
        let labelled: Vec<usize> = graph
            .nodes_in(Partition::Track)
            .map(|(id, _)| id)
            .take(viz.track_labels)
            .collect();

        render_network(&path, &graph, &positions, &labelled, &viz).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_render_summary_plot() {
        let dir = tempfile::tempdir().unwrap();

        let empty = dir.path().join("summary_empty.png");
        render_summary_plot(&empty, &[]).unwrap();
        assert_png(&empty);

        let filled = dir.path().join("summary.png");
        render_summary_plot(&filled, &summaries()).unwrap();
        assert_png(&filled);
    }

    #[test]
    fn test_render_dashboard() {
        let dir = tempfile::tempdir().unwrap();

        let (sampled, graph) = clean_graph();
        let path = dir.path().join("dashboard.png");
        render_dashboard(&path, &graph, &DashboardData::new(&sampled, &graph)).unwrap();
        assert_png(&path);

        let empty_graph = BipartiteGraph::default();
        let empty = dir.path().join("dashboard_empty.png");
        render_dashboard(&empty, &empty_graph, &DashboardData::new(&[], &empty_graph)).unwrap();
        assert_png(&empty);
    }
}
