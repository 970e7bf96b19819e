use super::config::NetworkVizConfig;
use super::graph::{BipartiteGraph, Partition};
use super::layout::{Position, SpringLayout};
use super::loader::ClusterSource;
use super::ranking::ArtistRanking;
use super::render::{self, DashboardData};
use super::report::ReportWriter;
use super::summary::{self, SummaryOutcome};
use crate::config::Paths;
use crate::models::{Edge, RankedArtist};
use anyhow::Result;
use tracing::{debug, info};

/// Everything needed to draw one network variant
#[derive(Debug)]
pub struct NetworkScene {
    pub ranked: Vec<RankedArtist>,
    pub selected: Vec<Edge>,
    pub graph: BipartiteGraph,
    pub positions: Vec<Position>,
    pub labelled_tracks: Vec<usize>,
}

impl NetworkScene {
    /// Rank, sample, build the graph and lay it out
    pub fn build(edges: &[Edge], viz: &NetworkVizConfig) -> Self {
        let ranked = ArtistRanking::top_n(edges, viz.top_n);
        let names: Vec<String> = ranked
            .iter()
            .map(|a| format!("{} ({})", a.artist, a.edge_count))
            .collect();
        info!("Top artists by track count: {}", names.join(", "));

        let selected =
            ArtistRanking::select_edges(edges, &ranked, viz.sample_per_artist, viz.layout.seed);
        let graph = BipartiteGraph::from_edges(&selected);
        info!(
            "Graph created with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        let layout = SpringLayout::new(viz.layout.k, viz.layout.iterations, viz.layout.seed);
        let positions = layout.compute(&graph);

        let track_ids: Vec<usize> = graph.nodes_in(Partition::Track).map(|(id, _)| id).collect();
        let labelled_tracks =
            ArtistRanking::sample_items(&track_ids, viz.track_labels, viz.layout.seed);

        Self {
            ranked,
            selected,
            graph,
            positions,
            labelled_tracks,
        }
    }
}

/// Runs the batch jobs against one data directory
pub struct ClusterPipeline {
    paths: Paths,
    render_images: bool,
}

impl ClusterPipeline {
    pub fn new(paths: Paths, render_images: bool) -> Self {
        Self {
            paths,
            render_images,
        }
    }

    /// Join, aggregate, write both TSV reports and the summary plot
    pub fn run_summary(&self, source: &dyn ClusterSource) -> Result<SummaryOutcome> {
        let outcome = summary::compute_summary(source)?;
        summary::print_report(&outcome);

        ReportWriter::write_files(
            &self.paths.outcomes(),
            &self.paths.outcomes_simple(),
            &outcome.summaries,
        )?;

        if self.render_images {
            info!("Creating summary statistics plot...");
            let path = self.paths.outcomes_plot();
            render::render_summary_plot(&path, &outcome.summaries)?;
            info!("Summary statistics plot saved to {}", path.display());
        }
        Ok(outcome)
    }

    /// Render each network variant from the full edge list
    pub fn run_network(
        &self,
        source: &dyn ClusterSource,
        variants: &[NetworkVizConfig],
    ) -> Result<Vec<NetworkScene>> {
        let edges = source.load_edges()?;
        variants
            .iter()
            .map(|viz| self.render_variant(&edges, viz))
            .collect()
    }

    /// Sampled network plus the four-panel dashboard
    pub fn run_clean(
        &self,
        source: &dyn ClusterSource,
        viz: &NetworkVizConfig,
    ) -> Result<(NetworkScene, DashboardData)> {
        let edges = source.load_edges()?;
        let scene = self.render_variant(&edges, viz)?;
        let dashboard = DashboardData::new(&scene.selected, &scene.graph);
        debug!("Dashboard: {:?}", dashboard.statistics_lines());

        if self.render_images {
            let path = self.paths.dashboard();
            render::render_dashboard(&path, &scene.graph, &dashboard)?;
            info!("Dashboard visualization saved to {}", path.display());
        }
        Ok((scene, dashboard))
    }

    fn render_variant(&self, edges: &[Edge], viz: &NetworkVizConfig) -> Result<NetworkScene> {
        viz.validate()?;
        info!("Creating '{}' visualization...", viz.name);
        let scene = NetworkScene::build(edges, viz);
        if self.render_images {
            let path = self.paths.output(&viz.output_file);
            render::render_network(
                &path,
                &scene.graph,
                &scene.positions,
                &scene.labelled_tracks,
                viz,
            )?;
            info!("Network visualization saved to {}", path.display());
        }
        Ok(scene)
    }
}
