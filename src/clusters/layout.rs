use super::graph::{BipartiteGraph, Partition};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

/// Below this mean displacement per node the layout is considered settled
const CONVERGENCE_THRESHOLD: f64 = 1e-4;
const MIN_DISTANCE: f64 = 0.01;

pub type Position = (f64, f64);

/// Fruchterman-Reingold force-directed layout.
///
/// Every node pair repels with `k^2 / d`, connected pairs attract with
/// `d^2 / k`. Each step moves a node along its net force by at most the
/// current temperature, which cools linearly to zero. The final positions
/// are centred on the origin and scaled into [-1, 1].
pub struct SpringLayout {
    pub k: f64,
    pub iterations: usize,
    pub seed: u64,
}

impl SpringLayout {
    pub fn new(k: f64, iterations: usize, seed: u64) -> Self {
        Self { k, iterations, seed }
    }

    pub fn compute(&self, graph: &BipartiteGraph) -> Vec<Position> {
        let n = graph.node_count();
        match n {
            0 => return Vec::new(),
            1 => return vec![(0.0, 0.0)],
            _ => {}
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pos: Vec<Position> = (0..n).map(|_| (rng.r#gen(), rng.r#gen())).collect();

        let adjacency = graph.adjacency();

        let mut temperature = span(&pos) * 0.1;
        let cooling = temperature / (self.iterations as f64 + 1.0);
        let k2 = self.k * self.k;

        for _ in 0..self.iterations {
            let mut moved = 0.0;
            let mut step = vec![(0.0, 0.0); n];

            for i in 0..n {
                let (mut fx, mut fy) = (0.0, 0.0);
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i].0 - pos[j].0;
                    let dy = pos[i].1 - pos[j].1;
                    let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                    let factor = k2 / (distance * distance);
                    fx += dx * factor;
                    fy += dy * factor;
                }
                for &j in &adjacency[i] {
                    let dx = pos[i].0 - pos[j].0;
                    let dy = pos[i].1 - pos[j].1;
                    let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                    fx -= dx * distance / self.k;
                    fy -= dy * distance / self.k;
                }

                let mut length = (fx * fx + fy * fy).sqrt();
                if length < MIN_DISTANCE {
                    length = 0.1;
                }
                step[i] = (fx * temperature / length, fy * temperature / length);
                moved += step[i].0 * step[i].0 + step[i].1 * step[i].1;
            }

            for (p, s) in pos.iter_mut().zip(&step) {
                p.0 += s.0;
                p.1 += s.1;
            }
            temperature -= cooling;

            if moved.sqrt() / (n as f64) < CONVERGENCE_THRESHOLD {
                break;
            }
        }

        rescale(&mut pos);
        pos
    }
}

/// Largest extent of the positions along either axis
fn span(pos: &[Position]) -> f64 {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in pos {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    (max_x - min_x).max(max_y - min_y)
}

/// Centre on the origin and scale so the farthest coordinate sits at 1
fn rescale(pos: &mut [Position]) {
    if pos.is_empty() {
        return;
    }
    let n = pos.len() as f64;
    let cx = pos.iter().map(|p| p.0).sum::<f64>() / n;
    let cy = pos.iter().map(|p| p.1).sum::<f64>() / n;

    let mut limit: f64 = 0.0;
    for p in pos.iter_mut() {
        p.0 -= cx;
        p.1 -= cy;
        limit = limit.max(p.0.abs()).max(p.1.abs());
    }
    if limit > 0.0 {
        for p in pos.iter_mut() {
            p.0 /= limit;
            p.1 /= limit;
        }
    }
}

/// Two-row layout: artists on top two units apart, tracks below their first artist
pub fn bipartite_rows(graph: &BipartiteGraph) -> Vec<Position> {
    let mut pos = vec![(0.0, 0.0); graph.node_count()];
    let mut column = vec![0usize; graph.node_count()];

    for (slot, (id, _)) in graph.nodes_in(Partition::Artist).enumerate() {
        pos[id] = (slot as f64 * 2.0, 1.0);
        column[id] = slot;
    }

    let mut placed = vec![false; graph.node_count()];
    let mut per_artist = vec![0usize; graph.node_count()];
    for &(artist, track) in graph.edges() {
        if placed[track] {
            continue;
        }
        placed[track] = true;
        let offset = per_artist[artist];
        per_artist[artist] += 1;
        pos[track] = (column[artist] as f64 * 2.0 + offset as f64 * 0.3, 0.0);
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Edge;
    use approx::assert_relative_eq;

    fn star(artist: &str, tracks: usize) -> Vec<Edge> {
        (0..tracks)
            .map(|i| Edge::new(artist, format!("{artist}-{i}")))
            .collect()
    }

    #[test]
    fn test_degenerate_graphs() {
        let layout = SpringLayout::new(1.0, 50, 42);
        assert!(layout.compute(&BipartiteGraph::default()).is_empty());

        let mut single = BipartiteGraph::default();
        single.add_edge("A", "t");
        let pos = layout.compute(&single);
        assert_eq!(pos.len(), 2);
    }

    #[test]
    fn test_positions_are_normalized() {
        let mut edges = star("A", 12);
        edges.extend(star("B", 8));
        let graph = BipartiteGraph::from_edges(&edges);
        let pos = SpringLayout::new(0.5, 50, 42).compute(&graph);

        assert_eq!(pos.len(), graph.node_count());
        let max = pos
            .iter()
            .map(|p| p.0.abs().max(p.1.abs()))
            .fold(0.0, f64::max);
        assert_relative_eq!(max, 1.0, epsilon = 1e-9);

        let cx = pos.iter().map(|p| p.0).sum::<f64>() / pos.len() as f64;
        let cy = pos.iter().map(|p| p.1).sum::<f64>() / pos.len() as f64;
        assert_relative_eq!(cx, 0.0, epsilon = 1e-9);
        assert_relative_eq!(cy, 0.0, epsilon = 1e-9);
        assert!(pos.iter().all(|p| p.0.is_finite() && p.1.is_finite()));
    }

    #[test]
    fn test_layout_is_deterministic_per_seed() {
        let graph = BipartiteGraph::from_edges(&star("A", 10));
        let first = SpringLayout::new(2.0, 50, 42).compute(&graph);
        let second = SpringLayout::new(2.0, 50, 42).compute(&graph);
        assert_eq!(first, second);

        let other = SpringLayout::new(2.0, 50, 7).compute(&graph);
        assert_ne!(first, other);
    }

    #[test]
    fn test_connected_tracks_stay_near_their_artist() {
        let mut edges = star("A", 15);
        edges.extend(star("B", 15));
        let graph = BipartiteGraph::from_edges(&edges);
        let pos = SpringLayout::new(0.2, 100, 42).compute(&graph);

        let a = pos[0];
        let b_id = graph
            .nodes()
            .iter()
            .position(|n| n.name == "B" && n.partition == Partition::Artist)
            .unwrap();
        let b = pos[b_id];
        let dist = |p: Position, q: Position| ((p.0 - q.0).powi(2) + (p.1 - q.1).powi(2)).sqrt();

        let a_tracks: Vec<Position> = graph
            .edges()
            .iter()
            .filter(|(artist, _)| *artist == 0)
            .map(|&(_, track)| pos[track])
            .collect();
        let to_a: f64 = a_tracks.iter().map(|&p| dist(p, a)).sum();
        let to_b: f64 = a_tracks.iter().map(|&p| dist(p, b)).sum();
        assert!(to_a < to_b);
    }

    #[test]
    fn test_bipartite_rows() {
        let graph = BipartiteGraph::from_edges(&[
            Edge::new("A", "t1"),
            Edge::new("A", "t2"),
            Edge::new("B", "t3"),
            Edge::new("B", "t1"),
        ]);
        let pos = bipartite_rows(&graph);

        // Node order: A, t1, t2, B, t3
        assert_eq!(pos[0], (0.0, 1.0));
        assert_eq!(pos[3], (2.0, 1.0));
        assert_eq!(pos[1], (0.0, 0.0));
        assert_relative_eq!(pos[2].0, 0.3);
        assert_eq!(pos[4], (2.0, 0.0));
    }
}
