use crate::models::Edge;
use std::collections::{HashMap, HashSet};

/// Which side of the bipartite graph a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Artist,
    Track,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub partition: Partition,
}

/// Undirected artist-track graph.
///
/// Nodes are keyed by (partition, name), so an artist and a track sharing a
/// name stay two nodes. Repeated pairs collapse into one edge.
#[derive(Debug, Clone, Default)]
pub struct BipartiteGraph {
    nodes: Vec<Node>,
    index: HashMap<(Partition, String), usize>,
    edges: Vec<(usize, usize)>,
    seen: HashSet<(usize, usize)>,
}

impl BipartiteGraph {
    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut graph = Self::default();
        for edge in edges {
            graph.add_edge(&edge.artist, &edge.track);
        }
        graph
    }

    pub fn add_edge(&mut self, artist: &str, track: &str) {
        let a = self.node_id(Partition::Artist, artist);
        let t = self.node_id(Partition::Track, track);
        if self.seen.insert((a, t)) {
            self.edges.push((a, t));
        }
    }

    fn node_id(&mut self, partition: Partition, name: &str) -> usize {
        if let Some(&id) = self.index.get(&(partition, name.to_string())) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            partition,
        });
        self.index.insert((partition, name.to_string()), id);
        id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges as (artist node, track node) index pairs
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes_in(&self, partition: Partition) -> impl Iterator<Item = (usize, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.partition == partition)
    }

    pub fn count_in(&self, partition: Partition) -> usize {
        self.nodes_in(partition).count()
    }

    /// Symmetric adjacency lists indexed by node id
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for &(a, t) in &self.edges {
            adjacency[a].push(t);
            adjacency[t].push(a);
        }
        adjacency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_bipartite_graph() {
        let graph = BipartiteGraph::from_edges(&[
            Edge::new("A", "t1"),
            Edge::new("A", "t2"),
            Edge::new("B", "t2"),
        ]);

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.count_in(Partition::Artist), 2);
        assert_eq!(graph.count_in(Partition::Track), 2);

        let names: Vec<&str> = graph.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A", "t1", "t2", "B"]);
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let graph =
            BipartiteGraph::from_edges(&[Edge::new("A", "t1"), Edge::new("A", "t1")]);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_artist_and_track_with_same_name_stay_apart() {
        let graph =
            BipartiteGraph::from_edges(&[Edge::new("Echo", "Echo"), Edge::new("B", "Echo")]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.count_in(Partition::Artist), 2);
        assert_eq!(graph.count_in(Partition::Track), 1);
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let graph = BipartiteGraph::from_edges(&[Edge::new("A", "t1"), Edge::new("B", "t1")]);
        let adjacency = graph.adjacency();
        assert_eq!(adjacency[0], vec![1]);
        assert_eq!(adjacency[1], vec![0, 2]);
        assert_eq!(adjacency[2], vec![1]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = BipartiteGraph::from_edges(&[]);
        assert!(graph.is_empty());
        assert!(graph.adjacency().is_empty());
    }
}
