use crate::models::{Edge, RankedArtist};
use rand::SeedableRng;
use rand::seq::index;
use rand::rngs::StdRng;
use std::collections::HashMap;

/// Ranking of artists by edge count and bounded edge sampling
pub struct ArtistRanking;

impl ArtistRanking {
    /// Count edges per artist, most first; equal counts ordered by artist name
    pub fn counts(edges: &[Edge]) -> Vec<RankedArtist> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for edge in edges {
            *counts.entry(edge.artist.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<RankedArtist> = counts
            .into_iter()
            .map(|(artist, edge_count)| RankedArtist {
                artist: artist.to_string(),
                edge_count,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.edge_count
                .cmp(&a.edge_count)
                .then_with(|| a.artist.cmp(&b.artist))
        });
        ranked
    }

    /// The `n` artists with the most edges
    pub fn top_n(edges: &[Edge], n: usize) -> Vec<RankedArtist> {
        let mut ranked = Self::counts(edges);
        ranked.truncate(n);
        ranked
    }

    /// Edges of the selected artists, grouped in rank order.
    ///
    /// With a `per_artist` bound, an artist holding more edges keeps exactly that
    /// many, drawn without replacement by a generator freshly seeded with `seed`.
    /// Kept edges stay in input order.
    pub fn select_edges(
        edges: &[Edge],
        artists: &[RankedArtist],
        per_artist: Option<usize>,
        seed: u64,
    ) -> Vec<Edge> {
        let mut selected = Vec::new();
        for ranked in artists {
            let artist_edges: Vec<&Edge> =
                edges.iter().filter(|e| e.artist == ranked.artist).collect();

            match per_artist {
                Some(limit) if artist_edges.len() > limit => {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let mut picked = index::sample(&mut rng, artist_edges.len(), limit).into_vec();
                    picked.sort_unstable();
                    selected.extend(picked.into_iter().map(|i| artist_edges[i].clone()));
                }
                _ => selected.extend(artist_edges.into_iter().cloned()),
            }
        }
        selected
    }

    /// Pick up to `count` distinct items with a seeded generator, in input order
    pub fn sample_items<T: Clone>(items: &[T], count: usize, seed: u64) -> Vec<T> {
        if items.len() <= count {
            return items.to_vec();
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let mut picked = index::sample(&mut rng, items.len(), count).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| items[i].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn artist_edges(artist: &str, count: usize) -> Vec<Edge> {
        (0..count)
            .map(|i| Edge::new(artist, format!("{artist} track {i}")))
            .collect()
    }

    fn fixture() -> Vec<Edge> {
        let mut edges = Vec::new();
        edges.extend(artist_edges("Big", 50));
        edges.extend(artist_edges("Small", 5));
        edges.extend(artist_edges("Mid", 30));
        edges.extend(artist_edges("Tiny", 1));
        edges
    }

    #[test]
    fn test_top_n_by_edge_count() {
        let top = ArtistRanking::top_n(&fixture(), 3);
        let names: Vec<&str> = top.iter().map(|a| a.artist.as_str()).collect();
        assert_eq!(names, vec!["Big", "Mid", "Small"]);
        assert_eq!(top[0].edge_count, 50);
        assert_eq!(top[2].edge_count, 5);
    }

    #[test]
    fn test_top_n_larger_than_artist_count() {
        assert_eq!(ArtistRanking::top_n(&fixture(), 20).len(), 4);
        assert!(ArtistRanking::top_n(&[], 5).is_empty());
    }

    #[test]
    fn test_ties_broken_by_name() {
        let mut edges = artist_edges("b", 2);
        edges.extend(artist_edges("a", 2));
        edges.extend(artist_edges("c", 3));
        let names: Vec<String> = ArtistRanking::counts(&edges)
            .into_iter()
            .map(|a| a.artist)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_sampling_bounds_large_artists_only() {
        let edges = fixture();
        let top = ArtistRanking::top_n(&edges, 3);
        let selected = ArtistRanking::select_edges(&edges, &top, Some(20), 42);

        let count = |artist: &str| selected.iter().filter(|e| e.artist == artist).count();
        assert_eq!(count("Big"), 20);
        assert_eq!(count("Mid"), 20);
        assert_eq!(count("Small"), 5);
        assert_eq!(count("Tiny"), 0);

        // The small artist is kept verbatim
        let small: Vec<Edge> = selected
            .iter()
            .filter(|e| e.artist == "Small")
            .cloned()
            .collect();
        assert_eq!(small, artist_edges("Small", 5));
    }

    #[test]
    fn test_sampling_without_replacement_in_input_order() {
        let edges = fixture();
        let top = ArtistRanking::top_n(&edges, 1);
        let selected = ArtistRanking::select_edges(&edges, &top, Some(20), 42);

        let unique: HashSet<&Edge> = selected.iter().collect();
        assert_eq!(unique.len(), 20);

        let positions: Vec<usize> = selected
            .iter()
            .map(|s| edges.iter().position(|e| e == s).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let edges = fixture();
        let top = ArtistRanking::top_n(&edges, 3);
        let first = ArtistRanking::select_edges(&edges, &top, Some(20), 42);
        let second = ArtistRanking::select_edges(&edges, &top, Some(20), 42);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unbounded_selection_keeps_everything_in_rank_order() {
        let edges = fixture();
        let top = ArtistRanking::top_n(&edges, 2);
        let selected = ArtistRanking::select_edges(&edges, &top, None, 42);

        assert_eq!(selected.len(), 80);
        assert!(selected[..50].iter().all(|e| e.artist == "Big"));
        assert!(selected[50..].iter().all(|e| e.artist == "Mid"));
    }

    #[test]
    fn test_sample_items() {
        let items: Vec<u32> = (0..100).collect();
        let picked = ArtistRanking::sample_items(&items, 10, 42);
        assert_eq!(picked.len(), 10);
        assert_eq!(picked, ArtistRanking::sample_items(&items, 10, 42));
        assert!(picked.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(ArtistRanking::sample_items(&items[..3], 10, 42), vec![0, 1, 2]);
    }
}
