//! Social network topology.
//!
//! Rumors travel over a Barabási–Albert scale-free network: a small random
//! seed network grows by preferential attachment, so a few hubs end up with
//! many acquaintances while most nodes have only a handful.

use crate::error::ModelError;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Parameters for Barabási–Albert growth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleFreeParams {
    /// Nodes in the random seed network
    pub m0: usize,

    /// Existing nodes each new node attaches to
    pub m: usize,

    /// Nodes added by preferential attachment
    pub growth: usize,
}

impl Default for ScaleFreeParams {
    fn default() -> Self {
        Self {
            m0: 5,
            m: 2,
            growth: 295,
        }
    }
}

impl ScaleFreeParams {
    /// Total number of nodes after growth.
    pub fn node_count(&self) -> usize {
        self.m0 + self.growth
    }

    /// Checks that growth can proceed.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.m0 < 2 {
            return Err(ModelError::graph(format!(
                "seed network needs at least 2 nodes, got m0={}",
                self.m0
            )));
        }
        if self.m == 0 {
            return Err(ModelError::graph("new nodes must attach to at least one node (m=0)"));
        }
        if self.m > self.m0 {
            return Err(ModelError::graph(format!(
                "cannot attach to m={} distinct nodes with only m0={} seed nodes",
                self.m, self.m0
            )));
        }
        Ok(())
    }
}

/// Undirected simple graph with sorted adjacency lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialGraph {
    adjacency: Vec<Vec<usize>>,
}

impl SocialGraph {
    /// Creates a graph with `n` isolated nodes.
    pub fn empty(n: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); n],
        }
    }

    /// Builds a graph from an explicit edge list.
    ///
    /// Duplicate edges are merged. Self-loops are rejected, since telling a
    /// rumor to oneself has no meaning here.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self, ModelError> {
        let mut graph = Self::empty(n);
        for &(a, b) in edges {
            graph.add_edge(a, b)?;
        }
        Ok(graph)
    }

    /// Grows a Barabási–Albert scale-free network.
    pub fn barabasi_albert<R: Rng + ?Sized>(
        params: &ScaleFreeParams,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        params.validate()?;

        let mut graph = Self::random_seed_network(params.m0, rng);
        graph.adjacency.reserve(params.growth);

        for _ in 0..params.growth {
            let targets = graph.preferential_targets(params.m, rng)?;
            let new_node = graph.adjacency.len();
            graph.adjacency.push(Vec::with_capacity(params.m));
            for target in targets {
                graph.add_edge(new_node, target)?;
            }
        }

        Ok(graph)
    }

    /// Random seed network where every node has at least one edge.
    ///
    /// Each pair is linked with probability 1/2; samples with an isolated
    /// node are discarded and redrawn.
    fn random_seed_network<R: Rng + ?Sized>(m0: usize, rng: &mut R) -> Self {
        loop {
            let mut graph = Self::empty(m0);
            for i in 0..m0 {
                for j in (i + 1)..m0 {
                    if rng.gen_bool(0.5) {
                        graph.link(i, j);
                    }
                }
            }

            if graph.adjacency.iter().all(|n| !n.is_empty()) {
                return graph;
            }
        }
    }

    /// Picks `m` distinct existing nodes with probability proportional to degree.
    fn preferential_targets<R: Rng + ?Sized>(
        &self,
        m: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, ModelError> {
        let mut weights: Vec<usize> = (0..self.node_count()).map(|i| self.degree(i)).collect();
        let mut chosen = Vec::with_capacity(m);

        for _ in 0..m {
            let dist = WeightedIndex::new(&weights).map_err(|e| {
                ModelError::graph(format!("preferential attachment failed: {}", e))
            })?;
            let pick = dist.sample(rng);
            weights[pick] = 0;
            chosen.push(pick);
        }

        Ok(chosen)
    }

    /// Adds an undirected edge, validating endpoints.
    pub fn add_edge(&mut self, a: usize, b: usize) -> Result<(), ModelError> {
        let n = self.node_count();
        if a >= n {
            return Err(ModelError::NodeOutOfRange(a, n));
        }
        if b >= n {
            return Err(ModelError::NodeOutOfRange(b, n));
        }
        if a == b {
            return Err(ModelError::graph(format!("self-loop on node {}", a)));
        }
        self.link(a, b);
        Ok(())
    }

    fn link(&mut self, a: usize, b: usize) {
        if let Err(pos) = self.adjacency[a].binary_search(&b) {
            self.adjacency[a].insert(pos, b);
        }
        if let Err(pos) = self.adjacency[b].binary_search(&a) {
            self.adjacency[b].insert(pos, a);
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Degree of a node (0 for unknown nodes).
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency.get(node).map(Vec::len).unwrap_or(0)
    }

    /// Neighbors of a node in ascending order.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.adjacency.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// True if `a` and `b` are acquainted.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Iterates each undirected edge once as `(low, high)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(a, ns)| {
            ns.iter().copied().filter(move |&b| b > a).map(move |b| (a, b))
        })
    }

    /// Serializes the graph as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a graph from JSON and checks its adjacency is consistent.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let raw: SocialGraph = serde_json::from_str(json)
            .map_err(|e| ModelError::graph(format!("malformed graph JSON: {}", e)))?;

        // Rebuild from the edge set so asymmetric or unsorted input is rejected/normalized
        let n = raw.node_count();
        let mut graph = Self::empty(n);
        for (a, ns) in raw.adjacency.iter().enumerate() {
            for &b in ns {
                graph.add_edge(a, b)?;
            }
        }
        if graph != raw {
            return Err(ModelError::graph("adjacency lists are not symmetric and sorted"));
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_params_validation() {
        assert!(ScaleFreeParams::default().validate().is_ok());
        assert!(ScaleFreeParams { m0: 1, ..Default::default() }.validate().is_err());
        assert!(ScaleFreeParams { m: 0, ..Default::default() }.validate().is_err());
        assert!(ScaleFreeParams { m0: 3, m: 4, growth: 10 }.validate().is_err());
    }

    #[test]
    fn test_from_edges() {
        let g = SocialGraph::from_edges(4, &[(0, 1), (1, 2), (2, 1), (3, 0)]).unwrap();

        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.neighbors(1), &[0, 2]);
        assert_eq!(g.neighbors(0), &[1, 3]);
        assert!(g.has_edge(2, 1));
        assert!(!g.has_edge(2, 3));

        let edges: Vec<_> = g.edges().collect();
        assert_eq!(edges, vec![(0, 1), (0, 3), (1, 2)]);
    }

    #[test]
    fn test_from_edges_rejects_bad_input() {
        assert!(matches!(
            SocialGraph::from_edges(3, &[(1, 1)]),
            Err(ModelError::InvalidGraph(_))
        ));
        assert!(matches!(
            SocialGraph::from_edges(3, &[(0, 3)]),
            Err(ModelError::NodeOutOfRange(3, 3))
        ));
    }

    #[test]
    fn test_barabasi_albert_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let params = ScaleFreeParams::default();
        let g = SocialGraph::barabasi_albert(&params, &mut rng).unwrap();

        assert_eq!(g.node_count(), 300);

        // Every node has at least one acquaintance, nobody knows themselves
        for i in 0..g.node_count() {
            assert!(g.degree(i) >= 1, "node {} isolated", i);
            assert!(!g.has_edge(i, i));
        }

        // Grown nodes attach to exactly m distinct earlier nodes
        for new_node in params.m0..g.node_count() {
            let earlier = g.neighbors(new_node).iter().filter(|&&n| n < new_node).count();
            assert_eq!(earlier, params.m);
        }

        let seed_edges = g.edges().filter(|&(a, b)| a < params.m0 && b < params.m0).count();
        assert_eq!(g.edge_count(), seed_edges + params.growth * params.m);
    }

    #[test]
    fn test_barabasi_albert_has_hubs() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let g = SocialGraph::barabasi_albert(&ScaleFreeParams::default(), &mut rng).unwrap();

        let max_degree = (0..g.node_count()).map(|i| g.degree(i)).max().unwrap();
        let mean_degree = 2.0 * g.edge_count() as f64 / g.node_count() as f64;

        // Preferential attachment produces hubs far above the mean
        assert!(max_degree as f64 > 3.0 * mean_degree);
    }

    #[test]
    fn test_barabasi_albert_deterministic() {
        let params = ScaleFreeParams { m0: 5, m: 2, growth: 50 };
        let g1 = SocialGraph::barabasi_albert(&params, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        let g2 = SocialGraph::barabasi_albert(&params, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        assert_eq!(g1, g2);
    }

    #[test]
    fn test_json_roundtrip_and_validation() {
        let g = SocialGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let json = g.to_json().unwrap();
        assert_eq!(SocialGraph::from_json(&json).unwrap(), g);

        // One-sided adjacency is rejected
        let lopsided = r#"{"adjacency":[[1],[],[]]}"#;
        assert!(SocialGraph::from_json(lopsided).is_err());
    }
}
