//! Source credibility.
//!
//! A listener believes a neighbour in proportion to how well connected that
//! neighbour is, relative to the best-connected person the listener knows:
//!
//! ```text
//! eta(i, j) = deg(j)^beta / max_{k in N(i)} deg(k)^beta
//! ```
//!
//! `beta` is the confidence factor. With `beta = 0` every neighbour is always
//! believed; larger values concentrate trust on hubs.
//!
//! Rows are listeners and columns are speakers. The matrix is not symmetric:
//! `eta(i, j)` and `eta(j, i)` are normalized by different neighbourhoods and
//! are never mirrored into each other.

use crate::error::ModelError;
use crate::graph::SocialGraph;
use nalgebra::DMatrix;

/// Acceptance probabilities between acquainted nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrustMatrix {
    eta: DMatrix<f64>,
    confidence: f64,
}

impl TrustMatrix {
    /// Computes acceptance probabilities for every edge of `graph`.
    pub fn from_graph(graph: &SocialGraph, confidence: f64) -> Result<Self, ModelError> {
        if !confidence.is_finite() || confidence < 0.0 {
            return Err(ModelError::parameter(format!(
                "confidence factor must be finite and >= 0, got {}",
                confidence
            )));
        }

        let n = graph.node_count();
        let weight: Vec<f64> = (0..n)
            .map(|i| (graph.degree(i) as f64).powf(confidence))
            .collect();

        let mut eta = DMatrix::zeros(n, n);
        for listener in 0..n {
            let neighbors = graph.neighbors(listener);
            let best = neighbors
                .iter()
                .map(|&k| weight[k])
                .fold(0.0_f64, f64::max);

            if best <= 0.0 {
                continue;
            }

            for &speaker in neighbors {
                eta[(listener, speaker)] = weight[speaker] / best;
            }
        }

        Ok(Self { eta, confidence })
    }

    /// Probability that `listener` accepts a rumor told by `speaker`.
    pub fn eta(&self, listener: usize, speaker: usize) -> f64 {
        self.eta
            .get((listener, speaker))
            .copied()
            .unwrap_or(0.0)
    }

    /// The confidence factor the matrix was built with.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Number of nodes covered.
    pub fn node_count(&self) -> usize {
        self.eta.nrows()
    }

    /// Underlying matrix (row = listener, column = speaker).
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.eta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Star with a tail: 0 is a hub of degree 3, 3 also knows 4.
    fn star_with_tail() -> SocialGraph {
        SocialGraph::from_edges(5, &[(0, 1), (0, 2), (0, 3), (3, 4)]).unwrap()
    }

    #[test]
    fn test_hub_is_fully_trusted() {
        let g = star_with_tail();
        let trust = TrustMatrix::from_graph(&g, 1.0).unwrap();

        // Leaf 1 only knows the hub
        assert_relative_eq!(trust.eta(1, 0), 1.0);

        // Node 3 knows hub (deg 3) and node 4 (deg 1)
        assert_relative_eq!(trust.eta(3, 0), 1.0);
        assert_relative_eq!(trust.eta(3, 4), 1.0 / 3.0, epsilon = 1e-12);

        // Hub's neighbours: 1 (deg 1), 2 (deg 1), 3 (deg 2)
        assert_relative_eq!(trust.eta(0, 3), 1.0);
        assert_relative_eq!(trust.eta(0, 1), 0.5);
    }

    #[test]
    fn test_trust_is_directional() {
        let g = star_with_tail();
        let trust = TrustMatrix::from_graph(&g, 1.0).unwrap();

        assert!(trust.eta(0, 1) < trust.eta(1, 0));
    }

    #[test]
    fn test_zero_confidence_trusts_everyone() {
        let g = star_with_tail();
        let trust = TrustMatrix::from_graph(&g, 0.0).unwrap();

        for (a, b) in g.edges() {
            assert_relative_eq!(trust.eta(a, b), 1.0);
            assert_relative_eq!(trust.eta(b, a), 1.0);
        }
    }

    #[test]
    fn test_strangers_and_isolated_nodes() {
        let g = SocialGraph::from_edges(4, &[(0, 1), (1, 2)]).unwrap();
        let trust = TrustMatrix::from_graph(&g, 2.0).unwrap();

        assert_eq!(trust.eta(0, 2), 0.0);
        for j in 0..4 {
            assert_eq!(trust.eta(3, j), 0.0);
        }
        assert_eq!(trust.eta(10, 0), 0.0);
    }

    #[test]
    fn test_values_bounded() {
        let g = star_with_tail();
        let trust = TrustMatrix::from_graph(&g, 3.5).unwrap();
        assert!(trust.as_matrix().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_rejects_negative_confidence() {
        let g = star_with_tail();
        assert!(matches!(
            TrustMatrix::from_graph(&g, -1.0),
            Err(ModelError::InvalidParameter(_))
        ));
    }
}
