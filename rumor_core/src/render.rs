//! Graphviz rendering of spreading rounds.
//!
//! Each round becomes one DOT document laid out for `neato`. Node colour
//! shows how far the node's opinion has drifted from the truth (blue is
//! faithful, red is fully false, white is uninformed). Consistent actors
//! are labelled `L` or `T`.

use crate::actor::Role;
use crate::graph::SocialGraph;
use crate::rumor::Rumor;
use std::fmt::Write as _;

/// Fill colour for an uninformed node.
pub const UNINFORMED_COLOR: &str = "#ffffff";

const DISTORTION_COLORS: [&str; 6] = [
    "#33ccff", "#e6ccff", "#cc99ff", "#ff99ff", "#ff3399", "#ff0000",
];

/// Colour for a node holding `opinion` (`None` = heard nothing yet).
pub fn fill_color(opinion: Option<Rumor>) -> &'static str {
    match opinion {
        None => UNINFORMED_COLOR,
        Some(r) => DISTORTION_COLORS
            .get(r.distortion() as usize)
            .copied()
            .unwrap_or(UNINFORMED_COLOR),
    }
}

/// Visual state of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView {
    pub role: Role,
    pub opinion: Option<Rumor>,
}

/// A single rendered round.
#[derive(Debug, Clone)]
pub struct DotFrame {
    /// Round index shown in the graph label
    pub round: usize,

    /// Node states indexed by node id
    pub nodes: Vec<NodeView>,

    /// Undirected edges
    pub edges: Vec<(usize, usize)>,
}

impl DotFrame {
    /// Captures a frame of `graph` with the given node states.
    pub fn capture(round: usize, graph: &SocialGraph, nodes: Vec<NodeView>) -> Self {
        Self {
            round,
            nodes,
            edges: graph.edges().collect(),
        }
    }

    /// Renders the frame as a Graphviz document.
    pub fn to_dot(&self) -> String {
        let mut out = String::with_capacity(64 * (self.nodes.len() + self.edges.len()) + 512);

        // write! into a String cannot fail
        let _ = writeln!(out, "graph rumor {{");
        let _ = writeln!(
            out,
            "  graph [outputorder=\"edgesfirst\", size=\"6!,6!\", label=\"t = {:03}\"];",
            self.round
        );
        let _ = writeln!(
            out,
            "  node [shape=\"circle\", fixedsize=\"true\", fontsize=\"7\", style=\"filled\", height=\"0.2\", width=\"0.2\"];"
        );
        let _ = writeln!(out, "  edge [color=\"#000000\", style=\"setlinewidth(2)\"];");

        for (id, view) in self.nodes.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {} [label=\"{}\", fillcolor=\"{}\"];",
                id,
                view.role.label(),
                fill_color(view.opinion)
            );
        }

        for (a, b) in &self.edges {
            let _ = writeln!(out, "  {} -- {};", a, b);
        }

        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_color_by_distortion() {
        assert_eq!(fill_color(None), "#ffffff");
        assert_eq!(fill_color(Some(Rumor::TRUE)), "#33ccff");
        assert_eq!(fill_color(Some("00100".parse().unwrap())), "#e6ccff");
        assert_eq!(fill_color(Some("10100".parse().unwrap())), "#cc99ff");
        assert_eq!(fill_color(Some("10101".parse().unwrap())), "#ff99ff");
        assert_eq!(fill_color(Some("11101".parse().unwrap())), "#ff3399");
        assert_eq!(fill_color(Some(Rumor::FALSE)), "#ff0000");
    }

    #[test]
    fn test_dot_output() {
        let graph = SocialGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let nodes = vec![
            NodeView { role: Role::Ordinary, opinion: Some(Rumor::TRUE) },
            NodeView { role: Role::Liar, opinion: Some(Rumor::FALSE) },
            NodeView { role: Role::Ordinary, opinion: None },
        ];

        let dot = DotFrame::capture(7, &graph, nodes).to_dot();

        assert!(dot.starts_with("graph rumor {"));
        assert!(dot.contains("label=\"t = 007\""));
        assert!(dot.contains("0 [label=\"\", fillcolor=\"#33ccff\"];"));
        assert!(dot.contains("1 [label=\"L\", fillcolor=\"#ff0000\"];"));
        assert!(dot.contains("2 [label=\"\", fillcolor=\"#ffffff\"];"));
        assert!(dot.contains("0 -- 1;"));
        assert!(dot.contains("1 -- 2;"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
