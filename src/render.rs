//! Rendering boundary.
//!
//! Rank computation hands a renderer two read-only views, the [`LinkGraph`] for its edges and
//! the [`Ranking`] for per-page weight, and consumes nothing back. [`DotRenderer`] is the
//! bundled sink: it writes a Graphviz digraph whose node sizes follow rank.

use std::fmt;
use std::hash::Hash;
use std::io::{self, Write};

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::{GraphRef, LinkGraph};
use crate::ranking::Ranking;

pub trait Renderer<P> {
    type Error;

    fn render(&mut self, graph: &LinkGraph<P>, ranking: &Ranking<P>) -> Result<(), Self::Error>;
}

/// Graphviz DOT writer.
///
/// Node area is proportional to rank: `width = scale * sqrt(rank)` inches, filled sky blue.
/// Pages missing from the ranking are drawn at zero rank. One edge is drawn per link
/// occurrence.
#[derive(Debug)]
pub struct DotRenderer<W> {
    out: W,
    scale: f64,
}

impl<W: Write> DotRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, scale: 3.0 }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<P, W> Renderer<P> for DotRenderer<W>
where
    P: fmt::Display + Clone + Eq + Hash,
    W: Write,
{
    type Error = io::Error;

    fn render(&mut self, graph: &LinkGraph<P>, ranking: &Ranking<P>) -> io::Result<()> {
        let n = graph.node_count();
        let mut g: DiGraph<String, &str> = DiGraph::with_capacity(n, graph.link_count());
        for page in graph.pages() {
            g.add_node(page.to_string());
        }
        for u in 0..n {
            for &v in graph.neighbors_ref(u) {
                g.add_edge(NodeIndex::new(u), NodeIndex::new(v), "");
            }
        }

        let widths: Vec<f64> = graph
            .pages()
            .iter()
            .map(|p| self.scale * ranking.get(p).unwrap_or(0.0).max(0.0).sqrt())
            .collect();
        // Bound before `dot`, which borrows it until the write below.
        let node_attrs = |_, (index, _): (NodeIndex, &String)| {
            format!(
                "style=filled fillcolor=skyblue fixedsize=true width={:.3} ",
                widths[index.index()]
            )
        };
        let dot = Dot::with_attr_getters(
            &g,
            &[Config::EdgeNoLabel],
            &|_, _| String::new(),
            &node_attrs,
        );
        write!(self.out, "{dot}")?;
        self.out.flush()?;
        tracing::debug!(pages = n, links = g.edge_count(), "rendered dot graph");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagerank::{rank_with_dangling, RankConfig};

    #[test]
    fn dot_has_one_node_per_page_and_one_edge_per_link() {
        let graph = LinkGraph::from_edges([("A", "B"), ("A", "B"), ("B", "C"), ("C", "A")]);
        let ranking = rank_with_dangling(&graph, RankConfig::default()).unwrap();

        let mut renderer = DotRenderer::new(Vec::new());
        renderer.render(&graph, &ranking).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();

        assert!(text.starts_with("digraph"));
        assert_eq!(text.matches(" -> ").count(), graph.link_count());
        assert_eq!(text.matches("fillcolor=skyblue").count(), graph.len());
        for page in ["A", "B", "C"] {
            assert!(text.contains(&format!("label = \"{page}\"")), "{text}");
        }
    }

    #[test]
    fn higher_rank_draws_wider_node() {
        let graph = LinkGraph::from_edges([("A", "HUB"), ("B", "HUB"), ("C", "HUB")]);
        let ranking = rank_with_dangling(&graph, RankConfig::default()).unwrap();

        let mut renderer = DotRenderer::new(Vec::new()).with_scale(1.0);
        renderer.render(&graph, &ranking).unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();

        let width_of = |label: &str| -> f64 {
            let line = text
                .lines()
                .find(|l| l.contains(&format!("label = \"{label}\"")))
                .unwrap();
            let start = line.find("width=").unwrap() + "width=".len();
            line[start..].split_whitespace().next().unwrap().parse().unwrap()
        };
        assert!(width_of("HUB") > width_of("A"));
    }
}
