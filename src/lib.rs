//! `linkrank`: PageRank over hyperlink graphs.
//!
//! Edges go in, a [`LinkGraph`] is built once, and one of the rank policies turns it into a
//! [`Ranking`]. Rendering is a separate sink behind [`Renderer`].
//!
//! Public invariants (must not drift):
//! - **Page order**: graphs, rank vectors and listings follow first-seen page order.
//! - **Per-occurrence links**: a target listed `k` times by a source receives `k` shares of
//!   that source's rank; fan-out counts every occurrence. [`LinkGraph::deduplicated`] is the
//!   only way to collapse repeats.
//! - **Snapshots**: each iteration reads the previous rank vector and produces a new one;
//!   nothing is updated in place.
//! - **Mass**: only the dangling-aware policies keep ranks summing to 1. The basic and
//!   convergence-gated policies let dangling pages leak mass.
//! - **Determinism**: identical inputs and configs give identical outputs, with or without
//!   the `parallel` feature.
//!
//! ```
//! use linkrank::{rank_with_dangling, LinkGraph, RankConfig};
//!
//! let graph = LinkGraph::from_edges([("A", "B"), ("B", "C"), ("C", "A"), ("C", "D")]);
//! let ranking = rank_with_dangling(&graph, RankConfig::default()).unwrap();
//! assert!((ranking.sum() - 1.0).abs() < 1e-9);
//! ```

pub mod edges;
pub mod graph;
pub mod pagerank;
pub mod ranking;
pub mod render;

pub use edges::parse_edges;
pub use graph::{GraphRef, Inbound, LinkGraph};
pub use pagerank::{rank, rank_run, RankConfig, RankPolicy, RankRun};
pub use pagerank::{
    rank_basic, rank_with_convergence, rank_with_dangling, rank_with_dangling_and_convergence,
};
pub use ranking::Ranking;
pub use render::{DotRenderer, Renderer};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("graph has no pages")]
    EmptyGraph,
}

pub type Result<T> = std::result::Result<T, Error>;
