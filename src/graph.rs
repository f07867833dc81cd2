//! Link graph construction.
//!
//! A [`LinkGraph`] maps every page to the ordered sequence of pages it links to. Pages are
//! interned densely (`0..n`) in first-seen order, so rank vectors are plain `Vec<f64>`s indexed
//! by position and the page labels ride alongside for keyed lookup.
//!
//! Invariants:
//! - Every page that appears as a source or a target is a key; pages without outbound links
//!   map to an empty sequence (dangling pages).
//! - Outbound sequences keep input order, including self-loops and duplicate targets.
//! - The graph is never mutated by rank computation.

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::{Error, Result};

/// Index-level adapter over a directed graph.
///
/// Nodes are `0..node_count()`. `neighbors_ref(u)` lists `u`'s outbound targets, one entry per
/// link occurrence.
pub trait GraphRef {
    fn node_count(&self) -> usize;

    fn neighbors_ref(&self, node: usize) -> &[usize];

    fn out_degree(&self, node: usize) -> usize {
        self.neighbors_ref(node).len()
    }
}

/// Directed hyperlink graph keyed by page identifier.
#[derive(Debug, Clone)]
pub struct LinkGraph<P> {
    pages: Vec<P>,
    index: HashMap<P, usize>,
    links: Vec<Vec<usize>>,
}

impl<P> Default for LinkGraph<P> {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            index: HashMap::new(),
            links: Vec::new(),
        }
    }
}

impl<P: Clone + Eq + Hash> LinkGraph<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an ordered edge list.
    ///
    /// For each `(source, target)` the target is appended to the source's outbound list, and
    /// the target gets an (initially empty) entry if it has not been seen yet.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (P, P)>,
    {
        let mut graph = Self::new();
        for (source, target) in edges {
            graph.add_link(source, target);
        }
        tracing::debug!(
            pages = graph.len(),
            links = graph.link_count(),
            "built link graph from edges"
        );
        graph
    }

    /// Checked construction from possibly-missing identifiers.
    ///
    /// The whole input is validated before anything is built: an edge with a missing source
    /// or target fails with [`Error::InvalidInput`] naming its position.
    pub fn try_from_edges<I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Option<P>, Option<P>)>,
    {
        let mut complete = Vec::new();
        for (i, edge) in edges.into_iter().enumerate() {
            match edge {
                (Some(source), Some(target)) => complete.push((source, target)),
                (None, _) => {
                    return Err(Error::InvalidInput(format!(
                        "edge {i} is missing its source page"
                    )))
                }
                (_, None) => {
                    return Err(Error::InvalidInput(format!(
                        "edge {i} is missing its target page"
                    )))
                }
            }
        }
        Ok(Self::from_edges(complete))
    }

    /// Build a graph from `(page, outbound links)` entries.
    ///
    /// Listed pages keep their listed order; targets that are never listed as a key are
    /// appended afterwards as dangling pages. Listing the same page twice extends its links.
    pub fn from_adjacency<I, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, T)>,
        T: IntoIterator<Item = P>,
    {
        let mut graph = Self::new();
        // Intern every key before any target so targets cannot reorder the keys.
        let keyed: Vec<(usize, T)> = entries
            .into_iter()
            .map(|(page, targets)| (graph.add_page(page), targets))
            .collect();
        for (u, targets) in keyed {
            for target in targets {
                let v = graph.add_page(target);
                graph.links[u].push(v);
            }
        }
        tracing::debug!(
            pages = graph.len(),
            links = graph.link_count(),
            "built link graph from adjacency"
        );
        graph
    }

    /// Intern `page`, returning its position. Existing pages keep their links.
    pub fn add_page(&mut self, page: P) -> usize {
        if let Some(&id) = self.index.get(&page) {
            return id;
        }
        let id = self.pages.len();
        self.index.insert(page.clone(), id);
        self.pages.push(page);
        self.links.push(Vec::new());
        id
    }

    /// Append one `source -> target` link, interning both pages (source first).
    pub fn add_link(&mut self, source: P, target: P) {
        let u = self.add_page(source);
        let v = self.add_page(target);
        self.links[u].push(v);
    }

    /// Copy of this graph with repeated targets removed from every outbound list.
    ///
    /// Only the first occurrence of each target is kept. This changes fan-out and therefore
    /// rank values; rank computation never applies it on its own.
    pub fn deduplicated(&self) -> Self {
        let links = self
            .links
            .iter()
            .map(|targets| {
                let mut seen = HashSet::with_capacity(targets.len());
                targets
                    .iter()
                    .copied()
                    .filter(|v| seen.insert(*v))
                    .collect()
            })
            .collect();
        Self {
            pages: self.pages.clone(),
            index: self.index.clone(),
            links,
        }
    }

    pub fn index_of<Q>(&self, page: &Q) -> Option<usize>
    where
        P: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(page).copied()
    }

    pub fn contains<Q>(&self, page: &Q) -> bool
    where
        P: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(page)
    }

    /// Outbound links of `page` in input order, or `None` for an unknown page.
    pub fn links<Q>(&self, page: &Q) -> Option<impl Iterator<Item = &P> + '_>
    where
        P: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let u = self.index_of(page)?;
        Some(self.links[u].iter().map(move |&v| &self.pages[v]))
    }

    /// `Some(true)` when `page` has no outbound links, `None` for an unknown page.
    pub fn is_dangling<Q>(&self, page: &Q) -> Option<bool>
    where
        P: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index_of(page).map(|u| self.links[u].is_empty())
    }
}

impl<P> LinkGraph<P> {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of link occurrences.
    pub fn link_count(&self) -> usize {
        self.links.iter().map(Vec::len).sum()
    }

    /// Pages in graph order.
    pub fn pages(&self) -> &[P] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&P> {
        self.pages.get(index)
    }

    pub fn dangling_pages(&self) -> impl Iterator<Item = &P> + '_ {
        self.pages
            .iter()
            .zip(&self.links)
            .filter(|(_, targets)| targets.is_empty())
            .map(|(page, _)| page)
    }

    /// Every link as `(source, target)`, sources in graph order and targets in input order.
    pub fn edges(&self) -> impl Iterator<Item = (&P, &P)> + '_ {
        self.links
            .iter()
            .enumerate()
            .flat_map(|(u, targets)| targets.iter().map(move |&v| (u, v)))
            .map(move |(u, v)| (&self.pages[u], &self.pages[v]))
    }

    /// Reverse-adjacency index for this graph.
    pub fn inbound(&self) -> Inbound {
        Inbound::from_graph(self)
    }
}

impl<P> GraphRef for LinkGraph<P> {
    fn node_count(&self) -> usize {
        self.pages.len()
    }

    fn neighbors_ref(&self, node: usize) -> &[usize] {
        &self.links[node]
    }
}

impl<P: Clone + Eq + Hash> FromIterator<(P, P)> for LinkGraph<P> {
    fn from_iter<I: IntoIterator<Item = (P, P)>>(iter: I) -> Self {
        Self::from_edges(iter)
    }
}

/// One line per page: `A -> [B, C]`.
impl<P: fmt::Display> fmt::Display for LinkGraph<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (u, page) in self.pages.iter().enumerate() {
            if u > 0 {
                writeln!(f)?;
            }
            write!(f, "{page} -> [")?;
            for (i, &v) in self.links[u].iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.pages[v])?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Inbound contributors per node.
///
/// `sources(v)` lists every `u` with a link `u -> v`, once per link occurrence, in ascending
/// `u`. Summing over it visits contributors in the same order as a full scan over all pages,
/// so rank sums are bit-identical to the scan while costing O(E) per iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    sources: Vec<Vec<usize>>,
}

impl Inbound {
    pub fn from_graph<G: GraphRef + ?Sized>(graph: &G) -> Self {
        let n = graph.node_count();
        let mut sources = vec![Vec::new(); n];
        for u in 0..n {
            for &v in graph.neighbors_ref(u) {
                if v >= n {
                    // Adapter contract violation. The link still counts toward `u`'s
                    // out-degree, so the share it would carry leaks out of the ranks.
                    continue;
                }
                sources[v].push(u);
            }
        }
        Self { sources }
    }

    pub fn node_count(&self) -> usize {
        self.sources.len()
    }

    pub fn sources(&self, node: usize) -> &[usize] {
        &self.sources[node]
    }
}
