//! Keyed rank vectors.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::pagerank::RankRun;

/// Final rank per page, in graph order, with the run that produced it.
///
/// With the `serde` feature the lookup index is skipped on output and rebuilt on input; a
/// document whose `pages` and `run.scores` differ in length is rejected.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "RankingData<P>",
        bound(deserialize = "P: serde::Deserialize<'de> + Clone + Eq + Hash")
    )
)]
pub struct Ranking<P> {
    pages: Vec<P>,
    run: RankRun,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<P, usize>,
}

impl<P: Clone + Eq + Hash> Ranking<P> {
    /// Pair `pages` with `run.scores` position by position.
    ///
    /// # Panics
    ///
    /// If the two lengths differ.
    pub fn new(pages: Vec<P>, run: RankRun) -> Self {
        assert_eq!(
            pages.len(),
            run.scores.len(),
            "one score per page is required"
        );
        let index = pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), i))
            .collect();
        Self { pages, run, index }
    }

    pub fn get<Q>(&self, page: &Q) -> Option<f64>
    where
        P: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(page).map(|&i| self.run.scores[i])
    }

    /// Highest `k` pages, ties kept in graph order.
    pub fn top_k(&self, k: usize) -> Vec<(&P, f64)> {
        let mut ranked: Vec<(&P, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    pub fn into_map(self) -> HashMap<P, f64> {
        self.pages.into_iter().zip(self.run.scores).collect()
    }
}

impl<P> Ranking<P> {
    pub fn iter(&self) -> impl Iterator<Item = (&P, f64)> + '_ {
        self.pages.iter().zip(self.run.scores.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[P] {
        &self.pages
    }

    pub fn scores(&self) -> &[f64] {
        &self.run.scores
    }

    pub fn sum(&self) -> f64 {
        self.run.sum()
    }

    pub fn run(&self) -> &RankRun {
        &self.run
    }

    pub fn iterations(&self) -> usize {
        self.run.iterations
    }

    pub fn delta(&self) -> f64 {
        self.run.delta
    }

    pub fn converged(&self) -> bool {
        self.run.converged
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RankingData<P> {
    pages: Vec<P>,
    run: RankRun,
}

#[cfg(feature = "serde")]
impl<P: Clone + Eq + Hash> TryFrom<RankingData<P>> for Ranking<P> {
    type Error = crate::Error;

    fn try_from(data: RankingData<P>) -> crate::Result<Self> {
        if data.pages.len() != data.run.scores.len() {
            return Err(crate::Error::InvalidInput(format!(
                "{} pages but {} scores",
                data.pages.len(),
                data.run.scores.len()
            )));
        }
        Ok(Self::new(data.pages, data.run))
    }
}

impl<P: PartialEq> PartialEq for Ranking<P> {
    fn eq(&self, other: &Self) -> bool {
        self.pages == other.pages && self.run == other.run
    }
}

/// One `page: rank` line per page in graph order. Precision defaults to 6 digits and follows
/// the formatter (`{:.10}`).
impl<P: fmt::Display> fmt::Display for Ranking<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(6);
        for (i, (page, rank)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{page}: {rank:.precision$}")?;
        }
        Ok(())
    }
}
