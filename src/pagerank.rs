//! PageRank by damped power iteration.
//!
//! Every policy shares the update
//!
//! \[
//!   r'_p = \frac{1-d}{N} + d \sum_{q \to p} \frac{r_q}{|out(q)|}
//! \]
//!
//! where the sum runs once per link occurrence (a target listed twice by `q` receives two
//! shares). Policies differ only in dangling-mass handling and stopping:
//!
//! | policy | dangling mass | early stop |
//! |---|---|---|
//! | [`RankPolicy::Basic`] | leaks | no |
//! | [`RankPolicy::Dangling`] | `d * mass / N` to every page | no |
//! | [`RankPolicy::Convergence`] | leaks | L1 delta `< tolerance` |
//! | [`RankPolicy::DanglingConvergence`] | `d * mass / N` to every page | L1 delta `< tolerance` |

use std::hash::Hash;

use crate::graph::{GraphRef, Inbound, LinkGraph};
use crate::ranking::Ranking;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankConfig {
    pub damping: f64,
    /// Iteration budget.
    pub iterations: usize,
    /// L1 threshold for the early-stopping policies.
    pub tolerance: f64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            iterations: 100,
            tolerance: 1e-8,
        }
    }
}

impl RankConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Reject numeric settings the update rule cannot use.
    ///
    /// A zero iteration budget is valid and yields the uniform starting vector.
    pub fn validate(&self) -> Result<()> {
        if !self.damping.is_finite() {
            return Err(Error::InvalidInput("damping must be finite".to_string()));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(Error::InvalidInput(format!(
                "damping must be in [0,1] (got {})",
                self.damping
            )));
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(Error::InvalidInput(format!(
                "tolerance must be non-negative (got {})",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Dangling-mass and stopping behavior of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RankPolicy {
    /// Fixed budget, dangling mass leaks.
    Basic,
    /// Fixed budget, dangling mass spread evenly over all pages.
    Dangling,
    /// Stop once the L1 delta drops below tolerance, dangling mass leaks.
    Convergence,
    /// Dangling redistribution plus early stop.
    DanglingConvergence,
}

impl RankPolicy {
    pub fn redistributes_dangling(self) -> bool {
        matches!(self, Self::Dangling | Self::DanglingConvergence)
    }

    pub fn stops_early(self) -> bool {
        matches!(self, Self::Convergence | Self::DanglingConvergence)
    }
}

/// Scores plus convergence reporting.
///
/// `iterations` is the number of update steps performed and `delta` the L1 distance between
/// the last two snapshots (`INFINITY` when no step ran). `converged` is `delta < tolerance`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankRun {
    pub scores: Vec<f64>,
    pub iterations: usize,
    pub delta: f64,
    pub converged: bool,
}

impl RankRun {
    pub fn sum(&self) -> f64 {
        self.scores.iter().sum()
    }
}

/// Index-level PageRank over any [`GraphRef`].
///
/// Fails with [`Error::InvalidInput`] for a bad `config` and [`Error::EmptyGraph`] when the
/// graph has no nodes. Nothing is computed in either case.
pub fn rank_run<G: GraphRef + ?Sized>(
    graph: &G,
    config: RankConfig,
    policy: RankPolicy,
) -> Result<RankRun> {
    config.validate()?;
    let n = graph.node_count();
    if n == 0 {
        return Err(Error::EmptyGraph);
    }
    let inbound = Inbound::from_graph(graph);
    let out_degrees: Vec<usize> = (0..n).map(|u| graph.out_degree(u)).collect();
    let run = power_iterate(&inbound, &out_degrees, config, policy);
    tracing::info!(
        ?policy,
        pages = n,
        iterations = run.iterations,
        delta = run.delta,
        converged = run.converged,
        "pagerank finished"
    );
    Ok(run)
}

fn power_iterate(
    inbound: &Inbound,
    out_degrees: &[usize],
    config: RankConfig,
    policy: RankPolicy,
) -> RankRun {
    let n = out_degrees.len();
    let n_f64 = n as f64;
    let d = config.damping;
    let teleport = (1.0 - d) / n_f64;

    let mut scores = vec![1.0 / n_f64; n];
    let mut iterations = 0usize;
    let mut delta = f64::INFINITY;

    for _ in 0..config.iterations {
        iterations += 1;
        // Dangling mass is read from the snapshot being replaced.
        let dangling_share = if policy.redistributes_dangling() {
            let mass: f64 = out_degrees
                .iter()
                .zip(&scores)
                .filter(|(&deg, _)| deg == 0)
                .map(|(_, &s)| s)
                .sum();
            d * mass / n_f64
        } else {
            0.0
        };

        let next = next_snapshot(&scores, inbound, out_degrees, d, teleport, dangling_share);
        delta = scores
            .iter()
            .zip(next.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();
        scores = next;
        tracing::debug!(
            iteration = iterations,
            delta,
            sum = scores.iter().sum::<f64>(),
            "pagerank step"
        );

        if policy.stops_early() && delta < config.tolerance {
            break;
        }
    }

    RankRun {
        scores,
        iterations,
        delta,
        converged: delta < config.tolerance,
    }
}

/// Build the next snapshot from `scores` without touching it.
fn next_snapshot(
    scores: &[f64],
    inbound: &Inbound,
    out_degrees: &[usize],
    d: f64,
    teleport: f64,
    dangling_share: f64,
) -> Vec<f64> {
    let update = |p: usize| {
        // Every source listed here links to `p`, so its out-degree is at least 1.
        let link_sum: f64 = inbound
            .sources(p)
            .iter()
            .map(|&q| scores[q] / out_degrees[q] as f64)
            .sum();
        teleport + d * link_sum + dangling_share
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..scores.len()).into_par_iter().map(update).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..scores.len()).map(update).collect()
    }
}

/// Keyed PageRank over a [`LinkGraph`].
pub fn rank<P: Clone + Eq + Hash>(
    graph: &LinkGraph<P>,
    config: RankConfig,
    policy: RankPolicy,
) -> Result<Ranking<P>> {
    let run = rank_run(graph, config, policy)?;
    Ok(Ranking::new(graph.pages().to_vec(), run))
}

/// Fixed number of updates; rank held by dangling pages is lost each step.
pub fn rank_basic<P: Clone + Eq + Hash>(
    graph: &LinkGraph<P>,
    config: RankConfig,
) -> Result<Ranking<P>> {
    rank(graph, config, RankPolicy::Basic)
}

/// Fixed number of updates with dangling mass spread evenly, so ranks keep summing to 1.
pub fn rank_with_dangling<P: Clone + Eq + Hash>(
    graph: &LinkGraph<P>,
    config: RankConfig,
) -> Result<Ranking<P>> {
    rank(graph, config, RankPolicy::Dangling)
}

/// Basic updates that stop as soon as the L1 change drops below `config.tolerance`.
///
/// The snapshot that satisfied the test is the one returned. When the budget runs out first,
/// the last computed snapshot is returned with `converged == false`.
pub fn rank_with_convergence<P: Clone + Eq + Hash>(
    graph: &LinkGraph<P>,
    config: RankConfig,
) -> Result<Ranking<P>> {
    rank(graph, config, RankPolicy::Convergence)
}

pub fn rank_with_dangling_and_convergence<P: Clone + Eq + Hash>(
    graph: &LinkGraph<P>,
    config: RankConfig,
) -> Result<Ranking<P>> {
    rank(graph, config, RankPolicy::DanglingConvergence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct VecGraph {
        adj: Vec<Vec<usize>>,
    }

    impl GraphRef for VecGraph {
        fn node_count(&self) -> usize {
            self.adj.len()
        }
        fn neighbors_ref(&self, node: usize) -> &[usize] {
            &self.adj[node]
        }
    }

    /// Full scan over all sources per target, one share per link occurrence.
    fn naive_step(adj: &[Vec<usize>], scores: &[f64], d: f64, dangling: bool) -> Vec<f64> {
        let n = adj.len();
        let n_f64 = n as f64;
        let share = if dangling {
            let mass: f64 = (0..n)
                .filter(|&q| adj[q].is_empty())
                .map(|q| scores[q])
                .sum();
            d * mass / n_f64
        } else {
            0.0
        };
        (0..n)
            .map(|p| {
                let mut link_sum = 0.0;
                for q in 0..n {
                    for &t in &adj[q] {
                        if t == p {
                            link_sum += scores[q] / adj[q].len() as f64;
                        }
                    }
                }
                (1.0 - d) / n_f64 + d * link_sum + share
            })
            .collect()
    }

    #[test]
    fn empty_graph_is_an_error() {
        let g = VecGraph { adj: vec![] };
        for policy in [
            RankPolicy::Basic,
            RankPolicy::Dangling,
            RankPolicy::Convergence,
            RankPolicy::DanglingConvergence,
        ] {
            let err = rank_run(&g, RankConfig::default(), policy).unwrap_err();
            assert!(matches!(err, Error::EmptyGraph));
        }
    }

    #[test]
    fn config_rejects_bad_numbers() {
        let g = VecGraph { adj: vec![vec![]] };
        for config in [
            RankConfig::default().with_tolerance(-1e-3),
            RankConfig::default().with_tolerance(f64::NAN),
            RankConfig::default().with_damping(1.5),
            RankConfig::default().with_damping(f64::NAN),
        ] {
            let err = rank_run(&g, config, RankPolicy::Basic).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{config:?}");
        }
    }

    #[test]
    fn zero_iterations_returns_uniform_start() {
        let g = VecGraph {
            adj: vec![vec![1], vec![]],
        };
        let config = RankConfig::default().with_iterations(0);
        let run = rank_run(&g, config, RankPolicy::Basic).unwrap();
        assert_eq!(run.scores, vec![0.5, 0.5]);
        assert_eq!(run.iterations, 0);
        assert!(!run.converged);
    }

    #[test]
    fn isolated_page_basic_vs_dangling() {
        let g = VecGraph { adj: vec![vec![]] };
        let config = RankConfig::default().with_iterations(5);
        let basic = rank_run(&g, config, RankPolicy::Basic).unwrap();
        assert!((basic.scores[0] - 0.15).abs() < 1e-12, "{}", basic.scores[0]);
        let dangling = rank_run(&g, config, RankPolicy::Dangling).unwrap();
        assert!((dangling.scores[0] - 1.0).abs() < 1e-12, "{}", dangling.scores[0]);
    }

    #[test]
    fn duplicate_targets_receive_one_share_per_occurrence() {
        // 0 -> 1, 1, 2 ; 1 -> 0 ; 2 -> 0
        let adj = vec![vec![1, 1, 2], vec![0], vec![0]];
        let g = VecGraph { adj: adj.clone() };
        let config = RankConfig::default().with_iterations(1);
        let run = rank_run(&g, config, RankPolicy::Basic).unwrap();
        let third = 1.0 / 3.0;
        let d = 0.85;
        let expected_1 = (1.0 - d) / 3.0 + d * (2.0 * third / 3.0);
        let expected_2 = (1.0 - d) / 3.0 + d * (third / 3.0);
        assert!((run.scores[1] - expected_1).abs() < 1e-15);
        assert!((run.scores[2] - expected_2).abs() < 1e-15);
        assert!(run.scores[1] > run.scores[2]);
    }

    #[test]
    fn convergence_stops_before_budget_on_cycle() {
        let g = VecGraph {
            adj: vec![vec![1], vec![2], vec![0]],
        };
        let run = rank_run(&g, RankConfig::default(), RankPolicy::Convergence).unwrap();
        assert!(run.converged);
        assert!(run.iterations < 100);
        for s in &run.scores {
            assert!((s - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn convergence_budget_exhausted_returns_last_snapshot() {
        let adj = vec![vec![1, 2], vec![2], vec![0], vec![]];
        let g = VecGraph { adj };
        let config = RankConfig::default().with_iterations(3).with_tolerance(0.0);
        let gated = rank_run(&g, config, RankPolicy::Convergence).unwrap();
        let basic = rank_run(&g, config, RankPolicy::Basic).unwrap();
        assert_eq!(gated.iterations, 3);
        assert!(!gated.converged);
        assert_eq!(gated.scores, basic.scores);
    }

    #[test]
    fn out_of_range_neighbor_is_skipped_and_leaks() {
        // node 0 lists a neighbor (7) the graph does not have
        let g = VecGraph {
            adj: vec![vec![1, 7], vec![0]],
        };
        let inbound = Inbound::from_graph(&g);
        assert_eq!(inbound.sources(0), &[1]);
        assert_eq!(inbound.sources(1), &[0]);

        let config = RankConfig::default().with_iterations(1);
        let run = rank_run(&g, config, RankPolicy::Dangling).unwrap();
        // 0.075 + 0.85 * 0.5 for node 0, 0.075 + 0.85 * 0.25 for node 1
        assert!((run.scores[0] - 0.5).abs() < 1e-12, "{}", run.scores[0]);
        assert!((run.scores[1] - 0.2875).abs() < 1e-12, "{}", run.scores[1]);
        assert!(run.sum() < 0.8, "sum={}", run.sum());
    }

    proptest! {
        #[test]
        fn prop_inbound_index_matches_full_scan(
            n in 1usize..9,
            edges in proptest::collection::vec((0usize..9, 0usize..9), 0..30),
            dangling in any::<bool>(),
            iterations in 1usize..6,
        ) {
            let mut adj = vec![Vec::new(); n];
            for (u, v) in edges {
                if u < n && v < n {
                    adj[u].push(v);
                }
            }
            let d = 0.85;
            let mut expected = vec![1.0 / n as f64; n];
            for _ in 0..iterations {
                expected = naive_step(&adj, &expected, d, dangling);
            }
            let policy = if dangling { RankPolicy::Dangling } else { RankPolicy::Basic };
            let g = VecGraph { adj };
            let config = RankConfig::default().with_iterations(iterations);
            let run = rank_run(&g, config, policy).unwrap();
            prop_assert_eq!(run.scores, expected);
        }

        #[test]
        fn prop_dangling_policy_sums_to_one(
            n in 1usize..10,
            edges in proptest::collection::vec((0usize..10, 0usize..10), 0..40),
            iterations in 1usize..30,
        ) {
            let mut adj = vec![Vec::new(); n];
            for (u, v) in edges {
                if u < n && v < n {
                    adj[u].push(v);
                }
            }
            let g = VecGraph { adj };
            let config = RankConfig::default().with_iterations(iterations);
            let run = rank_run(&g, config, RankPolicy::Dangling).unwrap();
            prop_assert_eq!(run.scores.len(), n);
            let sum = run.sum();
            prop_assert!((sum - 1.0).abs() < 1e-9, "sum={}", sum);
            prop_assert!(run.scores.iter().all(|x| *x >= 0.0));
        }

        #[test]
        fn prop_basic_never_gains_mass(
            n in 1usize..10,
            edges in proptest::collection::vec((0usize..10, 0usize..10), 0..40),
        ) {
            let mut adj = vec![Vec::new(); n];
            for (u, v) in edges {
                if u < n && v < n {
                    adj[u].push(v);
                }
            }
            let g = VecGraph { adj };
            let config = RankConfig::default().with_iterations(10);
            let run = rank_run(&g, config, RankPolicy::Basic).unwrap();
            prop_assert!(run.sum() <= 1.0 + 1e-9, "sum={}", run.sum());
        }
    }
}
