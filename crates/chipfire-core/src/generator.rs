//! Puzzle generation: connected topology plus a solvable starting assignment.
//!
//! Generation runs in two phases, both by rejection sampling:
//!
//! 1. **Topology.** A Hamiltonian backbone `0-1-...-(n-1)` guarantees
//!    connectivity with `n-1` edges. Extra edges are drawn as random id
//!    pairs, discarding self-pairs and pairs that are already adjacent,
//!    until the target edge count is reached.
//! 2. **Values.** A whole chip vector is drawn, anchored to a target total
//!    `d >= G` where `G = n + e + 1`, and redrawn from scratch whenever it
//!    has no negative entry or its total falls short of `G`.
//!
//! Both loops carry an attempt guard from [`GeneratorConfig`] and report
//! [`CoreError::GenerationExhausted`] instead of spinning forever. When more
//! than half of all pairs must become edges, the extra edges are instead
//! drawn without replacement from the pairs still missing, so dense
//! topologies never depend on lucky rejection sampling.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, GenerationStage};
use crate::graph::ChipGraph;
use crate::id::NodeId;

/// How the accepted chip vector is mapped onto nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// Values land on nodes in the order they were drawn.
    #[default]
    Uniform,
    /// Values are sorted ascending and handed out by ascending node degree,
    /// so the least-connected nodes start poorest.
    DegreeWeighted,
}

/// Legal edge counts for a connected simple graph on `n` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeBounds {
    pub min: usize,
    pub max: usize,
}

impl EdgeBounds {
    /// `[n-1, n(n-1)/2]`. For `n == 0` both bounds are zero.
    pub fn for_nodes(nodes: usize) -> Self {
        EdgeBounds {
            min: nodes.saturating_sub(1),
            max: nodes.saturating_mul(nodes.saturating_sub(1)) / 2,
        }
    }

    pub fn contains(&self, edges: usize) -> bool {
        (self.min..=self.max).contains(&edges)
    }

    /// Clamps a requested edge count into range.
    pub fn clamp(&self, edges: usize) -> usize {
        edges.clamp(self.min, self.max)
    }
}

/// Largest accepted `bonus_ratio`: the target total stays within `2 * G`.
pub const MAX_BONUS_RATIO: f64 = 1.0;

/// Settings for one generated puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Target node count `n`.
    pub nodes: usize,
    /// Target edge count `e`.
    pub edges: usize,
    /// Mapping of drawn values onto nodes.
    pub strategy: AssignmentStrategy,
    /// Upper bound of the random bonus on top of `G`, as a fraction of `G`.
    pub bonus_ratio: f64,
    /// Guard for the extra-edge sampling loop. `None` derives it from the
    /// number of extra edges requested.
    pub max_edge_attempts: Option<usize>,
    /// Guard for the value sampling loop.
    pub max_assignment_attempts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            nodes: 10,
            edges: 15,
            strategy: AssignmentStrategy::Uniform,
            bonus_ratio: 0.3,
            max_edge_attempts: None,
            max_assignment_attempts: 10_000,
        }
    }
}

impl GeneratorConfig {
    /// Default settings for the given node and edge counts.
    pub fn new(nodes: usize, edges: usize) -> Self {
        GeneratorConfig {
            nodes,
            edges,
            ..Default::default()
        }
    }

    pub fn with_strategy(mut self, strategy: AssignmentStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_bonus_ratio(mut self, bonus_ratio: f64) -> Self {
        self.bonus_ratio = bonus_ratio;
        self
    }

    /// The generosity threshold `G = n + e + 1`, saturating at `i64::MAX`.
    pub fn threshold(&self) -> i64 {
        let g = self.nodes.saturating_add(self.edges).saturating_add(1);
        i64::try_from(g).unwrap_or(i64::MAX)
    }

    /// Attempt guard for rejection-sampled extra edges.
    ///
    /// Sparse targets (at most half of all pairs) accept each draw with
    /// probability above one half, so the derived default of sixteen draws
    /// per missing edge leaves ample slack.
    pub fn edge_attempt_budget(&self) -> usize {
        self.max_edge_attempts.unwrap_or_else(|| {
            let extra = self.edges.saturating_sub(self.nodes.saturating_sub(1));
            extra.saturating_mul(16).saturating_add(1000)
        })
    }

    /// Checks the node/edge domain and the remaining knobs.
    pub fn validate(&self) -> Result<(), CoreError> {
        let topology_error = |reason: String| CoreError::InvalidTopology {
            nodes: self.nodes,
            edges: self.edges,
            reason,
        };

        if self.nodes < 1 {
            return Err(topology_error("at least one node is required".into()));
        }
        if self.nodes > u32::MAX as usize {
            return Err(topology_error("node count exceeds id space".into()));
        }
        let bounds = EdgeBounds::for_nodes(self.nodes);
        if !bounds.contains(self.edges) {
            return Err(topology_error(format!(
                "edge count must lie in [{}, {}]",
                bounds.min, bounds.max
            )));
        }

        // G and the largest target 2G must both fit the chip type.
        let fits = self
            .nodes
            .checked_add(self.edges)
            .and_then(|g| g.checked_add(1))
            .and_then(|g| i64::try_from(g).ok())
            .and_then(|g| g.checked_mul(2))
            .is_some();
        if !fits {
            return Err(topology_error("chip threshold exceeds the value range".into()));
        }

        if !(0.0..=MAX_BONUS_RATIO).contains(&self.bonus_ratio) {
            return Err(CoreError::InvalidConfig {
                reason: format!(
                    "bonus ratio must lie in [0, {}], got {}",
                    MAX_BONUS_RATIO, self.bonus_ratio
                ),
            });
        }
        if self.max_edge_attempts == Some(0) || self.max_assignment_attempts == 0 {
            return Err(CoreError::InvalidConfig {
                reason: "attempt limits must be positive".into(),
            });
        }
        Ok(())
    }
}

/// Builds fresh puzzles from a validated [`GeneratorConfig`].
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Validates `config` up front so every later `generate` call starts from
    /// a legal domain.
    pub fn new(config: GeneratorConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Generator { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a connected graph with exactly `e` edges and a starting
    /// assignment that has a negative node and a total of at least `G`.
    ///
    /// The graph is only returned once both phases succeed.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ChipGraph, CoreError> {
        let mut graph = self.build_topology(rng)?;
        let values = self.draw_values(&graph, rng)?;
        graph.assign_values(&values);

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            total = graph.total_value(),
            negatives = graph.negative_count(),
            strategy = ?self.config.strategy,
            "generated puzzle"
        );
        Ok(graph)
    }

    /// Backbone path plus randomly placed extra edges.
    fn build_topology<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ChipGraph, CoreError> {
        let n = self.config.nodes as u32;
        let mut graph = ChipGraph::new(self.config.nodes);

        for i in 1..n {
            graph.add_edge(NodeId(i - 1), NodeId(i))?;
        }

        let max_edges = EdgeBounds::for_nodes(self.config.nodes).max;
        if self.config.edges > max_edges / 2 {
            fill_from_missing_pairs(&mut graph, self.config.edges, rng)?;
        } else {
            self.sample_extra_edges(&mut graph, rng)?;
        }
        Ok(graph)
    }

    /// Rejection sampling of random id pairs, bounded by the attempt budget.
    fn sample_extra_edges<R: Rng + ?Sized>(
        &self,
        graph: &mut ChipGraph,
        rng: &mut R,
    ) -> Result<(), CoreError> {
        let n = self.config.nodes as u32;
        let budget = self.config.edge_attempt_budget();
        let mut attempts = 0;
        while graph.edge_count() < self.config.edges {
            if attempts == budget {
                return Err(CoreError::GenerationExhausted {
                    stage: GenerationStage::EdgeSampling,
                    attempts,
                });
            }
            attempts += 1;

            let a = NodeId(rng.gen_range(0..n));
            let b = NodeId(rng.gen_range(0..n));
            if a == b || graph.has_edge(a, b) {
                continue;
            }
            graph.add_edge(a, b)?;
        }

        debug!(
            edges = graph.edge_count(),
            attempts, "extra edges sampled"
        );
        Ok(())
    }

    /// Draws whole chip vectors until one satisfies the starting invariant.
    fn draw_values<R: Rng + ?Sized>(
        &self,
        graph: &ChipGraph,
        rng: &mut R,
    ) -> Result<Vec<i64>, CoreError> {
        let n = graph.node_count();
        // One node can never be negative and hold a positive total at once.
        if n < 2 {
            return Err(CoreError::UnsatisfiableAssignment { nodes: n });
        }

        let overflow = || CoreError::InvalidConfig {
            reason: "chip totals overflow the value range".into(),
        };
        let threshold = self.config.threshold();
        for attempt in 1..=self.config.max_assignment_attempts {
            let target =
                target_total(threshold, self.config.bonus_ratio, rng).ok_or_else(overflow)?;
            let candidate = draw_candidate(n, target, rng).ok_or_else(overflow)?;
            if !satisfies_start_invariant(&candidate, threshold) {
                continue;
            }

            debug!(attempt, target, "chip vector accepted");
            return Ok(match self.config.strategy {
                AssignmentStrategy::Uniform => candidate,
                AssignmentStrategy::DegreeWeighted => order_by_degree(graph, candidate),
            });
        }

        Err(CoreError::GenerationExhausted {
            stage: GenerationStage::ValueAssignment,
            attempts: self.config.max_assignment_attempts,
        })
    }
}

/// Adds the missing edges by drawing, without replacement, from the pairs
/// that are not yet adjacent.
fn fill_from_missing_pairs<R: Rng + ?Sized>(
    graph: &mut ChipGraph,
    target: usize,
    rng: &mut R,
) -> Result<(), CoreError> {
    let n = graph.node_count() as u32;
    let missing: Vec<(NodeId, NodeId)> = (0..n)
        .flat_map(|a| (a + 1..n).map(move |b| (NodeId(a), NodeId(b))))
        .filter(|&(a, b)| !graph.has_edge(a, b))
        .collect();
    let needed = target.saturating_sub(graph.edge_count());

    for idx in index::sample(rng, missing.len(), needed).iter() {
        let (a, b) = missing[idx];
        graph.add_edge(a, b)?;
    }
    debug!(
        edges = graph.edge_count(),
        candidates = missing.len(),
        "extra edges drawn from missing pairs"
    );
    Ok(())
}

/// `d = G + round(U * ratio * G)`, or `None` if it leaves the value range.
fn target_total<R: Rng + ?Sized>(threshold: i64, bonus_ratio: f64, rng: &mut R) -> Option<i64> {
    let bonus = (rng.gen::<f64>() * bonus_ratio * threshold as f64).round();
    if !(0.0..i64::MAX as f64).contains(&bonus) {
        return None;
    }
    threshold.checked_add(bonus as i64)
}

/// Draws `n` signed values and shifts them so they sum to exactly `target`.
///
/// Magnitudes are uniform in `[0, spread]` with a fair random sign, where
/// `spread` is at least `n` and at least one more than the mean share of
/// `target`, so a negative survives the shift with fair probability.
/// Returns `None` if any intermediate total leaves the value range.
fn draw_candidate<R: Rng + ?Sized>(n: usize, target: i64, rng: &mut R) -> Option<Vec<i64>> {
    let count = i64::try_from(n).ok()?;
    let mean_share = target / count + i64::from(target % count != 0);
    let spread = count.max(mean_share.checked_add(1)?) as f64;

    let mut values: Vec<i64> = (0..n)
        .map(|_| {
            let magnitude = (rng.gen::<f64>() * spread).round() as i64;
            if rng.gen_bool(0.5) {
                magnitude
            } else {
                -magnitude
            }
        })
        .collect();

    let drawn = values.iter().try_fold(0i64, |acc, &v| acc.checked_add(v))?;
    let deficit = target.checked_sub(drawn)?;
    let base = deficit.div_euclid(count);
    let remainder = deficit.rem_euclid(count) as usize;
    for value in &mut values {
        *value = value.checked_add(base)?;
    }
    for idx in index::sample(rng, n, remainder).iter() {
        values[idx] = values[idx].checked_add(1)?;
    }
    Some(values)
}

/// Starts unsolved and carries at least `threshold` chips overall.
pub fn satisfies_start_invariant(values: &[i64], threshold: i64) -> bool {
    values.iter().any(|&v| v < 0) && values.iter().sum::<i64>() >= threshold
}

/// Hands the sorted values out by ascending `(degree, id)`.
fn order_by_degree(graph: &ChipGraph, mut values: Vec<i64>) -> Vec<i64> {
    values.sort_unstable();

    let mut order: Vec<(usize, NodeId)> = graph
        .nodes()
        .iter()
        .map(|node| (node.degree(), node.id))
        .collect();
    order.sort_unstable();

    let mut assigned = vec![0; values.len()];
    for ((_, id), value) in order.into_iter().zip(values) {
        assigned[id.index()] = value;
    }
    assigned
}
