//! Enumerative synthesis with constant-solving fallback
//!
//! Depth by depth, the frontier of the enumerator is checked against every
//! example. Candidates are never evaluated from scratch: every materialized
//! arena node keeps its value on each example, so checking a candidate is one
//! operation per example on cached child values. Candidates that fail on some
//! example are dropped for good, since any tree containing them fails too.

use crate::error::CannotSynthesize;
use crate::ir::Expr;
use crate::matrix::ConcreteMatrix;
use crate::search::Synthesizer;
use crate::search::config::SearchConfig;
use crate::search::enumerate::{Enumerator, Frontier, Node};
use crate::search::examples::ExampleSet;
use crate::search::parallel::{ParallelConfig, check_frontier_parallel};
use crate::search::result::{SearchPhase, SearchStatistics};
use crate::search::symbolic::ConstantSolver;
use crate::search::symbolic::synthesis::reproduces;
use crate::semantics::apply;
use std::ops::Range;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// How often (in candidates) the deadline is checked
const DEADLINE_CHECK_INTERVAL: usize = 256;

/// Value of every materialized node on every example, indexed by node id
pub type ValueCache = Vec<Vec<ConcreteMatrix>>;

/// Result of checking a range of frontier candidates
#[derive(Debug, Default)]
pub struct CheckOutcome {
    /// Frontier index of the first candidate matching every example
    pub matched: Option<usize>,
    /// Well-typed candidates with their values, in frontier order
    pub kept: Vec<(Node, Vec<ConcreteMatrix>)>,
    pub statistics: SearchStatistics,
    pub timed_out: bool,
    /// More candidates survived than could be stored; `kept` is empty
    pub truncated: bool,
}

impl CheckOutcome {
    /// Store a surviving candidate, or drop everything once `limit` is exceeded
    fn keep(&mut self, node: Node, values: Vec<ConcreteMatrix>, limit: usize) {
        if self.truncated {
            return;
        }
        if self.kept.len() >= limit {
            self.truncated = true;
            self.kept = Vec::new();
            return;
        }
        self.kept.push((node, values));
    }
}

/// Values of `node` on every example, or `None` if it fails on any of them
fn evaluate_node(node: Node, cache: &[Vec<ConcreteMatrix>]) -> Option<Vec<ConcreteMatrix>> {
    match node {
        Node::Variable(i) => cache.get(i).cloned(),
        Node::Call { op, receiver, arg } => {
            let receivers = &cache[receiver];
            (0..receivers.len())
                .map(|e| {
                    let args: Vec<&ConcreteMatrix> = arg.map(|a| &cache[a][e]).into_iter().collect();
                    apply(&op, &receivers[e], &args).ok()
                })
                .collect()
        }
    }
}

fn matches_outputs(values: &[ConcreteMatrix], examples: &ExampleSet) -> bool {
    values
        .iter()
        .zip(examples)
        .all(|(value, example)| *value == example.output)
}

/// Check frontier candidates in `range`, in order.
///
/// Stops at the first match, at the deadline, or as soon as `superseded`
/// reports that an earlier match makes the rest of the range irrelevant.
/// At most `store_limit` surviving candidates are kept; past that the range
/// is still checked but the outcome is marked `truncated`.
pub fn check_range(
    frontier: &Frontier,
    range: Range<usize>,
    cache: &[Vec<ConcreteMatrix>],
    examples: &ExampleSet,
    deadline: Option<Instant>,
    store_limit: usize,
    superseded: impl Fn(usize) -> bool,
) -> CheckOutcome {
    let mut outcome = CheckOutcome::default();

    for (checked, (index, node)) in frontier.slice(range).enumerate() {
        if checked % DEADLINE_CHECK_INTERVAL == 0 {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                outcome.timed_out = true;
                break;
            }
            if superseded(index) {
                break;
            }
        }

        outcome.statistics.candidates_evaluated += 1;
        let Some(values) = evaluate_node(node, cache) else {
            outcome.statistics.candidates_rejected += 1;
            continue;
        };
        if matches_outputs(&values, examples) {
            outcome.matched = Some(index);
            break;
        }
        outcome.keep(node, values, store_limit);
    }

    outcome.statistics.nodes_materialized = outcome.kept.len() as u64;
    outcome
}

/// Synthesizer that enumerates trees in increasing depth
pub struct EnumerativeSynthesizer {
    config: SearchConfig,
    statistics: SearchStatistics,
}

impl EnumerativeSynthesizer {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            statistics: SearchStatistics::default(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn enter(&mut self, phase: SearchPhase) {
        if self.config.verbose {
            info!(%phase, "phase transition");
        } else {
            debug!(%phase, "phase transition");
        }
        self.statistics.phase = phase;
    }

    fn found(&mut self, program: Expr, start: Instant) -> Expr {
        self.enter(SearchPhase::Found);
        self.statistics.elapsed_time = start.elapsed();
        info!(
            %program,
            depth = program.depth(),
            elapsed = ?self.statistics.elapsed_time,
            "program found"
        );
        program
    }

    fn failed(&mut self, reason: String, start: Instant) -> CannotSynthesize {
        self.enter(SearchPhase::Failed);
        self.statistics.elapsed_time = start.elapsed();
        info!(%reason, elapsed = ?self.statistics.elapsed_time, "synthesis failed");
        CannotSynthesize {
            reason,
            depth_reached: self.statistics.depth_reached,
            elapsed: self.statistics.elapsed_time,
            candidates_evaluated: self.statistics.candidates_evaluated,
        }
    }

    /// Structural search; returns the program or the phase it stopped in
    fn search_structurally(
        &mut self,
        examples: &ExampleSet,
        deadline: Option<Instant>,
    ) -> Result<Expr, SearchPhase> {
        let num_variables = examples.num_variables();
        let mut enumerator = Enumerator::new(self.config.grammar.clone(), num_variables);
        let mut cache: ValueCache = (0..num_variables)
            .map(|i| examples.iter().map(|e| e.inputs[i].clone()).collect())
            .collect();

        self.enter(SearchPhase::Searching { depth: 0 });
        for (i, values) in cache.iter().enumerate() {
            self.statistics.candidates_evaluated += 1;
            if matches_outputs(values, examples) {
                return Ok(Expr::var(i));
            }
        }

        let parallel = ParallelConfig::default().with_workers(self.config.workers);
        let mut depth = 0;
        loop {
            if self.config.max_depth.is_some_and(|max| depth >= max) {
                return Err(SearchPhase::Exhausted { depth });
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(SearchPhase::TimedOut { depth });
            }
            let frontier = enumerator.frontier();
            if frontier.is_empty() {
                return Err(SearchPhase::Exhausted { depth });
            }

            depth += 1;
            self.enter(SearchPhase::Searching { depth });
            debug!(depth, candidates = frontier.len(), "checking frontier");

            // The last depth is never built on
            let store_limit = if self.config.max_depth == Some(depth) {
                0
            } else {
                self.config
                    .max_nodes
                    .map_or(usize::MAX, |max| max.saturating_sub(cache.len()))
            };
            let outcome = if parallel.num_workers > 1 {
                check_frontier_parallel(&frontier, &cache, examples, deadline, store_limit, &parallel)
            } else {
                check_range(
                    &frontier,
                    0..frontier.len(),
                    &cache,
                    examples,
                    deadline,
                    store_limit,
                    |_| false,
                )
            };
            self.statistics.merge(&outcome.statistics);
            self.statistics.depth_reached = depth;

            if let Some(index) = outcome.matched {
                if let Some(node) = frontier.get(index) {
                    let program = enumerator.arena().build(node);
                    if reproduces(&program, examples) {
                        return Ok(program);
                    }
                    warn!(%program, "cached evaluation disagrees with tree evaluation");
                }
            }
            if outcome.timed_out {
                return Err(SearchPhase::TimedOut { depth });
            }
            if outcome.truncated {
                if store_limit > 0 {
                    warn!(
                        depth,
                        max_nodes = ?self.config.max_nodes,
                        "node limit reached, not searching deeper"
                    );
                }
                return Err(SearchPhase::Exhausted { depth });
            }

            let (nodes, values): (Vec<Node>, Vec<Vec<ConcreteMatrix>>) =
                outcome.kept.into_iter().unzip();
            debug!(depth, kept = nodes.len(), "level materialized");
            enumerator.push_level(nodes);
            cache.extend(values);
        }
    }
}

impl Default for EnumerativeSynthesizer {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Synthesizer for EnumerativeSynthesizer {
    #[instrument(
        skip_all,
        fields(examples = examples.len(), variables = examples.num_variables())
    )]
    fn synthesize(&mut self, examples: &ExampleSet) -> Result<Expr, CannotSynthesize> {
        let start = Instant::now();
        self.statistics = SearchStatistics::default();
        let deadline = self.config.timeout.map(|t| start + t);

        let stopped = match self.search_structurally(examples, deadline) {
            Ok(program) => return Ok(self.found(program, start)),
            Err(phase) => phase,
        };
        self.enter(stopped);

        if self.config.constants.enabled {
            self.enter(SearchPhase::ConstantSolving);
            let solver = ConstantSolver::new(self.config.constants.clone());
            if let Some(program) =
                solver.solve(examples, &self.config.grammar, &mut self.statistics)
            {
                return Ok(self.found(program, start));
            }
        }

        let reason = match stopped {
            SearchPhase::TimedOut { depth } => {
                format!("search timed out at depth {}", depth)
            }
            SearchPhase::Exhausted { depth } => {
                format!("no program of depth at most {} matches", depth)
            }
            other => format!("search stopped in phase {}", other),
        };
        let reason = if self.config.constants.enabled {
            format!("{}, and constant solving found no skeleton", reason)
        } else {
            reason
        };
        Err(self.failed(reason, start))
    }

    fn statistics(&self) -> SearchStatistics {
        self.statistics.clone()
    }
}

/// Synthesize a program for `examples` with the default configuration
pub fn synthesize(examples: &ExampleSet) -> Result<Expr, CannotSynthesize> {
    EnumerativeSynthesizer::default().synthesize(examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Operation;
    use crate::matrix::Matrix;
    use crate::search::config::Grammar;
    use std::time::Duration;

    fn m(rows: Vec<Vec<f64>>) -> ConcreteMatrix {
        ConcreteMatrix::from_rows(rows).unwrap()
    }

    fn quick() -> SearchConfig {
        SearchConfig::default()
            .with_timeout(Duration::from_secs(5))
            .without_constants()
    }

    #[test]
    fn test_identity_program() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let examples = ExampleSet::from_pairs(vec![(vec![a.clone()], a)]).unwrap();
        let mut synth = EnumerativeSynthesizer::new(quick());
        assert_eq!(synth.synthesize(&examples).unwrap(), Expr::var(0));
        assert_eq!(synth.statistics().phase, SearchPhase::Found);
        assert_eq!(synth.statistics().depth_reached, 0);
    }

    #[test]
    fn test_first_match_in_order() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let examples =
            ExampleSet::from_pairs(vec![(vec![a.clone()], a.add(&a).unwrap())]).unwrap();
        let mut synth = EnumerativeSynthesizer::new(quick());
        assert_eq!(
            synth.synthesize(&examples).unwrap().to_string(),
            "var0.add(var0)"
        );
    }

    #[test]
    fn test_rejected_candidates_counted() {
        let a = m(vec![vec![1.0, 2.0, 3.0]]);
        let target = m(vec![vec![14.0]]);
        let examples = ExampleSet::from_pairs(vec![(vec![a], target)]).unwrap();
        let mut synth = EnumerativeSynthesizer::new(quick());
        let program = synth.synthesize(&examples).unwrap();
        assert_eq!(program.to_string(), "var0.multiply(var0.transpose())");
        // var0.multiply(var0) on a 1x3 matrix is ill-typed
        assert!(synth.statistics().candidates_rejected > 0);
    }

    #[test]
    fn test_exhausted_without_constants() {
        let zero = ConcreteMatrix::zeros(2, 2).unwrap();
        let one = ConcreteMatrix::identity(2).unwrap();
        let examples = ExampleSet::from_pairs(vec![(vec![zero], one)]).unwrap();
        let mut synth = EnumerativeSynthesizer::new(quick().with_max_depth(2));
        let err = synth.synthesize(&examples).unwrap_err();
        assert_eq!(err.depth_reached, 2);
        assert!(err.reason.contains("depth at most 2"));
        assert_eq!(synth.statistics().phase, SearchPhase::Failed);
    }

    #[test]
    fn test_constant_fallback() {
        let zero = ConcreteMatrix::zeros(2, 2).unwrap();
        let one = ConcreteMatrix::identity(2).unwrap();
        let examples = ExampleSet::from_pairs(vec![(vec![zero], one)]).unwrap();
        let config = SearchConfig::default().with_max_depth(1);
        let mut synth = EnumerativeSynthesizer::new(config);
        let program = synth.synthesize(&examples).unwrap();
        assert_eq!(program.to_string(), "const[[1, 0], [0, 1]]");
        assert_eq!(synth.statistics().skeletons_tried, 1);
    }

    #[test]
    fn test_check_range_matches_sequential_order() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let examples = ExampleSet::from_pairs(vec![(vec![a.clone()], a.negate())]).unwrap();
        let enumerator = Enumerator::new(Grammar::default(), 1);
        let cache: ValueCache = vec![vec![a]];
        let frontier = enumerator.frontier();

        let outcome = check_range(
            &frontier,
            0..frontier.len(),
            &cache,
            &examples,
            None,
            usize::MAX,
            |_| false,
        );
        assert_eq!(outcome.matched, Some(1));
        assert_eq!(outcome.kept.len(), 1);

        // a superseded range stops before checking anything
        let outcome = check_range(&frontier, 2..4, &cache, &examples, None, usize::MAX, |index| {
            index > 1
        });
        assert_eq!(outcome.statistics.candidates_evaluated, 0);
    }

    #[test]
    fn test_check_range_store_limit() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let unreachable = m(vec![vec![1.0, 2.0, 3.0]]);
        let examples = ExampleSet::from_pairs(vec![(vec![a.clone()], unreachable)]).unwrap();
        let enumerator = Enumerator::new(Grammar::default(), 1);
        let cache: ValueCache = vec![vec![a]];
        let frontier = enumerator.frontier();

        let outcome = check_range(&frontier, 0..frontier.len(), &cache, &examples, None, 4, |_| false);
        assert_eq!(outcome.kept.len(), 4);
        assert!(!outcome.truncated);

        // Every candidate is still checked once the limit is passed
        let outcome = check_range(&frontier, 0..frontier.len(), &cache, &examples, None, 3, |_| false);
        assert!(outcome.truncated);
        assert!(outcome.kept.is_empty());
        assert_eq!(outcome.statistics.candidates_evaluated, frontier.len() as u64);
        assert_eq!(outcome.statistics.nodes_materialized, 0);
    }

    #[test]
    fn test_node_limit_stops_search() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let unreachable = m(vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);
        let examples = ExampleSet::from_pairs(vec![(vec![a], unreachable)]).unwrap();

        let config = SearchConfig::default()
            .with_timeout(Duration::from_secs(30))
            .with_max_nodes(100)
            .without_constants();
        let start = std::time::Instant::now();
        let mut synth = EnumerativeSynthesizer::new(config);
        let err = synth.synthesize(&examples).unwrap_err();

        // depth 3 has thousands of survivors, so it is checked but never stored
        assert_eq!(err.depth_reached, 3);
        assert!(err.reason.contains("depth at most 3"));
        assert!(synth.statistics().nodes_materialized <= 100);
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_timed_out_depth_stores_bounded_nodes() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let unreachable = m(vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);
        let examples = ExampleSet::from_pairs(vec![(vec![a], unreachable)]).unwrap();

        let config = SearchConfig::default()
            .with_timeout(Duration::from_millis(500))
            .without_constants();
        let max_nodes = config.max_nodes.unwrap();
        let mut synth = EnumerativeSynthesizer::new(config);
        let err = synth.synthesize(&examples).unwrap_err();

        assert!(err.reason.contains("timed out"));
        assert!(synth.statistics().nodes_materialized <= max_nodes as u64);
    }

    #[test]
    fn test_last_depth_is_not_stored() {
        let zero = ConcreteMatrix::zeros(2, 2).unwrap();
        let one = ConcreteMatrix::identity(2).unwrap();
        let examples = ExampleSet::from_pairs(vec![(vec![zero], one)]).unwrap();
        let mut synth = EnumerativeSynthesizer::new(quick().with_max_depth(1));
        synth.synthesize(&examples).unwrap_err();
        assert_eq!(synth.statistics().nodes_materialized, 0);
    }

    #[test]
    fn test_evaluate_node_rejects_ill_typed() {
        let cache: ValueCache = vec![vec![m(vec![vec![1.0, 2.0]])]];
        let square = Node::Call {
            op: Operation::Multiply,
            receiver: 0,
            arg: Some(0),
        };
        assert!(evaluate_node(square, &cache).is_none());
        let transposed = Node::Call {
            op: Operation::Transpose,
            receiver: 0,
            arg: None,
        };
        assert_eq!(
            evaluate_node(transposed, &cache),
            Some(vec![m(vec![vec![1.0], vec![2.0]])])
        );
    }
}
