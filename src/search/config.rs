//! Configuration types for synthesis

use crate::ir::Operation;
use std::time::Duration;

/// Cached nodes kept across depths unless configured otherwise
pub const DEFAULT_MAX_NODES: usize = 500_000;

/// The operations the enumerator may apply.
///
/// A grammar only selects from the closed [`Operation`] set; order matters,
/// since it fixes the enumeration order within a depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    operations: Vec<Operation>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            operations: vec![
                Operation::Transpose,
                Operation::Negate,
                Operation::Add,
                Operation::Multiply,
            ],
        }
    }
}

impl Grammar {
    /// Grammar over the given operations; repeated operations are dropped
    pub fn new(operations: Vec<Operation>) -> Self {
        let mut unique: Vec<Operation> = Vec::with_capacity(operations.len());
        for op in operations {
            if !unique.contains(&op) {
                unique.push(op);
            }
        }
        Self { operations: unique }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn unary(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(|op| op.arity() == 1)
    }

    pub fn binary(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(|op| op.arity() == 2)
    }

    pub fn with_operation(mut self, op: Operation) -> Self {
        if !self.operations.contains(&op) {
            self.operations.push(op);
        }
        self
    }
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.operations.iter().map(|op| op.to_string()).collect();
        write!(f, "{}", names.join(","))
    }
}

impl std::str::FromStr for Grammar {
    type Err = String;

    /// Comma-separated operation names; `scale:<k>` and `pow:<n>` carry an immediate
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut operations = Vec::new();
        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let (name, immediate) = match item.split_once(':') {
                Some((name, immediate)) => (name, Some(immediate)),
                None => (item, None),
            };
            let op = match (name.to_lowercase().replace('-', "_").as_str(), immediate) {
                ("add", None) => Operation::Add,
                ("subtract" | "sub", None) => Operation::Subtract,
                ("multiply" | "mul", None) => Operation::Multiply,
                ("negate" | "neg", None) => Operation::Negate,
                ("transpose", None) => Operation::Transpose,
                ("identity_like", None) => Operation::IdentityLike,
                ("zeros_like", None) => Operation::ZerosLike,
                ("invert" | "inv", None) => Operation::Invert,
                ("scale", Some(k)) => Operation::Scale(
                    k.parse()
                        .map_err(|_| format!("Invalid scale factor: '{}'", k))?,
                ),
                ("pow", Some(n)) => Operation::Power(
                    n.parse()
                        .map_err(|_| format!("Invalid exponent: '{}'", n))?,
                ),
                _ => {
                    return Err(format!(
                        "Unknown operation: '{}'. Valid options: add, subtract, multiply, negate, \
                         transpose, identity_like, zeros_like, invert, scale:<k>, pow:<n>",
                        item
                    ));
                }
            };
            operations.push(op);
        }
        if operations.is_empty() {
            return Err("Grammar must name at least one operation".to_string());
        }
        Ok(Grammar::new(operations))
    }
}

/// Configuration for constant-assisted solving
#[derive(Debug, Clone)]
pub struct ConstantConfig {
    /// Whether to fall back to constant solving when structural search fails
    pub enabled: bool,
    /// Depth of the trees skeletons are built around
    pub skeleton_depth: usize,
    /// Budget for the whole constant-solving phase
    pub time_budget: Duration,
    /// Timeout for each SMT query
    pub solver_timeout: Option<Duration>,
}

impl Default for ConstantConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            skeleton_depth: 1,
            time_budget: Duration::from_secs(5),
            solver_timeout: Some(Duration::from_secs(2)),
        }
    }
}

impl ConstantConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_skeleton_depth(mut self, depth: usize) -> Self {
        self.skeleton_depth = depth;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn with_solver_timeout(mut self, timeout: Duration) -> Self {
        self.solver_timeout = Some(timeout);
        self
    }
}

/// Main search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Wall-clock budget for structural search (None = unbounded)
    pub timeout: Option<Duration>,
    /// Deepest level to enumerate (None = until timeout)
    pub max_depth: Option<usize>,
    /// Most nodes to cache across all depths (None = unbounded).
    /// A depth whose survivors would not fit is checked but not built on.
    pub max_nodes: Option<usize>,
    /// Operations available to the enumerator
    pub grammar: Grammar,
    /// Worker threads used to check each depth
    pub workers: usize,
    /// Constant-solving fallback
    pub constants: ConstantConfig,
    /// Log per-depth progress at info level
    pub verbose: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(5)),
            max_depth: None,
            max_nodes: Some(DEFAULT_MAX_NODES),
            grammar: Grammar::default(),
            workers: 1,
            constants: ConstantConfig::default(),
            verbose: false,
        }
    }
}

impl SearchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_depth_option(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_max_nodes_option(mut self, max_nodes: Option<usize>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_constants(mut self, constants: ConstantConfig) -> Self {
        self.constants = constants;
        self
    }

    pub fn without_constants(mut self) -> Self {
        self.constants.enabled = false;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
