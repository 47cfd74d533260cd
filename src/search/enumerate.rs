//! Duplicate-free enumeration of expression trees
//!
//! Trees live in an arena of nodes addressed by [`NodeId`]. Level `d` of the
//! arena holds the trees of height exactly `d`, stored as an operation applied
//! to ids of lower levels, so no tree is built twice and subtrees are shared.
//!
//! The candidates of the next level form a [`Frontier`]: a lazy, random-access
//! view in a fixed order. Within a frontier, unary operations come before
//! binary ones (each in grammar order); unary candidates are ordered by child,
//! binary ones by receiver and then argument, and at least one child of every
//! candidate belongs to the previous level. The search loop can test the
//! frontier and keep only the candidates worth reusing as subtrees.

use crate::ir::{Expr, Operation};
use crate::search::config::Grammar;
use std::ops::Range;
use std::sync::Arc;

pub type NodeId = usize;

/// Arena entry: a variable or one operation over earlier nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    Variable(usize),
    Call {
        op: Operation,
        receiver: NodeId,
        arg: Option<NodeId>,
    },
}

/// Trees grouped by exact height
#[derive(Debug, Clone)]
pub struct Arena {
    nodes: Vec<Node>,
    trees: Vec<Arc<Expr>>,
    levels: Vec<Range<NodeId>>,
    num_variables: usize,
}

impl Arena {
    /// Arena whose level 0 holds one variable per binding
    pub fn new(num_variables: usize) -> Self {
        let nodes: Vec<Node> = (0..num_variables).map(Node::Variable).collect();
        let trees = (0..num_variables).map(|i| Arc::new(Expr::var(i))).collect();
        Self {
            nodes,
            trees,
            levels: vec![0..num_variables],
            num_variables,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the deepest materialized level
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn level(&self, depth: usize) -> Option<Range<NodeId>> {
        self.levels.get(depth).cloned()
    }

    pub fn node(&self, id: NodeId) -> Node {
        self.nodes[id]
    }

    pub fn tree(&self, id: NodeId) -> &Arc<Expr> {
        &self.trees[id]
    }

    /// Materialized trees of every level, in arena order
    pub fn trees(&self) -> impl Iterator<Item = &Arc<Expr>> {
        self.trees.iter()
    }

    /// Build the tree for a node whose children are already in the arena
    pub fn build(&self, node: Node) -> Expr {
        match node {
            Node::Variable(i) => Expr::var(i),
            Node::Call { op, receiver, arg } => Expr::Call {
                op,
                receiver: Arc::clone(&self.trees[receiver]),
                args: arg.map(|a| Arc::clone(&self.trees[a])).into_iter().collect(),
            },
        }
    }

    /// Append the next level.
    ///
    /// Nodes must come from this arena's current frontier, in frontier order.
    pub fn push_level(&mut self, nodes: impl IntoIterator<Item = Node>) {
        let start = self.nodes.len();
        for node in nodes {
            debug_assert!(matches!(node, Node::Call { .. }));
            let tree = Arc::new(self.build(node));
            self.nodes.push(node);
            self.trees.push(tree);
        }
        self.levels.push(start..self.nodes.len());
    }

    /// Candidates of height `depth() + 1` under `grammar`
    pub fn frontier(&self, grammar: &Grammar) -> Frontier {
        let previous = self.levels[self.depth()].clone();
        Frontier::new(grammar, previous.start, previous.end)
    }
}

/// One operation's share of a frontier
#[derive(Debug, Clone, Copy)]
struct Block {
    op: Operation,
    offset: usize,
    size: usize,
}

/// Lazy, random-access list of next-level candidates
#[derive(Debug, Clone)]
pub struct Frontier {
    blocks: Vec<Block>,
    /// First id of the previous level
    previous_start: NodeId,
    /// Number of nodes in the arena
    available: NodeId,
    len: usize,
}

impl Frontier {
    fn new(grammar: &Grammar, previous_start: NodeId, available: NodeId) -> Self {
        let fresh = available - previous_start;
        let mut blocks = Vec::new();
        let mut offset = 0;
        for op in grammar.unary().chain(grammar.binary()) {
            let size = if op.is_binary() {
                // pairs over all nodes minus pairs with no previous-level child
                available * available - previous_start * previous_start
            } else {
                fresh
            };
            blocks.push(Block {
                op: *op,
                offset,
                size,
            });
            offset += size;
        }
        Self {
            blocks,
            previous_start,
            available,
            len: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `index`-th candidate in frontier order
    pub fn get(&self, index: usize) -> Option<Node> {
        if index >= self.len {
            return None;
        }
        let block = self
            .blocks
            .iter()
            .find(|b| index < b.offset + b.size)?;
        let k = index - block.offset;
        let p = self.previous_start;
        let n = self.available;

        if !block.op.is_binary() {
            return Some(Node::Call {
                op: block.op,
                receiver: p + k,
                arg: None,
            });
        }

        // Receivers below `p` pair only with previous-level arguments
        let cross = p * (n - p);
        let (receiver, arg) = if k < cross {
            (k / (n - p), p + k % (n - p))
        } else {
            let k = k - cross;
            (p + k / n, k % n)
        };
        Some(Node::Call {
            op: block.op,
            receiver,
            arg: Some(arg),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Node> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Candidates in `range`, clamped to the frontier
    pub fn slice(&self, range: Range<usize>) -> impl Iterator<Item = (usize, Node)> + '_ {
        let end = range.end.min(self.len);
        (range.start..end).filter_map(move |i| self.get(i).map(|node| (i, node)))
    }
}

/// Stateful enumerator over a grammar
#[derive(Debug, Clone)]
pub struct Enumerator {
    grammar: Grammar,
    arena: Arena,
}

impl Enumerator {
    pub fn new(grammar: Grammar, num_variables: usize) -> Self {
        Self {
            grammar,
            arena: Arena::new(num_variables),
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Candidates one level deeper than the arena
    pub fn frontier(&self) -> Frontier {
        self.arena.frontier(&self.grammar)
    }

    /// Materialize a filtered frontier as the next level
    pub fn push_level(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.arena.push_level(nodes)
    }

    /// Materialize the whole frontier as the next level
    pub fn expand(&mut self) {
        let frontier = self.frontier();
        let nodes: Vec<Node> = frontier.iter().collect();
        self.arena.push_level(nodes);
    }

    /// Every tree of height at most `depth`, in enumeration order
    pub fn trees_up_to(&mut self, depth: usize) -> Vec<Expr> {
        while self.arena.depth() < depth {
            self.expand();
        }
        let end = self.arena.level(depth).map_or(0, |level| level.end);
        self.arena.trees().take(end).map(|t| t.as_ref().clone()).collect()
    }
}

/// All trees with at most `depth` levels of operation nesting over
/// `num_variables` inputs, under the default grammar.
///
/// The result is ordered and contains no duplicates; the result for `depth - 1`
/// is a prefix of the result for `depth`.
pub fn enumerate(depth: usize, num_variables: usize) -> Vec<Expr> {
    enumerate_with(&Grammar::default(), depth, num_variables)
}

pub fn enumerate_with(grammar: &Grammar, depth: usize, num_variables: usize) -> Vec<Expr> {
    Enumerator::new(grammar.clone(), num_variables).trees_up_to(depth)
}
