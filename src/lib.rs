//! Example-driven synthesis of matrix expression programs.
//!
//! Given input/output examples over real matrices, [`synthesize`] finds the
//! first program, in a fixed enumeration order, that maps every example's
//! inputs to its output. Constants that cannot be reached structurally are
//! recovered with an SMT solver.

pub mod error;
pub mod ir;
pub mod matrix;
pub mod parser;
pub mod search;
pub mod semantics;

pub use error::CannotSynthesize;
pub use ir::{ConstantSelector, Expr, Operation};
pub use matrix::{ConcreteMatrix, Matrix, MatrixError, Shape, SymbolicMatrix};
pub use parser::parse_expr;
pub use search::{
    EnumerativeSynthesizer, Example, ExampleSet, Grammar, SearchConfig, Synthesizer, enumerate,
    synthesize,
};
