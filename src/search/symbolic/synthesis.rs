//! SMT-based recovery of constants that enumeration cannot guess
//!
//! Each skeleton is evaluated over symbolic matrices: inputs and expected
//! outputs are lifted to exact rationals and the slot becomes a matrix of free
//! symbols shared by all examples. One equality per output entry is asserted;
//! a model assigns every slot entry a rational, which is substituted back as a
//! literal and checked concretely.

use crate::ir::Expr;
use crate::matrix::{ConcreteMatrix, MatrixError, SymbolicMatrix, symbolic::slot_symbol};
use crate::search::config::{ConstantConfig, Grammar};
use crate::search::examples::ExampleSet;
use crate::search::result::SearchStatistics;
use crate::search::symbolic::sketch::build_skeletons;
use crate::semantics::{EvalError, SolverConfig, create_solver_with_config};
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};
use z3::ast::Real;
use z3::{Model, SatResult};

/// Why a skeleton could not be completed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("no constant satisfies every example")]
    Unsatisfiable,

    #[error("solver gave up: {0}")]
    Unknown(String),

    #[error("model has no value for {0}")]
    ModelExtraction(String),

    #[error("cannot lift values into solver terms: {0}")]
    Lift(#[from] MatrixError),

    #[error("skeleton cannot be evaluated symbolically: {0}")]
    Evaluation(#[from] EvalError),

    #[error("recovered constants do not reproduce the examples exactly")]
    Verification,
}

/// Constant-solving phase of a synthesis call
pub struct ConstantSolver {
    config: ConstantConfig,
}

impl ConstantSolver {
    pub fn new(config: ConstantConfig) -> Self {
        Self { config }
    }

    /// Try skeletons in order until one is completed or the budget runs out
    pub fn solve(
        &self,
        examples: &ExampleSet,
        grammar: &Grammar,
        statistics: &mut SearchStatistics,
    ) -> Option<Expr> {
        let start = Instant::now();
        let skeletons = build_skeletons(examples, grammar, self.config.skeleton_depth);
        info!(
            skeletons = skeletons.len(),
            budget = ?self.config.time_budget,
            "starting constant solving"
        );

        for skeleton in skeletons {
            if start.elapsed() >= self.config.time_budget {
                info!(elapsed = ?start.elapsed(), "constant solving budget exhausted");
                return None;
            }
            statistics.skeletons_tried += 1;
            match self.solve_skeleton(&skeleton, examples, statistics) {
                Ok(program) => {
                    info!(%skeleton, %program, "constant recovered");
                    return Some(program);
                }
                Err(error) => debug!(%skeleton, %error, "skeleton rejected"),
            }
        }
        None
    }

    /// Complete one skeleton into a closed program
    pub fn solve_skeleton(
        &self,
        skeleton: &Expr,
        examples: &ExampleSet,
        statistics: &mut SearchStatistics,
    ) -> Result<Expr, SolverError> {
        let solver = create_solver_with_config(&SolverConfig::with_timeout_option(
            self.config.solver_timeout,
        ));

        for example in examples {
            let bindings = example
                .inputs
                .iter()
                .map(SymbolicMatrix::from_concrete)
                .collect::<Result<Vec<_>, _>>()?;
            let value = skeleton.evaluate::<SymbolicMatrix>(&bindings)?;
            let expected = SymbolicMatrix::from_concrete(&example.output)?;
            for equality in value.equate(&expected)? {
                solver.assert(&equality);
            }
        }

        statistics.solver_queries += 1;
        match solver.check() {
            SatResult::Sat => statistics.solver_sat += 1,
            SatResult::Unsat => return Err(SolverError::Unsatisfiable),
            SatResult::Unknown => {
                let reason = solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "unknown".to_string());
                return Err(SolverError::Unknown(reason));
            }
        }
        let model = solver
            .get_model()
            .ok_or_else(|| SolverError::ModelExtraction("model".to_string()))?;

        let mut values = HashMap::new();
        for (id, shape) in skeleton.slots() {
            let mut rows = Vec::with_capacity(shape.rows);
            for r in 0..shape.rows {
                let mut row = Vec::with_capacity(shape.columns);
                for c in 0..shape.columns {
                    row.push(extract_value(&model, &slot_symbol(id, r, c))?);
                }
                rows.push(row);
            }
            values.insert(id, ConcreteMatrix::from_rows(rows)?);
        }

        let program = skeleton.substitute_slots(&values);
        if reproduces(&program, examples) {
            Ok(program)
        } else {
            Err(SolverError::Verification)
        }
    }
}

/// Value of a free symbol in `model`, as the nearest `f64`
fn extract_value(model: &Model, symbol: &str) -> Result<f64, SolverError> {
    let term = Real::new_const(symbol);
    let (numerator, denominator) = model
        .eval(&term, true)
        .and_then(|value| value.as_real())
        .ok_or_else(|| SolverError::ModelExtraction(symbol.to_string()))?;
    if denominator == 0 {
        return Err(SolverError::ModelExtraction(symbol.to_string()));
    }
    Ok(numerator as f64 / denominator as f64)
}

/// Exact concrete check of a closed program against every example
pub fn reproduces(program: &Expr, examples: &ExampleSet) -> bool {
    examples.iter().all(|example| {
        program
            .evaluate::<ConcreteMatrix>(&example.inputs)
            .is_ok_and(|value| value == example.output)
    })
}
