//! Input/output examples that specify a program

use crate::matrix::ConcreteMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExampleError {
    #[error("an example set needs at least one example")]
    Empty,

    #[error("example {index} has no inputs")]
    NoInputs { index: usize },

    #[error("example {index} has {found} inputs, expected {expected}")]
    ArityMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// One mapping from an ordered binding list to the expected output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub inputs: Vec<ConcreteMatrix>,
    pub output: ConcreteMatrix,
}

impl Example {
    pub fn new(inputs: Vec<ConcreteMatrix>, output: ConcreteMatrix) -> Self {
        Self { inputs, output }
    }
}

/// A non-empty, ordered list of examples with uniform input arity.
///
/// The arity is the single source of truth for the number of variables a
/// candidate program may reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Example>", into = "Vec<Example>")]
pub struct ExampleSet {
    examples: Vec<Example>,
    num_variables: usize,
}

impl ExampleSet {
    pub fn new(examples: Vec<Example>) -> Result<Self, ExampleError> {
        let first = examples.first().ok_or(ExampleError::Empty)?;
        let num_variables = first.inputs.len();
        for (index, example) in examples.iter().enumerate() {
            if example.inputs.is_empty() {
                return Err(ExampleError::NoInputs { index });
            }
            if example.inputs.len() != num_variables {
                return Err(ExampleError::ArityMismatch {
                    index,
                    expected: num_variables,
                    found: example.inputs.len(),
                });
            }
        }
        Ok(Self {
            examples,
            num_variables,
        })
    }

    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (Vec<ConcreteMatrix>, ConcreteMatrix)>,
    ) -> Result<Self, ExampleError> {
        Self::new(
            pairs
                .into_iter()
                .map(|(inputs, output)| Example::new(inputs, output))
                .collect(),
        )
    }

    /// Parse a JSON list of `{"inputs": [...], "output": ...}` objects
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Example> {
        self.examples.iter()
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }
}

impl TryFrom<Vec<Example>> for ExampleSet {
    type Error = ExampleError;

    fn try_from(examples: Vec<Example>) -> Result<Self, Self::Error> {
        Self::new(examples)
    }
}

impl From<ExampleSet> for Vec<Example> {
    fn from(set: ExampleSet) -> Self {
        set.examples
    }
}

impl<'a> IntoIterator for &'a ExampleSet {
    type Item = &'a Example;
    type IntoIter = std::slice::Iter<'a, Example>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}
