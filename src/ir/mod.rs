//! Program representation: matrix operations and expression trees

pub mod expr;
pub mod operation;

// Re-export commonly used types
pub use expr::{ConstantSelector, Expr};
pub use operation::Operation;
